//! HTTP API for the tax engine.
//!
//! This module exposes a minimal REST API around the engine using the
//! [`axum`](https://crates.io/crates/axum) framework.  Clients post
//! payroll or corporate figures as JSON and receive the computed
//! results.  Every request is computed against the single rate table
//! the server was started with.

use crate::corporate::compute_corporate_tax;
use crate::engine::run_payroll;
use crate::error::EngineError;
use crate::input::lenient_amount;
use crate::models::{BatchEmployee, CompensationInput, CorporateTaxInput};
use crate::payroll::Payroll;
use crate::rates::RateTable;
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Application state shared across requests.
pub struct AppState {
    pub payroll: Payroll,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GrossUpRequest {
    #[serde(deserialize_with = "lenient_amount")]
    pub target_net: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub apwc_rate_percent: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BatchRequest {
    pub employees: Vec<BatchEmployee>,
}

/// Engine errors rendered as JSON responses.
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            EngineError::InvalidInput { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT"),
            EngineError::BatchTooLarge { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "BATCH_TOO_LARGE"),
            EngineError::Configuration(_) => {
                tracing::error!(error = %self.0, "Rate table misconfigured");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
        };
        let mut body = json!({"error": {"code": code, "message": self.0.to_string()}});
        if let EngineError::InvalidInput { field, .. } = &self.0 {
            body["error"]["field"] = json!(field);
        }
        (status, Json(body)).into_response()
    }
}

/// Build the API router over `rates`.
pub fn build_router(rates: RateTable) -> Result<(Router, Arc<AppState>)> {
    let payroll = Payroll::new(Arc::new(rates))?;
    let state = Arc::new(AppState { payroll });
    let router = Router::new()
        .route("/api/payslip", post(payslip_handler))
        .route("/api/payslip/gross-up", post(gross_up_handler))
        .route("/api/payroll", post(batch_handler))
        .route("/api/corporate-tax", post(corporate_handler))
        .route("/api/rates", get(rates_handler))
        .with_state(state.clone());
    Ok((router, state))
}

/// Handler for POST /api/payslip
async fn payslip_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<CompensationInput>,
) -> Result<Response, ApiError> {
    let payslip = app_state.payroll.compute_from_gross(&input)?;
    Ok(Json(payslip).into_response())
}

/// Handler for POST /api/payslip/gross-up
async fn gross_up_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<GrossUpRequest>,
) -> Result<Response, ApiError> {
    let result = app_state
        .payroll
        .compute_from_net(request.target_net, request.apwc_rate_percent)?;
    Ok(Json(result).into_response())
}

/// Handler for POST /api/payroll
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Response, ApiError> {
    let payroll = app_state.payroll.clone();
    let joined = tokio::task::spawn_blocking(move || run_payroll(&payroll, request.employees)).await;
    match joined {
        Ok(result) => Ok(Json(result?).into_response()),
        Err(err) => {
            tracing::error!(error = %err, "Payroll batch task failed");
            let body = Json(json!({"error": {"code": "INTERNAL_ERROR", "message": "batch computation failed"}}));
            Ok((StatusCode::INTERNAL_SERVER_ERROR, body).into_response())
        }
    }
}

/// Handler for POST /api/corporate-tax
async fn corporate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<CorporateTaxInput>,
) -> Result<Response, ApiError> {
    let result = compute_corporate_tax(&input, app_state.payroll.rates())?;
    Ok(Json(result).into_response())
}

/// Handler for GET /api/rates
async fn rates_handler(State(app_state): State<Arc<AppState>>) -> Json<RateTable> {
    Json(app_state.payroll.rates().clone())
}

/// Launch the API server.  Blocks until the server terminates.
pub async fn serve(addr: SocketAddr, rates: RateTable) -> Result<()> {
    let (router, _state) = build_router(rates)?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
