use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use zimtax_engine::api::build_router;
use zimtax_engine::engine::MAX_BATCH_SIZE;
use zimtax_engine::rates::RateTable;

fn router() -> axum::Router {
    build_router(RateTable::zimbabwe_2024()).expect("router").0
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn approx(value: &Value, expected: f64) -> bool {
    (value.as_f64().expect("number") - expected).abs() < 1e-6
}

#[tokio::test]
async fn payslip_endpoint_computes_net_salary() {
    let (status, body) = post("/api/payslip", json!({"basic_salary": "250"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["net_salary"], 210.1675));
    assert!(approx(&body["nssa_employee"], 11.25));
    assert!(approx(&body["bonus"]["new_ytd_bonus"], 0.0));
}

#[tokio::test]
async fn payslip_endpoint_reports_offending_field() {
    let (status, body) = post("/api/payslip", json!({"basic_salary": 900, "apwc_rate_percent": 5})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert_eq!(body["error"]["field"], "apwc_rate_percent");
}

#[tokio::test]
async fn gross_up_endpoint_converges() {
    let (status, body) = post("/api/payslip/gross-up", json!({"target_net": 1500})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["converged"], true);
    assert!(body["residual"].as_f64().unwrap().abs() < 0.01);
}

#[tokio::test]
async fn batch_endpoint_totals_and_limits() {
    let employees: Vec<Value> = (0..3)
        .map(|i| json!({"name": format!("emp{i}"), "basic_salary": 1000}))
        .collect();
    let (status, body) = post("/api/payroll", json!({"employees": employees})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totals"]["employee_count"], 3);
    let single = body["results"][0]["payslip"]["net_salary"].as_f64().unwrap();
    assert!(approx(&body["totals"]["total_net"], 3.0 * single));
    assert_eq!(body["results"][2]["name"], "emp2");

    let too_many: Vec<Value> = (0..=MAX_BATCH_SIZE).map(|_| json!({"basic_salary": 100})).collect();
    let (status, body) = post("/api/payroll", json!({"employees": too_many})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "BATCH_TOO_LARGE");
}

#[tokio::test]
async fn corporate_endpoint_floors_losses() {
    let (status, body) = post(
        "/api/corporate-tax",
        json!({
            "revenue": {"sales": 10000},
            "cost_of_sales": 4000,
            "operating_expenses": {"rent": 9000},
            "non_deductible_expenses": {"entertainment": 500}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["operating_profit"], -3000.0));
    assert!(approx(&body["taxable_income"], 0.0));
    assert!(approx(&body["total_tax"], 0.0));
}

#[tokio::test]
async fn null_sections_are_treated_as_empty() {
    let (status, body) = post("/api/payslip", json!({"basic_salary": 250, "allowances": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["net_salary"], 210.1675));

    let (status, body) = post(
        "/api/corporate-tax",
        json!({"revenue": null, "operating_expenses": null, "cost_of_sales": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["gross_profit"], 0.0));
    assert!(approx(&body["total_tax"], 0.0));
}

#[tokio::test]
async fn rates_endpoint_returns_active_table() {
    let response = router()
        .oneshot(Request::builder().uri("/api/rates").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let table: RateTable = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(table, RateTable::zimbabwe_2024());
}
