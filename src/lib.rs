//! Zimbabwe tax engine library crate.
//!
//! This crate computes statutory PAYE payslips and corporate income tax
//! from raw figures.  The calculators are pure functions over a shared
//! [`rates::RateTable`]; the only state that crosses periods is the
//! year-to-date bonus total, which callers carry in a
//! [`bonus::BonusTaxState`] and feed back in themselves.
//!
//! External applications may call [`payroll::Payroll`],
//! [`engine::run_payroll`] and [`corporate::compute_corporate_tax`]
//! directly or embed the HTTP API via [`api::build_router`].

pub mod allowance;
pub mod api;
pub mod bonus;
pub mod config;
pub mod contribution;
pub mod corporate;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod payroll;
pub mod period;
pub mod rates;
pub mod tax;

pub use error::EngineError;
