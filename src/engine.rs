//! Batch payroll runs.
//!
//! The `engine` module applies the [`Payroll`] pipeline to a bounded
//! list of employees.  Employees are independent of one another, so the
//! [`rayon`] crate computes them across CPU cores; results still come
//! back in input order.

use crate::error::EngineError;
use crate::models::{BatchEmployee, BatchResult, BatchTotals, EmployeePayslip};
use crate::payroll::Payroll;
use rayon::prelude::*;

/// Largest batch accepted in one run.
pub const MAX_BATCH_SIZE: usize = 50;

/// Runs a payroll for every employee in `employees`.
///
/// Oversized batches are rejected outright.  If any employee fails
/// validation the whole run fails, and the error field is prefixed with
/// that employee's position, e.g. `employees[2].basic_salary`.
pub fn run_payroll(payroll: &Payroll, employees: Vec<BatchEmployee>) -> Result<BatchResult, EngineError> {
    if employees.len() > MAX_BATCH_SIZE {
        return Err(EngineError::BatchTooLarge {
            size: employees.len(),
            max: MAX_BATCH_SIZE,
        });
    }
    tracing::info!(employees = employees.len(), rates = %payroll.rates().version, "Running payroll batch");

    let results: Vec<EmployeePayslip> = employees
        .into_par_iter()
        .enumerate()
        .map(|(index, employee)| {
            payroll
                .compute_from_gross(&employee.compensation)
                .map(|payslip| EmployeePayslip {
                    name: employee.name,
                    payslip,
                })
                .map_err(|err| err.within(&format!("employees[{index}]")))
        })
        .collect::<Result<_, _>>()?;

    let mut totals = BatchTotals::default();
    for result in &results {
        totals.add(&result.payslip);
    }
    Ok(BatchResult { results, totals })
}
