//! Corporate income tax.
//!
//! Accounting profit is adjusted to taxable income by removing income
//! outside the tax base, adding back expenses the statute disallows and
//! deducting capital allowances.  Taxable income is floored at zero;
//! every earlier figure may go negative.

use crate::allowance::capital_allowances;
use crate::error::{ensure_amount, EngineError};
use crate::models::{CorporateTaxInput, CorporateTaxResult};
use crate::rates::{AssetClass, RateTable};

fn validate(input: &CorporateTaxInput) -> Result<(), EngineError> {
    ensure_amount("revenue.sales", input.revenue.sales)?;
    ensure_amount("revenue.other_income", input.revenue.other_income)?;
    ensure_amount("cost_of_sales", input.cost_of_sales)?;
    for (key, amount) in input.operating_expenses.items() {
        ensure_amount(&format!("operating_expenses.{key}"), amount)?;
    }
    for (key, amount) in input.non_taxable_income.items() {
        ensure_amount(&format!("non_taxable_income.{key}"), amount)?;
    }
    for (key, amount) in input.non_deductible_expenses.items() {
        ensure_amount(&format!("non_deductible_expenses.{key}"), amount)?;
    }
    for class in AssetClass::ALL {
        ensure_amount(&format!("asset_costs.{}", class.key()), input.asset_costs.cost(class))?;
    }
    Ok(())
}

/// Compute corporate tax and AIDS levy for one year of assessment.
pub fn compute_corporate_tax(
    input: &CorporateTaxInput,
    rates: &RateTable,
) -> Result<CorporateTaxResult, EngineError> {
    validate(input)?;

    let gross_profit = input.revenue.total() - input.cost_of_sales;
    let operating_expenses = input.operating_expenses.total();
    let operating_profit = gross_profit - operating_expenses;

    let non_taxable_income = input.non_taxable_income.total();
    let non_deductible_expenses = input.non_deductible_expenses.total();
    let allowances = capital_allowances(&input.asset_costs, &rates.capital_allowances);
    let total_capital_allowance: f64 = allowances.iter().map(|a| a.chosen_amount).sum();

    let taxable_income =
        (operating_profit - non_taxable_income + non_deductible_expenses - total_capital_allowance)
            .max(0.0);
    let corporate_tax = taxable_income * rates.corporate_tax_rate;
    let aids_levy = corporate_tax * rates.aids_levy_rate;
    let total_tax = corporate_tax + aids_levy;
    let effective_rate = if gross_profit > 0.0 {
        total_tax / gross_profit
    } else {
        0.0
    };

    Ok(CorporateTaxResult {
        gross_profit,
        operating_expenses,
        operating_profit,
        non_taxable_income,
        non_deductible_expenses,
        capital_allowances: allowances,
        total_capital_allowance,
        taxable_income,
        corporate_tax,
        aids_levy,
        total_tax,
        effective_rate,
    })
}
