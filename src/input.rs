//! Boundary parsing of user-entered values.
//!
//! Form layers hand the engine strings.  Anything that is missing or
//! does not read as a number counts as zero; a number that reads fine
//! but is out of range (e.g. negative) is kept and rejected later by
//! validation, so the user is told which field to fix.

use crate::models::{
    Allowances, AssetCosts, CompensationInput, CorporateTaxInput, NonDeductibleExpenses,
    NonTaxableIncome, OperatingExpenses, Revenue,
};
use crate::rates::AssetClass;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Read a monetary amount typed by a user.
///
/// Surrounding whitespace, `$` signs and thousands separators are
/// ignored.  Empty, malformed and non-finite input yields `0.0`.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Serde helper accepting numbers, numeric strings or anything else (as zero).
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_amount(&s),
        _ => 0.0,
    })
}

/// Serde helper for a nested category record.
///
/// `null`, a bare number or any other non-object value reads as an
/// empty record, matching how a missing section is treated.
pub fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => T::deserialize(value).map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// Flat string form, keyed by field name.
pub type FormValues = HashMap<String, String>;

fn amount(form: &FormValues, key: &str) -> f64 {
    form.get(key).map_or(0.0, |raw| parse_amount(raw))
}

impl CompensationInput {
    /// Build from a flat form.  Allowances use their bare names
    /// (`"living"`, `"bonus"`, ...).
    pub fn from_form(form: &FormValues) -> Self {
        Self {
            basic_salary: amount(form, "basic_salary"),
            allowances: Allowances {
                living: amount(form, "living"),
                medical: amount(form, "medical"),
                transport: amount(form, "transport"),
                housing: amount(form, "housing"),
                commission: amount(form, "commission"),
                bonus: amount(form, "bonus"),
                overtime: amount(form, "overtime"),
            },
            apwc_rate_percent: amount(form, "apwc_rate_percent"),
            prior_ytd_bonus: amount(form, "prior_ytd_bonus"),
        }
    }
}

impl CorporateTaxInput {
    /// Build from a flat form.  Category fields are prefixed with their
    /// section, e.g. `"operating_expenses.rent"` or `"asset_costs.motor_vehicles"`.
    pub fn from_form(form: &FormValues) -> Self {
        let section = |prefix: &str, key: &str| amount(form, &format!("{prefix}.{key}"));

        let mut asset_costs = AssetCosts::default();
        for class in AssetClass::ALL {
            asset_costs.set(class, section("asset_costs", class.key()));
        }

        let op = |key: &str| section("operating_expenses", key);
        let nti = |key: &str| section("non_taxable_income", key);
        let nde = |key: &str| section("non_deductible_expenses", key);

        Self {
            revenue: Revenue {
                sales: section("revenue", "sales"),
                other_income: section("revenue", "other_income"),
            },
            cost_of_sales: amount(form, "cost_of_sales"),
            operating_expenses: OperatingExpenses {
                salaries_and_wages: op("salaries_and_wages"),
                rent: op("rent"),
                utilities: op("utilities"),
                depreciation: op("depreciation"),
                repairs_and_maintenance: op("repairs_and_maintenance"),
                advertising: op("advertising"),
                insurance: op("insurance"),
                professional_fees: op("professional_fees"),
                interest: op("interest"),
                bank_charges: op("bank_charges"),
                travel: op("travel"),
                other: op("other"),
            },
            non_taxable_income: NonTaxableIncome {
                dividends_received: nti("dividends_received"),
                capital_gains: nti("capital_gains"),
                exempt_income: nti("exempt_income"),
            },
            non_deductible_expenses: NonDeductibleExpenses {
                depreciation: nde("depreciation"),
                entertainment: nde("entertainment"),
                fines_and_penalties: nde("fines_and_penalties"),
                donations: nde("donations"),
                private_expenses: nde("private_expenses"),
                capital_expenditure: nde("capital_expenditure"),
            },
            asset_costs,
        }
    }
}
