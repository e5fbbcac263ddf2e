//! Capital allowance selection.
//!
//! Each asset class may be written off under three methods: special
//! initial allowance, accelerated wear and tear, and straight-line wear
//! and tear.  The taxpayer is entitled to whichever yields the largest
//! deduction, and the engine always claims that one.  Taxpayer election
//! of a smaller method is not modelled.

use crate::models::AssetCosts;
use crate::rates::{AllowanceRates, AllowanceSchedule, AssetClass};
use serde::{Deserialize, Serialize};

/// How a capital allowance was computed.  Each method is a flat
/// first-year fraction of cost taken from the asset class's rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceMethod {
    SpecialInitial,
    Accelerated,
    StraightLine,
}

/// The three candidate allowances for one asset and the one claimed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllowanceSelection {
    pub asset_class: AssetClass,
    pub asset_cost: f64,
    pub special_initial_amount: f64,
    pub accelerated_amount: f64,
    pub straight_line_amount: f64,
    pub chosen_amount: f64,
    pub chosen_method: AllowanceMethod,
}

/// Evaluate every method for `asset_cost` and keep the largest.
///
/// Ties resolve in the order special initial, accelerated, straight line.
pub fn select_allowance(
    asset_class: AssetClass,
    asset_cost: f64,
    rates: &AllowanceRates,
) -> AllowanceSelection {
    let special_initial_amount = asset_cost * rates.special_initial;
    let accelerated_amount = asset_cost * rates.accelerated;
    let straight_line_amount = asset_cost * rates.straight_line;

    let mut chosen_amount = special_initial_amount;
    let mut chosen_method = AllowanceMethod::SpecialInitial;
    if accelerated_amount > chosen_amount {
        chosen_amount = accelerated_amount;
        chosen_method = AllowanceMethod::Accelerated;
    }
    if straight_line_amount > chosen_amount {
        chosen_amount = straight_line_amount;
        chosen_method = AllowanceMethod::StraightLine;
    }

    AllowanceSelection {
        asset_class,
        asset_cost,
        special_initial_amount,
        accelerated_amount,
        straight_line_amount,
        chosen_amount,
        chosen_method,
    }
}

/// Select allowances for every asset class, in [`AssetClass::ALL`] order.
pub fn capital_allowances(costs: &AssetCosts, schedule: &AllowanceSchedule) -> Vec<AllowanceSelection> {
    AssetClass::ALL
        .iter()
        .map(|&class| select_allowance(class, costs.cost(class), &schedule.rates(class)))
        .collect()
}
