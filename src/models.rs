//! Data models for the tax engine.
//!
//! The `models` module defines the serialisable value objects passed
//! into and returned from the engine.  Inputs accept missing fields and
//! numeric strings (see [`crate::input`]); outputs are plain snapshots
//! whose field names are read by report and export layers, so renaming
//! a field is a breaking change.
//!
//! Allowance, expense and asset categories are closed sets of named
//! fields.  Each category struct lists its items by destructuring, so a
//! new field does not compile until it is counted in the total.

use crate::allowance::AllowanceSelection;
use crate::bonus::BonusAllocation;
use crate::input::{lenient_amount, lenient_section};
use crate::rates::AssetClass;
use serde::{Deserialize, Serialize};

/// Monthly allowances paid on top of basic salary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Allowances {
    #[serde(deserialize_with = "lenient_amount")]
    pub living: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub medical: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub transport: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub housing: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub commission: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub bonus: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub overtime: f64,
}

impl Allowances {
    pub const KEYS: [&'static str; 7] = [
        "living",
        "medical",
        "transport",
        "housing",
        "commission",
        "bonus",
        "overtime",
    ];

    /// Every allowance paired with its field name, in [`Self::KEYS`] order.
    pub fn items(&self) -> [(&'static str, f64); 7] {
        let Self {
            living,
            medical,
            transport,
            housing,
            commission,
            bonus,
            overtime,
        } = *self;
        [
            ("living", living),
            ("medical", medical),
            ("transport", transport),
            ("housing", housing),
            ("commission", commission),
            ("bonus", bonus),
            ("overtime", overtime),
        ]
    }

    pub fn total(&self) -> f64 {
        self.items().iter().map(|(_, amount)| amount).sum()
    }
}

/// One employee's pay for a period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensationInput {
    #[serde(deserialize_with = "lenient_amount")]
    pub basic_salary: f64,
    #[serde(deserialize_with = "lenient_section")]
    pub allowances: Allowances,
    /// Sector APWC rate in percent, bounded by the rate table.
    #[serde(deserialize_with = "lenient_amount")]
    pub apwc_rate_percent: f64,
    /// Bonus already paid this tax year, before this period.
    #[serde(deserialize_with = "lenient_amount")]
    pub prior_ytd_bonus: f64,
}

/// A full payslip: earnings, employee deductions and employer cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayslipResult {
    pub basic_salary: f64,
    pub allowances: Allowances,
    pub gross_salary: f64,
    pub bonus: BonusAllocation,
    pub nssa_employee: f64,
    pub insurable_earnings: f64,
    /// Income subject to the progressive schedule.
    pub taxable_income: f64,
    pub paye: f64,
    pub aids_levy: f64,
    pub bonus_tax: f64,
    pub total_tax: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
    pub nssa_employer: f64,
    pub zimdef: f64,
    pub apwc: f64,
    pub apwc_rate_percent: f64,
    pub total_employer_cost: f64,
}

/// One step of the net-to-gross search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverIteration {
    pub iteration: u32,
    pub gross_guess: f64,
    pub net_salary: f64,
    pub delta: f64,
}

/// Outcome of grossing up a target net salary.
///
/// When `converged` is false the payslip is the closest estimate found
/// and may miss the target by more than a cent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossUpResult {
    pub target_net: f64,
    pub payslip: PayslipResult,
    pub iterations: Vec<SolverIteration>,
    pub converged: bool,
    /// `payslip.net_salary - target_net`.
    pub residual: f64,
}

/// A named employee in a batch run.  Compensation fields sit at the
/// top level of the record, next to `name`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchEmployee {
    pub name: String,
    #[serde(flatten)]
    pub compensation: CompensationInput,
}

/// A batch payslip, labelled with the employee it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayslip {
    pub name: String,
    pub payslip: PayslipResult,
}

/// Column sums over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchTotals {
    pub employee_count: usize,
    pub total_gross: f64,
    pub total_nssa_employee: f64,
    pub total_paye: f64,
    pub total_aids_levy: f64,
    pub total_bonus_tax: f64,
    pub total_tax: f64,
    pub total_net: f64,
    pub total_nssa_employer: f64,
    pub total_zimdef: f64,
    pub total_apwc: f64,
    pub total_employer_cost: f64,
}

impl BatchTotals {
    pub fn add(&mut self, p: &PayslipResult) {
        self.employee_count += 1;
        self.total_gross += p.gross_salary;
        self.total_nssa_employee += p.nssa_employee;
        self.total_paye += p.paye;
        self.total_aids_levy += p.aids_levy;
        self.total_bonus_tax += p.bonus_tax;
        self.total_tax += p.total_tax;
        self.total_net += p.net_salary;
        self.total_nssa_employer += p.nssa_employer;
        self.total_zimdef += p.zimdef;
        self.total_apwc += p.apwc;
        self.total_employer_cost += p.total_employer_cost;
    }
}

/// Results of a batch, in input order, with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<EmployeePayslip>,
    pub totals: BatchTotals,
}

/// Turnover for the year.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Revenue {
    #[serde(deserialize_with = "lenient_amount")]
    pub sales: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub other_income: f64,
}

impl Revenue {
    pub fn total(&self) -> f64 {
        self.sales + self.other_income
    }
}

/// Deductible running costs charged against gross profit.
///
/// `depreciation` here is the book charge.  Where the statute disallows
/// it, enter it again under [`NonDeductibleExpenses`] so it is added back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingExpenses {
    #[serde(deserialize_with = "lenient_amount")]
    pub salaries_and_wages: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub rent: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub utilities: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub depreciation: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub repairs_and_maintenance: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub advertising: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub insurance: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub professional_fees: f64,
    /// Interest on borrowings.
    #[serde(deserialize_with = "lenient_amount")]
    pub interest: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub bank_charges: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub travel: f64,
    /// Anything that fits no other line.
    #[serde(deserialize_with = "lenient_amount")]
    pub other: f64,
}

impl OperatingExpenses {
    pub fn items(&self) -> [(&'static str, f64); 12] {
        let Self {
            salaries_and_wages,
            rent,
            utilities,
            depreciation,
            repairs_and_maintenance,
            advertising,
            insurance,
            professional_fees,
            interest,
            bank_charges,
            travel,
            other,
        } = *self;
        [
            ("salaries_and_wages", salaries_and_wages),
            ("rent", rent),
            ("utilities", utilities),
            ("depreciation", depreciation),
            ("repairs_and_maintenance", repairs_and_maintenance),
            ("advertising", advertising),
            ("insurance", insurance),
            ("professional_fees", professional_fees),
            ("interest", interest),
            ("bank_charges", bank_charges),
            ("travel", travel),
            ("other", other),
        ]
    }

    pub fn total(&self) -> f64 {
        self.items().iter().map(|(_, amount)| amount).sum()
    }
}

/// Income recognised in the accounts but outside the income tax base.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NonTaxableIncome {
    #[serde(deserialize_with = "lenient_amount")]
    pub dividends_received: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub capital_gains: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub exempt_income: f64,
}

impl NonTaxableIncome {
    pub fn items(&self) -> [(&'static str, f64); 3] {
        let Self {
            dividends_received,
            capital_gains,
            exempt_income,
        } = *self;
        [
            ("dividends_received", dividends_received),
            ("capital_gains", capital_gains),
            ("exempt_income", exempt_income),
        ]
    }

    pub fn total(&self) -> f64 {
        self.items().iter().map(|(_, amount)| amount).sum()
    }
}

/// Expenses charged in the accounts that the statute does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NonDeductibleExpenses {
    #[serde(deserialize_with = "lenient_amount")]
    pub depreciation: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub entertainment: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub fines_and_penalties: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub donations: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub private_expenses: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub capital_expenditure: f64,
}

impl NonDeductibleExpenses {
    pub fn items(&self) -> [(&'static str, f64); 6] {
        let Self {
            depreciation,
            entertainment,
            fines_and_penalties,
            donations,
            private_expenses,
            capital_expenditure,
        } = *self;
        [
            ("depreciation", depreciation),
            ("entertainment", entertainment),
            ("fines_and_penalties", fines_and_penalties),
            ("donations", donations),
            ("private_expenses", private_expenses),
            ("capital_expenditure", capital_expenditure),
        ]
    }

    pub fn total(&self) -> f64 {
        self.items().iter().map(|(_, amount)| amount).sum()
    }
}

/// Cost of qualifying assets brought into use, per class.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetCosts {
    #[serde(deserialize_with = "lenient_amount")]
    pub motor_vehicles: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub moveable_assets: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub commercial_buildings: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub industrial_buildings: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub lease_improvements: f64,
}

impl AssetCosts {
    pub fn cost(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::MotorVehicles => self.motor_vehicles,
            AssetClass::MoveableAssets => self.moveable_assets,
            AssetClass::CommercialBuildings => self.commercial_buildings,
            AssetClass::IndustrialBuildings => self.industrial_buildings,
            AssetClass::LeaseImprovements => self.lease_improvements,
        }
    }

    pub fn set(&mut self, class: AssetClass, cost: f64) {
        let slot = match class {
            AssetClass::MotorVehicles => &mut self.motor_vehicles,
            AssetClass::MoveableAssets => &mut self.moveable_assets,
            AssetClass::CommercialBuildings => &mut self.commercial_buildings,
            AssetClass::IndustrialBuildings => &mut self.industrial_buildings,
            AssetClass::LeaseImprovements => &mut self.lease_improvements,
        };
        *slot = cost;
    }
}

/// A company's figures for one year of assessment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorporateTaxInput {
    #[serde(deserialize_with = "lenient_section")]
    pub revenue: Revenue,
    #[serde(deserialize_with = "lenient_amount")]
    pub cost_of_sales: f64,
    #[serde(deserialize_with = "lenient_section")]
    pub operating_expenses: OperatingExpenses,
    #[serde(deserialize_with = "lenient_section")]
    pub non_taxable_income: NonTaxableIncome,
    #[serde(deserialize_with = "lenient_section")]
    pub non_deductible_expenses: NonDeductibleExpenses,
    #[serde(deserialize_with = "lenient_section")]
    pub asset_costs: AssetCosts,
}

/// Every stage of the corporate computation, from gross profit to tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateTaxResult {
    /// Total revenue less cost of sales.
    pub gross_profit: f64,
    /// Sum of all operating expense lines.
    pub operating_expenses: f64,
    /// May be negative; only taxable income is floored.
    pub operating_profit: f64,
    /// Deducted from operating profit.
    pub non_taxable_income: f64,
    /// Added back to operating profit.
    pub non_deductible_expenses: f64,
    /// One selection per asset class, in [`AssetClass::ALL`] order.
    pub capital_allowances: Vec<AllowanceSelection>,
    pub total_capital_allowance: f64,
    /// Adjusted profit less capital allowances, never below zero.
    pub taxable_income: f64,
    /// Taxable income at the corporate rate.
    pub corporate_tax: f64,
    /// Levied on the corporate tax, not on income.
    pub aids_levy: f64,
    /// Corporate tax plus AIDS levy.
    pub total_tax: f64,
    /// Total tax as a fraction of gross profit; zero when there is no profit.
    pub effective_rate: f64,
}
