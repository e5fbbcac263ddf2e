//! Statutory rate tables.
//!
//! A [`RateTable`] gathers every number the engine needs for one tax
//! year: PAYE bands, NSSA rates and ceiling, the AIDS levy, ZIMDEF,
//! the APWC bound, the bonus exemption, the corporate rate and the
//! capital allowance schedule.  One table is shared by every pipeline,
//! so moving to a new tax year means loading a new table and nothing
//! else.  Tables are stored externally as versioned JSON files and can
//! be loaded with [`load_rate_tables_from_dir`].

use crate::error::EngineError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Allowed mismatch, relative to the boundary, between the tax two
/// adjacent bands charge at their shared bound.
const CONTINUITY_EPSILON: f64 = 1e-9;

/// One bracket of a progressive schedule.
///
/// Tax for an amount inside the band is `amount * rate - subtractor`.
/// The subtractor absorbs the tax the lower bands would have charged,
/// which keeps the schedule continuous at every boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBand {
    pub lower_bound: f64,
    /// `None` marks the final, unbounded band.
    pub upper_bound: Option<f64>,
    pub rate: f64,
    pub subtractor: f64,
}

impl TaxBand {
    pub const fn new(lower_bound: f64, upper_bound: Option<f64>, rate: f64, subtractor: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
            subtractor,
        }
    }

    /// Both bounds are inclusive; a shared boundary resolves to the lower
    /// band, which is harmless because the schedule is continuous there.
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.lower_bound && self.upper_bound.map_or(true, |upper| amount <= upper)
    }
}

/// A social-security contribution capped at a monthly insurable ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionRule {
    pub employee_rate: f64,
    pub employer_rate: f64,
    pub monthly_ceiling: f64,
}

/// Depreciable asset classes recognised for capital allowances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    MotorVehicles,
    MoveableAssets,
    CommercialBuildings,
    IndustrialBuildings,
    LeaseImprovements,
}

impl AssetClass {
    pub const ALL: [AssetClass; 5] = [
        AssetClass::MotorVehicles,
        AssetClass::MoveableAssets,
        AssetClass::CommercialBuildings,
        AssetClass::IndustrialBuildings,
        AssetClass::LeaseImprovements,
    ];

    /// The snake_case key used in JSON and form input.
    pub fn key(self) -> &'static str {
        match self {
            AssetClass::MotorVehicles => "motor_vehicles",
            AssetClass::MoveableAssets => "moveable_assets",
            AssetClass::CommercialBuildings => "commercial_buildings",
            AssetClass::IndustrialBuildings => "industrial_buildings",
            AssetClass::LeaseImprovements => "lease_improvements",
        }
    }
}

/// Rates of the three allowance methods for one asset class.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllowanceRates {
    pub special_initial: f64,
    pub accelerated: f64,
    pub straight_line: f64,
}

impl AllowanceRates {
    pub const fn new(special_initial: f64, accelerated: f64, straight_line: f64) -> Self {
        Self {
            special_initial,
            accelerated,
            straight_line,
        }
    }
}

/// Allowance rates for every [`AssetClass`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllowanceSchedule {
    pub motor_vehicles: AllowanceRates,
    pub moveable_assets: AllowanceRates,
    pub commercial_buildings: AllowanceRates,
    pub industrial_buildings: AllowanceRates,
    pub lease_improvements: AllowanceRates,
}

impl AllowanceSchedule {
    pub fn rates(&self, class: AssetClass) -> AllowanceRates {
        match class {
            AssetClass::MotorVehicles => self.motor_vehicles,
            AssetClass::MoveableAssets => self.moveable_assets,
            AssetClass::CommercialBuildings => self.commercial_buildings,
            AssetClass::IndustrialBuildings => self.industrial_buildings,
            AssetClass::LeaseImprovements => self.lease_improvements,
        }
    }
}

/// Every statutory rate for one tax year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Version string, e.g. `"2024"`.  Versions correspond to named JSON
    /// files in the rate directory.
    pub version: String,
    /// Monthly PAYE bands, ascending and contiguous from zero.
    pub paye_bands: Vec<TaxBand>,
    pub nssa: ContributionRule,
    /// AIDS levy as a fraction of the primary tax.
    pub aids_levy_rate: f64,
    /// ZIMDEF as a fraction of gross salary, employer only.
    pub zimdef_rate: f64,
    /// Upper bound of the sector-dependent APWC rate, in percent.
    pub apwc_max_rate_percent: f64,
    /// Tax-free bonus allowance per tax year.
    pub bonus_threshold: f64,
    /// Rate applied to bonus above the threshold; always the top marginal
    /// PAYE rate.
    pub bonus_tax_rate: f64,
    pub corporate_tax_rate: f64,
    pub capital_allowances: AllowanceSchedule,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::zimbabwe_2024()
    }
}

impl RateTable {
    /// Monthly USD schedule in force for the 2024 tax year.
    pub fn zimbabwe_2024() -> Self {
        Self {
            version: "2024".to_string(),
            paye_bands: vec![
                TaxBand::new(0.0, Some(100.0), 0.0, 0.0),
                TaxBand::new(100.0, Some(300.0), 0.20, 20.0),
                TaxBand::new(300.0, Some(1_000.0), 0.25, 35.0),
                TaxBand::new(1_000.0, Some(2_000.0), 0.30, 85.0),
                TaxBand::new(2_000.0, Some(3_000.0), 0.35, 185.0),
                TaxBand::new(3_000.0, None, 0.40, 335.0),
            ],
            nssa: ContributionRule {
                employee_rate: 0.045,
                employer_rate: 0.045,
                monthly_ceiling: 700.0,
            },
            aids_levy_rate: 0.03,
            zimdef_rate: 0.01,
            apwc_max_rate_percent: 2.0,
            bonus_threshold: 700.0,
            bonus_tax_rate: 0.40,
            corporate_tax_rate: 0.24,
            capital_allowances: AllowanceSchedule {
                motor_vehicles: AllowanceRates::new(0.50, 0.25, 0.20),
                moveable_assets: AllowanceRates::new(0.50, 0.25, 0.10),
                commercial_buildings: AllowanceRates::new(0.0, 0.0, 0.025),
                industrial_buildings: AllowanceRates::new(0.50, 0.25, 0.05),
                lease_improvements: AllowanceRates::new(0.0, 0.0, 0.05),
            },
        }
    }

    /// Highest marginal PAYE rate, i.e. the rate of the unbounded band.
    pub fn top_marginal_rate(&self) -> f64 {
        self.paye_bands.last().map_or(0.0, |band| band.rate)
    }

    /// Check the invariants every calculator relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        let bands = &self.paye_bands;
        let first = bands
            .first()
            .ok_or_else(|| EngineError::Configuration("PAYE schedule has no bands".into()))?;
        if first.lower_bound != 0.0 {
            return Err(EngineError::Configuration(format!(
                "first PAYE band starts at {} instead of 0",
                first.lower_bound
            )));
        }
        for (index, band) in bands.iter().enumerate() {
            check_rate(&format!("paye_bands[{index}].rate"), band.rate)?;
            let is_last = index + 1 == bands.len();
            match (band.upper_bound, is_last) {
                (None, true) => {}
                (None, false) => {
                    return Err(EngineError::Configuration(format!(
                        "PAYE band {index} is unbounded but is not the last band"
                    )));
                }
                (Some(_), true) => {
                    return Err(EngineError::Configuration(
                        "last PAYE band must be unbounded".into(),
                    ));
                }
                (Some(upper), false) => {
                    if upper <= band.lower_bound {
                        return Err(EngineError::Configuration(format!(
                            "PAYE band {index} has upper bound {upper} below its lower bound {}",
                            band.lower_bound
                        )));
                    }
                    let next = bands[index + 1].lower_bound;
                    if next != upper {
                        return Err(EngineError::Configuration(format!(
                            "PAYE bands {index} and {} are not contiguous ({upper} vs {next})",
                            index + 1
                        )));
                    }
                    let next_band = &bands[index + 1];
                    let below = upper * band.rate - band.subtractor;
                    let above = upper * next_band.rate - next_band.subtractor;
                    if (below - above).abs() > CONTINUITY_EPSILON * upper.max(1.0) {
                        return Err(EngineError::Configuration(format!(
                            "PAYE subtractors jump at {upper}: band {index} charges {below}, band {} charges {above}",
                            index + 1
                        )));
                    }
                }
            }
        }

        check_rate("nssa.employee_rate", self.nssa.employee_rate)?;
        check_rate("nssa.employer_rate", self.nssa.employer_rate)?;
        check_non_negative("nssa.monthly_ceiling", self.nssa.monthly_ceiling)?;
        check_rate("aids_levy_rate", self.aids_levy_rate)?;
        check_rate("zimdef_rate", self.zimdef_rate)?;
        check_non_negative("apwc_max_rate_percent", self.apwc_max_rate_percent)?;
        check_non_negative("bonus_threshold", self.bonus_threshold)?;
        check_rate("bonus_tax_rate", self.bonus_tax_rate)?;
        let top_rate = self.top_marginal_rate();
        if self.bonus_tax_rate != top_rate {
            return Err(EngineError::Configuration(format!(
                "bonus_tax_rate {} must equal the top marginal PAYE rate {top_rate}",
                self.bonus_tax_rate
            )));
        }
        check_rate("corporate_tax_rate", self.corporate_tax_rate)?;
        for class in AssetClass::ALL {
            let rates = self.capital_allowances.rates(class);
            let key = class.key();
            check_rate(&format!("{key}.special_initial"), rates.special_initial)?;
            check_rate(&format!("{key}.accelerated"), rates.accelerated)?;
            check_rate(&format!("{key}.straight_line"), rates.straight_line)?;
        }
        Ok(())
    }
}

fn check_rate(name: &str, rate: f64) -> Result<(), EngineError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(EngineError::Configuration(format!(
            "{name} must lie in [0, 1], got {rate}"
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::Configuration(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Load all rate tables from a directory.
///
/// Every `.json` file is parsed as a [`RateTable`].  Files that fail to
/// parse are skipped with a warning.  Tables are returned sorted by
/// version; duplicate versions are not checked.
pub fn load_rate_tables_from_dir(path: &Path) -> Result<Vec<RateTable>> {
    let mut tables = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.path().extension().map_or(false, |ext| ext == "json") {
                let data = std::fs::read_to_string(entry.path())?;
                match serde_json::from_str::<RateTable>(&data) {
                    Ok(table) => tables.push(table),
                    Err(err) => {
                        tracing::warn!(file = ?entry.path(), error = %err, "Failed to parse rate table");
                    }
                }
            }
        }
    }
    tables.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(tables)
}
