use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How many metadata rows precede the header. The export carries 4 or 5
/// depending on the app version and no version marker, so the default is to
/// probe for the header instead of trusting a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRows {
    Auto,
    Fixed(usize),
}

impl Default for HeaderRows {
    fn default() -> Self {
        HeaderRows::Auto
    }
}

/// Options for one load of an export file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default)]
    pub header_rows: HeaderRows,
    /// Whether to reclassify ambiguous "Thermostat N" columns by value range.
    #[serde(default = "default_repair")]
    pub repair_channels: bool,
}

fn default_repair() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header_rows: HeaderRows::default(),
            repair_channels: default_repair(),
        }
    }
}

/// Which aux-percentage variant the efficiency grade is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GradeBasis {
    /// Aux share of heating while the outdoor temperature was at or above
    /// the critical threshold. This is the efficiency metric proper.
    Restricted,
    /// Aux share of all heating. Expected to be high in deep winter.
    Overall,
}

impl Default for GradeBasis {
    fn default() -> Self {
        GradeBasis::Restricted
    }
}

/// User-adjustable energy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergySettings {
    /// Electricity rate, $/kWh.
    #[serde(default = "default_kwh_price")]
    pub kwh_price: f64,
    /// Heat pump power draw, kW.
    #[serde(default = "default_heat_pump_kw")]
    pub heat_pump_kw: f64,
    /// Auxiliary/emergency heat power draw, kW.
    #[serde(default = "default_aux_heat_kw")]
    pub aux_heat_kw: f64,
    /// Outdoor temperature at or above which aux heat is considered
    /// unnecessary, in the same unit as the temperature channels.
    #[serde(default = "default_critical_temp")]
    pub critical_outdoor_temp: f64,
    #[serde(default)]
    pub grade_basis: GradeBasis,
}

fn default_kwh_price() -> f64 {
    0.14
}

fn default_heat_pump_kw() -> f64 {
    3.0
}

fn default_aux_heat_kw() -> f64 {
    5.0
}

fn default_critical_temp() -> f64 {
    40.0
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            kwh_price: default_kwh_price(),
            heat_pump_kw: default_heat_pump_kw(),
            aux_heat_kw: default_aux_heat_kw(),
            critical_outdoor_temp: default_critical_temp(),
            grade_basis: GradeBasis::default(),
        }
    }
}

impl EnergySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("kwh_price", self.kwh_price),
            ("heat_pump_kw", self.heat_pump_kw),
            ("aux_heat_kw", self.aux_heat_kw),
            ("critical_outdoor_temp", self.critical_outdoor_temp),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}
