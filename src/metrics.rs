//! Derived efficiency metrics: runtime totals, aux-heat share, estimated
//! cost, the discrete efficiency grade and room-temperature offsets.

use serde::Serialize;

use crate::channels;
use crate::config::{EnergySettings, GradeBasis};
use crate::errors::AnalysisError;
use crate::models::ReadingTable;

/// Grading only happens above these cumulative heating minutes; below them
/// a numeric score would be noise.
const RESTRICTED_GUARD_MINUTES: f64 = 30.0;
const OVERALL_GUARD_MINUTES: f64 = 60.0;

/// Offset beyond which a room counts as running hot or cold.
const OFFSET_TOLERANCE: f64 = 1.0;

/// Runtime column sums converted from run-seconds to minutes. A channel the
/// hardware does not have sums to zero; that is a missing feature, not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeTotals {
    pub heat_minutes: f64,
    pub aux_minutes: f64,
    pub cool_minutes: f64,
}

impl RuntimeTotals {
    pub fn from_table(table: &ReadingTable) -> Self {
        let minutes = |name: &str| table.column_sum(name).unwrap_or(0.0) / 60.0;
        Self {
            heat_minutes: minutes(channels::HEAT_RUNTIME),
            aux_minutes: minutes(channels::AUX_RUNTIME),
            cool_minutes: minutes(channels::COOL_RUNTIME),
        }
    }

    pub fn total_heating_minutes(&self) -> f64 {
        self.heat_minutes + self.aux_minutes
    }

    /// Aux share of all heating, in [0, 100]. Zero heating grades as zero
    /// rather than dividing by it.
    pub fn aux_percentage(&self) -> f64 {
        aux_share(self.aux_minutes, self.total_heating_minutes())
    }
}

pub fn estimated_cost(totals: &RuntimeTotals, settings: &EnergySettings) -> f64 {
    (totals.aux_minutes / 60.0 * settings.aux_heat_kw
        + totals.heat_minutes / 60.0 * settings.heat_pump_kw)
        * settings.kwh_price
}

/// Aux and heat-pump runtime restricted to readings where the outdoor
/// temperature was at or above the critical threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestrictedTotals {
    pub heat_minutes: f64,
    pub aux_minutes: f64,
    pub critical_temp: f64,
}

impl RestrictedTotals {
    pub fn total_heating_minutes(&self) -> f64 {
        self.heat_minutes + self.aux_minutes
    }

    pub fn aux_percentage(&self) -> f64 {
        aux_share(self.aux_minutes, self.total_heating_minutes())
    }
}

/// `None` when there is no outdoor temperature channel; the restricted
/// metric is then unavailable rather than silently zero.
pub fn restricted_totals(table: &ReadingTable, critical_temp: f64) -> Option<RestrictedTotals> {
    let outdoor = table.column(channels::OUTDOOR_TEMP)?;
    let minutes_above = |name: &str| -> f64 {
        match table.column(name) {
            Some(values) => {
                outdoor
                    .iter()
                    .zip(values.iter())
                    .filter_map(|(o, v)| match (o, v) {
                        (Some(o), Some(v)) if *o >= critical_temp => Some(*v),
                        _ => None,
                    })
                    .sum::<f64>()
                    / 60.0
            }
            None => 0.0,
        }
    };
    Some(RestrictedTotals {
        heat_minutes: minutes_above(channels::HEAT_RUNTIME),
        aux_minutes: minutes_above(channels::AUX_RUNTIME),
        critical_temp,
    })
}

fn aux_share(aux_minutes: f64, total_heating_minutes: f64) -> f64 {
    if total_heating_minutes > 0.0 {
        aux_minutes / total_heating_minutes * 100.0
    } else {
        0.0
    }
}

/// Ordered grade buckets over the aux percentage; upper bound exclusive, so
/// 30.0 lands in the last bucket.
const GRADE_TABLE: [(f64, u8, &str, &str); 4] = [
    (5.0, 95, "A+ Excellent", "green"),
    (15.0, 85, "A Good", "lightgreen"),
    (30.0, 70, "B Fair", "orange"),
    (f64::INFINITY, 50, "C Poor", "red"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EfficiencyGrade {
    Scored {
        score: u8,
        label: &'static str,
        color: &'static str,
        aux_percentage: f64,
    },
    /// Sentinel for too small a heating sample; deliberately not a score.
    InsufficientData,
}

impl EfficiencyGrade {
    pub fn label(&self) -> &'static str {
        match self {
            EfficiencyGrade::Scored { label, .. } => label,
            EfficiencyGrade::InsufficientData => "insufficient data",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            EfficiencyGrade::Scored { color, .. } => color,
            EfficiencyGrade::InsufficientData => "gray",
        }
    }
}

pub fn grade_aux_percentage(pct: f64) -> (u8, &'static str, &'static str) {
    for (limit, score, label, color) in GRADE_TABLE {
        if pct < limit {
            return (score, label, color);
        }
    }
    // Unreachable: the last bucket is unbounded.
    let (_, score, label, color) = GRADE_TABLE[GRADE_TABLE.len() - 1];
    (score, label, color)
}

/// Applies the grade table to whichever aux-percentage variant the settings
/// select, gated by the minimum-sample guard for that variant.
pub fn efficiency_grade(
    totals: &RuntimeTotals,
    restricted: Option<&RestrictedTotals>,
    basis: GradeBasis,
) -> EfficiencyGrade {
    let (pct, heating_minutes, guard) = match basis {
        GradeBasis::Restricted => match restricted {
            Some(r) => (
                r.aux_percentage(),
                r.total_heating_minutes(),
                RESTRICTED_GUARD_MINUTES,
            ),
            None => return EfficiencyGrade::InsufficientData,
        },
        GradeBasis::Overall => (
            totals.aux_percentage(),
            totals.total_heating_minutes(),
            OVERALL_GUARD_MINUTES,
        ),
    };
    if heating_minutes <= guard {
        return EfficiencyGrade::InsufficientData;
    }
    let (score, label, color) = grade_aux_percentage(pct);
    EfficiencyGrade::Scored {
        score,
        label,
        color,
        aux_percentage: pct,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetClass {
    Hot,
    Cold,
    Balanced,
}

fn classify_offset(offset: f64) -> OffsetClass {
    if offset > OFFSET_TOLERANCE {
        OffsetClass::Hot
    } else if offset < -OFFSET_TOLERANCE {
        OffsetClass::Cold
    } else {
        OffsetClass::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomOffset {
    pub sensor: String,
    /// Signed all-time mean delta against the baseline channel.
    pub offset: f64,
    pub class: OffsetClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomBalance {
    pub baseline: String,
    pub offsets: Vec<RoomOffset>,
}

/// Room-temperature offsets against the main thermostat probe. The baseline
/// is excluded from its own output.
pub fn room_balance(table: &ReadingTable) -> Result<RoomBalance, AnalysisError> {
    let rooms = table.catalog().room_channels();
    if rooms.len() <= 1 {
        return Err(AnalysisError::InsufficientSensors { found: rooms.len() });
    }

    let not_found = || AnalysisError::BaselineNotFound {
        candidates: rooms.iter().map(|r| r.to_string()).collect(),
    };
    let baseline = table.catalog().baseline_channel().ok_or_else(not_found)?;
    let baseline_mean = table.column_mean(baseline).ok_or_else(not_found)?;

    let offsets = rooms
        .iter()
        .filter(|room| **room != baseline)
        .filter_map(|room| {
            let offset = table.column_mean(room)? - baseline_mean;
            Some(RoomOffset {
                sensor: room.to_string(),
                offset,
                class: classify_offset(offset),
            })
        })
        .collect();

    Ok(RoomBalance {
        baseline: baseline.to_string(),
        offsets,
    })
}
