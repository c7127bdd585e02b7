//! Assembles the serializable report the presentation layer renders from.
//!
//! Every section that depends on optional hardware is an `Option` or an
//! empty list, so a missing channel hides a section instead of failing, and
//! a failure in one section never aborts the others.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::channels::ChannelKind;
use crate::config::EnergySettings;
use crate::intervals::{self, ActiveInterval};
use crate::metrics::{self, EfficiencyGrade, RoomBalance, RuntimeTotals};
use crate::models::ReadingTable;

/// Chart resampling bucket, matching the thermostat's report cadence.
pub const RESAMPLE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub channel: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MotionTimeline {
    pub channel: String,
    pub blocks: Vec<ActiveInterval>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestrictedReport {
    pub heat_minutes: f64,
    pub aux_minutes: f64,
    pub total_heating_minutes: f64,
    pub aux_percentage: f64,
    pub critical_temp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyReport {
    pub totals: RuntimeTotals,
    pub total_heating_minutes: f64,
    pub aux_percentage: f64,
    pub estimated_cost: f64,
    /// Absent when the export has no outdoor temperature channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted: Option<RestrictedReport>,
    pub grade: EfficiencyGrade,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub energy: EnergyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_balance: Option<RoomBalance>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub motion: Vec<MotionTimeline>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub temperature: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setpoints: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub humidity: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outdoor: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub air_quality: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runtime_minutes: Vec<ChartSeries>,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn analyze(
    table: &ReadingTable,
    settings: &EnergySettings,
    motion_gap: Duration,
) -> AnalysisReport {
    let mut warnings = Vec::new();

    let totals = RuntimeTotals::from_table(table);
    let restricted = metrics::restricted_totals(table, settings.critical_outdoor_temp);
    let grade = metrics::efficiency_grade(&totals, restricted.as_ref(), settings.grade_basis);
    let estimated_cost = metrics::estimated_cost(&totals, settings);

    let energy = EnergyReport {
        total_heating_minutes: totals.total_heating_minutes(),
        aux_percentage: totals.aux_percentage(),
        estimated_cost,
        restricted: restricted.map(|r| RestrictedReport {
            heat_minutes: r.heat_minutes,
            aux_minutes: r.aux_minutes,
            total_heating_minutes: r.total_heating_minutes(),
            aux_percentage: r.aux_percentage(),
            critical_temp: r.critical_temp,
        }),
        grade: grade.clone(),
        totals,
    };

    let room_balance = match metrics::room_balance(table) {
        Ok(balance) => Some(balance),
        Err(err) => {
            log::warn!("Room balancing skipped: {}", err);
            warnings.push(err.to_string());
            None
        }
    };

    let motion = table
        .catalog()
        .channels_of(ChannelKind::Motion)
        .map(|channel| MotionTimeline {
            channel: channel.to_string(),
            blocks: intervals::occupancy_blocks(table, channel, motion_gap),
        })
        .collect();

    let recommendations =
        recommendations(&grade, estimated_cost, settings.critical_outdoor_temp);

    AnalysisReport {
        energy,
        room_balance,
        motion,
        temperature: resampled_series(table, ChannelKind::Temperature),
        setpoints: resampled_series(table, ChannelKind::Setpoint),
        humidity: resampled_series(table, ChannelKind::Humidity),
        outdoor: resampled_series(table, ChannelKind::OutdoorWeather),
        air_quality: air_quality_series(table),
        runtime_minutes: runtime_series(table),
        recommendations,
        warnings,
    }
}

/// 5-minute mean resamples of every channel of one kind.
fn resampled_series(table: &ReadingTable, kind: ChannelKind) -> Vec<ChartSeries> {
    let bucket = Duration::minutes(RESAMPLE_MINUTES);
    table
        .catalog()
        .channels_of(kind)
        .filter_map(|channel| {
            let points = table.resample_mean(channel, bucket)?;
            Some(ChartSeries {
                channel: channel.to_string(),
                points,
            })
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

/// Raw (non-null) VOC / CO2 / index traces; concentrations spike too fast
/// for mean smoothing to be honest.
fn air_quality_series(table: &ReadingTable) -> Vec<ChartSeries> {
    table
        .catalog()
        .air_quality_channels()
        .filter_map(|(channel, _)| {
            let values = table.column(channel)?;
            let points: Vec<(NaiveDateTime, f64)> = table
                .timestamps()
                .iter()
                .zip(values.iter())
                .filter_map(|(ts, v)| v.map(|v| (*ts, v)))
                .collect();
            if points.is_empty() {
                return None;
            }
            Some(ChartSeries {
                channel: channel.to_string(),
                points,
            })
        })
        .collect()
}

/// Per-report-block runtime in minutes for each equipment channel.
fn runtime_series(table: &ReadingTable) -> Vec<ChartSeries> {
    table
        .catalog()
        .channels_of(ChannelKind::HvacRuntime)
        .filter_map(|channel| {
            let values = table.column(channel)?;
            let points: Vec<(NaiveDateTime, f64)> = table
                .timestamps()
                .iter()
                .zip(values.iter())
                .filter_map(|(ts, v)| v.map(|secs| (*ts, secs / 60.0)))
                .collect();
            if points.is_empty() {
                return None;
            }
            Some(ChartSeries {
                channel: channel.to_string(),
                points,
            })
        })
        .collect()
}

fn recommendations(grade: &EfficiencyGrade, estimated_cost: f64, critical_temp: f64) -> Vec<String> {
    let mut tips = Vec::new();
    match grade {
        EfficiencyGrade::Scored { score, .. } if *score <= 70 => {
            tips.push(format!(
                "High unnecessary aux usage above {critical_temp}°F: check the thermostat's threshold settings."
            ));
            tips.push(
                "Lower 'Aux Heat Max Outdoor Temperature' to 35°F or below so aux does not run \
                 when the heat pump can manage."
                    .to_string(),
            );
        }
        EfficiencyGrade::Scored { score, .. } if *score == 85 => {
            tips.push(
                "Good efficiency in mild temperatures. Lowering 'Aux Heat Max Outdoor \
                 Temperature' slightly may squeeze out a little more."
                    .to_string(),
            );
        }
        EfficiencyGrade::Scored { .. } => {
            tips.push(
                "Excellent performance: the aux thresholds are set well, or the heat pump is \
                 highly efficient."
                    .to_string(),
            );
        }
        EfficiencyGrade::InsufficientData => {}
    }
    if estimated_cost > 50.0 {
        tips.push(
            "High overall cost: use aggressive schedule setbacks when away or sleeping."
                .to_string(),
        );
    }
    if tips.is_empty() {
        tips.push("The system is running efficiently.".to_string());
    }
    tips
}
