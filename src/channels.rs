//! Heuristic classification of export columns into channel kinds.
//!
//! Column names vary release to release, so everything here is substring
//! rules plus, for the ambiguous generic "Thermostat N" columns, value-range
//! repair rules applied after parsing.

use serde::Serialize;

pub const DATE_COLUMN: &str = "Date";
pub const TIME_COLUMN: &str = "Time";

pub const HEAT_RUNTIME: &str = "Heat Stage 1 (sec)";
pub const AUX_RUNTIME: &str = "Aux Heat 1 (sec)";
pub const COOL_RUNTIME: &str = "Cool Stage 1 (sec)";
pub const OUTDOOR_TEMP: &str = "Outdoor Temp (F)";

/// Name prefix of the ambiguous sensor columns eligible for repair.
pub const GENERIC_SENSOR_PREFIX: &str = "Thermostat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityKind {
    Voc,
    Co2,
    /// Atmospheric pressure. Functionally inert, kept only for display.
    Pressure,
    /// The composite air-quality index score.
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Temperature,
    Setpoint,
    OutdoorWeather,
    Motion,
    Humidity,
    AirQuality(AirQualityKind),
    HvacRuntime,
    Unknown,
}

/// Classifies a trimmed column name. Ordered rules, first match wins.
pub fn classify_name(name: &str) -> ChannelKind {
    let lower = name.to_lowercase();
    if name.contains("Outdoor") || name.contains("Wind Speed") {
        ChannelKind::OutdoorWeather
    } else if name.contains("Set Temp") {
        ChannelKind::Setpoint
    } else if name.contains("Motion") || name.contains("Occupancy") {
        ChannelKind::Motion
    } else if lower.contains("humidity") || lower.contains("%rh") {
        ChannelKind::Humidity
    } else if name.contains("(sec)") {
        ChannelKind::HvacRuntime
    } else if name.contains("VOCppm") {
        ChannelKind::AirQuality(AirQualityKind::Voc)
    } else if name.contains("CO2ppm") {
        ChannelKind::AirQuality(AirQualityKind::Co2)
    } else if name.contains("AirQuality") {
        ChannelKind::AirQuality(AirQualityKind::Index)
    } else if name.contains("(F)") || name.contains("Temp") {
        ChannelKind::Temperature
    } else {
        ChannelKind::Unknown
    }
}

/// Per-load classification of every sensor column. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelCatalog {
    entries: Vec<(String, ChannelKind)>,
}

impl ChannelCatalog {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let entries = names
            .iter()
            .map(|n| (n.as_ref().to_string(), classify_name(n.as_ref())))
            .collect();
        Self { entries }
    }

    pub fn kind_of(&self, name: &str) -> ChannelKind {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, k)| *k)
            .unwrap_or(ChannelKind::Unknown)
    }

    pub fn relabel(&mut self, name: &str, kind: ChannelKind) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = kind;
        }
    }

    /// Channel names of one kind, in column order.
    pub fn channels_of(&self, kind: ChannelKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, k)| *k == kind)
            .map(|(n, _)| n.as_str())
    }

    pub fn air_quality_channels(&self) -> impl Iterator<Item = (&str, AirQualityKind)> {
        self.entries.iter().filter_map(|(n, k)| match k {
            ChannelKind::AirQuality(aq) => Some((n.as_str(), *aq)),
            _ => None,
        })
    }

    /// Indoor temperature channels usable for room balancing. Zone summary
    /// columns are excluded the same way setpoints and outdoor readings are
    /// (those never reach Temperature kind in the first place).
    pub fn room_channels(&self) -> Vec<&str> {
        self.channels_of(ChannelKind::Temperature)
            .filter(|n| !n.contains("Zone"))
            .collect()
    }

    /// The channel room offsets are measured against: the first room channel
    /// that looks like the main thermostat probe.
    pub fn baseline_channel(&self) -> Option<&str> {
        self.room_channels()
            .into_iter()
            .find(|n| n.contains(GENERIC_SENSOR_PREFIX) || n.contains("Current Temp"))
    }
}

/// Summary statistics used by the repair rules.
#[derive(Debug, Clone, Copy)]
pub struct ColumnStats {
    pub mean: f64,
    pub max: f64,
    pub samples: usize,
}

/// One value-range repair rule. The rules are mutually exclusive by range,
/// but they are still evaluated in a fixed order with first-match-wins so
/// each one can be tested on its own.
pub struct RepairRule {
    pub name: &'static str,
    pub target: ChannelKind,
    predicate: fn(&ColumnStats) -> bool,
}

impl RepairRule {
    pub fn matches(&self, stats: &ColumnStats) -> bool {
        (self.predicate)(stats)
    }
}

pub fn repair_rules() -> [RepairRule; 3] {
    [
        RepairRule {
            name: "pressure-range",
            target: ChannelKind::AirQuality(AirQualityKind::Pressure),
            predicate: |s| (80_000.0..=120_000.0).contains(&s.mean),
        },
        RepairRule {
            name: "voc-peak",
            target: ChannelKind::AirQuality(AirQualityKind::Voc),
            predicate: |s| s.max > 5_000.0,
        },
        RepairRule {
            name: "co2-band",
            target: ChannelKind::AirQuality(AirQualityKind::Co2),
            predicate: |s| s.mean > 300.0 && s.max < 10_000.0,
        },
    ]
}

/// Reassigns mislabeled generic sensor columns by their value ranges.
/// At most one relabel per column; the CO2 label is claimed at most once
/// across the whole pass. Returns the relabels that were applied.
pub fn repair_catalog(
    catalog: &mut ChannelCatalog,
    stats: &[(String, ColumnStats)],
) -> Vec<(String, ChannelKind)> {
    let rules = repair_rules();
    let mut co2_claimed = catalog
        .entries
        .iter()
        .any(|(_, k)| *k == ChannelKind::AirQuality(AirQualityKind::Co2));
    let mut applied = Vec::new();

    for (name, col_stats) in stats {
        if col_stats.samples == 0 {
            continue;
        }
        // Only the ambiguous generic columns are eligible; anything the name
        // rules already claimed keeps its classification.
        if !name.starts_with(GENERIC_SENSOR_PREFIX)
            || catalog.kind_of(name) != ChannelKind::Unknown
        {
            continue;
        }
        for rule in &rules {
            if rule.target == ChannelKind::AirQuality(AirQualityKind::Co2) && co2_claimed {
                continue;
            }
            if rule.matches(col_stats) {
                catalog.relabel(name, rule.target);
                if rule.target == ChannelKind::AirQuality(AirQualityKind::Co2) {
                    co2_claimed = true;
                }
                applied.push((name.clone(), rule.target));
                break;
            }
        }
    }
    applied
}
