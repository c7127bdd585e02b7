//! Shared builders for the test modules.

use chrono::{Duration, NaiveDateTime};

use crate::channels::ChannelCatalog;
use crate::models::ReadingTable;

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// `n` timestamps starting at `start`, `step_minutes` apart.
pub fn cadence(start: &str, n: usize, step_minutes: i64) -> Vec<NaiveDateTime> {
    let start = ts(start);
    (0..n)
        .map(|i| start + Duration::minutes(step_minutes * i as i64))
        .collect()
}

pub fn some(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// Builds a table from named columns, deriving the catalog from the names
/// the same way a real load does.
pub fn table(
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<(&str, Vec<Option<f64>>)>,
) -> ReadingTable {
    let names: Vec<String> = columns.iter().map(|(n, _)| n.to_string()).collect();
    let data: Vec<Vec<Option<f64>>> = columns.into_iter().map(|(_, v)| v).collect();
    let catalog = ChannelCatalog::from_names(&names);
    ReadingTable::new(timestamps, names, data, catalog)
}

/// A plausible export: `meta_rows` ragged metadata lines, then the header,
/// then the data rows.
pub fn export_text(meta_rows: usize, header: &str, rows: &[&str]) -> String {
    let metadata = [
        "Smart Thermostat Export",
        "Model,SmartStat Premium",
        "Firmware,4.8.1.171",
        "Export period,2024-01-15 to 2024-01-16",
        "All times are thermostat-local",
    ];
    let mut out = String::new();
    for line in metadata.iter().take(meta_rows) {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}
