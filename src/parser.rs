//! CSV Normalizer: raw export bytes into a timestamp-indexed [`ReadingTable`].
//!
//! The export starts with a block of metadata rows with ragged field counts,
//! then a header row, then data rows carrying a `Date` column, a `Time`
//! column and a variable set of named numeric channels.

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};

use crate::channels::{self, ChannelCatalog, ColumnStats};
use crate::config::{HeaderRows, LoadOptions};
use crate::errors::ParseError;
use crate::models::ReadingTable;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How many leading rows the header probe inspects in `HeaderRows::Auto`.
const HEADER_PROBE_ROWS: usize = 10;

pub fn parse_export(bytes: &[u8], options: &LoadOptions) -> Result<ReadingTable, ParseError> {
    // Metadata rows have fewer fields than data rows, so the reader must be
    // flexible and header handling is done by hand.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let header = locate_header(&mut reader, options.header_rows)?;
    let names: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    let date_idx = require_column(&names, channels::DATE_COLUMN)?;
    let time_idx = require_column(&names, channels::TIME_COLUMN)?;

    // Sensor columns are everything except the date/time pair.
    let sensor_indices: Vec<usize> = (0..names.len())
        .filter(|i| *i != date_idx && *i != time_idx)
        .collect();
    let sensor_names: Vec<String> = sensor_indices
        .iter()
        .map(|i| names[*i].clone())
        .collect();

    let mut timestamps: Vec<NaiveDateTime> = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); sensor_indices.len()];
    let mut dropped = 0usize;

    for (row_index, result) in reader.records().enumerate() {
        let record = result?;
        let date = field(&record, date_idx);
        let time = field(&record, time_idx);
        if date.is_empty() || time.is_empty() {
            dropped += 1;
            continue;
        }

        // One bad literal aborts the whole load; the table is either fully
        // indexed by timestamp or not produced at all.
        let literal = format!("{} {}", date, time);
        let ts = NaiveDateTime::parse_from_str(&literal, TIMESTAMP_FORMAT).map_err(|source| {
            ParseError::Timestamp {
                row: row_index + 1,
                value: literal.clone(),
                source,
            }
        })?;

        timestamps.push(ts);
        for (slot, src_idx) in columns.iter_mut().zip(sensor_indices.iter()) {
            let raw = field(&record, *src_idx);
            // Empty or non-numeric cells (units, labels) become nulls; a
            // text cell never kills a load.
            slot.push(raw.parse::<f64>().ok());
        }
    }

    log::info!(
        "Loaded {} readings across {} channels ({} rows dropped for missing date/time)",
        timestamps.len(),
        sensor_names.len(),
        dropped
    );

    let catalog = ChannelCatalog::from_names(&sensor_names);
    let mut table = ReadingTable::new(timestamps, sensor_names.clone(), columns, catalog);
    if options.repair_channels {
        let stats: Vec<(String, ColumnStats)> = sensor_names
            .iter()
            .filter_map(|name| Some((name.clone(), table.column_stats(name)?)))
            .collect();
        for (name, kind) in channels::repair_catalog(table.catalog_mut(), &stats) {
            log::warn!(
                "Reclassified channel '{}' as {:?} from its value range",
                name,
                kind
            );
        }
    }
    Ok(table)
}

/// Finds the header record: either a fixed number of metadata rows to skip,
/// or a probe for the first row that carries both `Date` and `Time` cells.
fn locate_header<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    header_rows: HeaderRows,
) -> Result<StringRecord, ParseError> {
    let mut record = StringRecord::new();
    match header_rows {
        HeaderRows::Fixed(skip) => {
            for _ in 0..skip {
                if !reader.read_record(&mut record)? {
                    return Err(ParseError::HeaderNotFound { scanned: skip });
                }
            }
            if !reader.read_record(&mut record)? {
                return Err(ParseError::HeaderNotFound { scanned: skip + 1 });
            }
            Ok(record.clone())
        }
        HeaderRows::Auto => {
            for _ in 0..HEADER_PROBE_ROWS {
                if !reader.read_record(&mut record)? {
                    break;
                }
                let mut has_date = false;
                let mut has_time = false;
                for cell in record.iter() {
                    match cell.trim() {
                        c if c == channels::DATE_COLUMN => has_date = true,
                        c if c == channels::TIME_COLUMN => has_time = true,
                        _ => {}
                    }
                }
                if has_date && has_time {
                    return Ok(record.clone());
                }
            }
            Err(ParseError::HeaderNotFound {
                scanned: HEADER_PROBE_ROWS,
            })
        }
    }
}

fn require_column(names: &[String], column: &str) -> Result<usize, ParseError> {
    names
        .iter()
        .position(|n| n == column)
        .ok_or_else(|| ParseError::MissingColumn {
            column: column.to_string(),
        })
}

/// Trimmed field access tolerant of ragged rows; a short row reads as empty.
fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).map(str::trim).unwrap_or("")
}
