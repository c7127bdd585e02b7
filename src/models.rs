//! In-memory reading table produced by the normalizer.
//!
//! Timestamps are thermostat-local time with no timezone attached, matching
//! the export. Rows are assumed monotonically non-decreasing in time (the
//! export is written that way); duplicate timestamps are retained as
//! distinct rows, so sums, means and resample buckets see all of them.

use chrono::{Duration, NaiveDateTime};

use crate::channels::{ChannelCatalog, ColumnStats};

#[derive(Debug, Clone)]
pub struct ReadingTable {
    timestamps: Vec<NaiveDateTime>,
    names: Vec<String>,
    /// Column-major sensor values, each the same length as `timestamps`.
    columns: Vec<Vec<Option<f64>>>,
    catalog: ChannelCatalog,
}

impl ReadingTable {
    pub(crate) fn new(
        timestamps: Vec<NaiveDateTime>,
        names: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
        catalog: ChannelCatalog,
    ) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == timestamps.len()));
        debug_assert_eq!(names.len(), columns.len());
        Self {
            timestamps,
            names,
            columns,
            catalog,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn catalog(&self) -> &ChannelCatalog {
        &self.catalog
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut ChannelCatalog {
        &mut self.catalog
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Sum over the non-null values of a column. `None` when the channel is
    /// absent, so callers can distinguish missing hardware from a zero sum.
    pub fn column_sum(&self, name: &str) -> Option<f64> {
        Some(self.column(name)?.iter().flatten().sum())
    }

    /// All-time mean over the non-null values. `None` when the channel is
    /// absent or has no samples.
    pub fn column_mean(&self, name: &str) -> Option<f64> {
        let stats = self.column_stats(name)?;
        if stats.samples == 0 {
            None
        } else {
            Some(stats.mean)
        }
    }

    pub fn column_stats(&self, name: &str) -> Option<ColumnStats> {
        let values = self.column(name)?;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut samples = 0usize;
        for v in values.iter().flatten() {
            sum += v;
            if *v > max {
                max = *v;
            }
            samples += 1;
        }
        if samples == 0 {
            return None;
        }
        Some(ColumnStats {
            mean: sum / samples as f64,
            max,
            samples,
        })
    }

    /// Timestamps at which `name` reads at least `min`. Used for the
    /// occupancy timeline.
    pub fn qualifying_timestamps<'a>(
        &'a self,
        name: &str,
        min: f64,
    ) -> impl Iterator<Item = NaiveDateTime> + 'a {
        let values = self.column(name).unwrap_or(&[]);
        self.timestamps
            .iter()
            .zip(values.iter())
            .filter_map(move |(ts, v)| match v {
                Some(x) if *x >= min => Some(*ts),
                _ => None,
            })
    }

    /// Mean-resamples a column into fixed buckets aligned to the epoch.
    /// Single linear pass; relies on the sorted-timestamps invariant.
    /// `None` when the channel is absent.
    pub fn resample_mean(
        &self,
        name: &str,
        bucket: Duration,
    ) -> Option<Vec<(NaiveDateTime, f64)>> {
        let values = self.column(name)?;
        let bucket_secs = bucket.num_seconds().max(1);

        let mut out = Vec::new();
        let mut open: Option<(i64, NaiveDateTime, f64, usize)> = None;
        for (ts, value) in self.timestamps.iter().zip(values.iter()) {
            let Some(v) = value else { continue };
            let epoch = ts.and_utc().timestamp();
            let key = epoch.div_euclid(bucket_secs);
            if let Some((open_key, _, sum, n)) = open.as_mut() {
                if *open_key == key {
                    *sum += v;
                    *n += 1;
                    continue;
                }
            }
            if let Some((_, start, sum, n)) = open.take() {
                out.push((start, sum / n as f64));
            }
            let start = *ts - Duration::seconds(epoch.rem_euclid(bucket_secs));
            open = Some((key, start, *v, 1));
        }
        if let Some((_, start, sum, n)) = open {
            out.push((start, sum / n as f64));
        }
        Some(out)
    }
}
