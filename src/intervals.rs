//! Run-length grouping of occupancy samples into active intervals.
//!
//! The thermostat reports every 5 minutes, so two qualifying samples more
//! than twice that apart belong to different activity blocks.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::models::ReadingTable;

/// Default merge tolerance between samples, twice the report cadence.
pub const DEFAULT_GAP_MINUTES: i64 = 10;

/// A sample counts as active when the channel reads at least this value.
pub const ACTIVE_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl ActiveInterval {
    fn close(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let duration_minutes = ((end - start).num_seconds() as f64 / 60.0).round() as i64;
        Self {
            start,
            end,
            duration_minutes,
        }
    }
}

/// Lazy single-pass grouping of sorted timestamps into [`ActiveInterval`]s.
/// Never re-scans: each input timestamp is consumed exactly once.
pub struct ActiveIntervals<I> {
    samples: I,
    gap: Duration,
    open: Option<(NaiveDateTime, NaiveDateTime)>,
}

pub fn active_intervals<I>(samples: I, gap: Duration) -> ActiveIntervals<I::IntoIter>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    ActiveIntervals {
        samples: samples.into_iter(),
        gap,
        open: None,
    }
}

impl<I: Iterator<Item = NaiveDateTime>> Iterator for ActiveIntervals<I> {
    type Item = ActiveInterval;

    fn next(&mut self) -> Option<ActiveInterval> {
        loop {
            match self.samples.next() {
                Some(ts) => match self.open {
                    None => self.open = Some((ts, ts)),
                    Some((start, last)) => {
                        if ts - last > self.gap {
                            self.open = Some((ts, ts));
                            return Some(ActiveInterval::close(start, last));
                        }
                        self.open = Some((start, ts));
                    }
                },
                // Close whatever block is still open at end of input.
                None => return self.open.take().map(|(s, l)| ActiveInterval::close(s, l)),
            }
        }
    }
}

/// Activity blocks of one motion/occupancy channel. An absent channel or a
/// channel with no qualifying samples yields no blocks, not an error.
pub fn occupancy_blocks(table: &ReadingTable, channel: &str, gap: Duration) -> Vec<ActiveInterval> {
    active_intervals(table.qualifying_timestamps(channel, ACTIVE_THRESHOLD), gap).collect()
}
