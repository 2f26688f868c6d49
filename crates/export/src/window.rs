//! Export windows
//!
//! A half-open UTC interval `[start, end)`. All range math in the
//! exporter goes through this type so boundary conventions live in one
//! place.

use chrono::{DateTime, Duration, Utc};

#[cfg(test)]
#[path = "window_test.rs"]
mod tests;

/// Half-open export interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExportWindow {
    /// A window from `start` to `end`. An inverted pair collapses to an
    /// empty window at `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start > end {
            Self { start: end, end }
        } else {
            Self { start, end }
        }
    }

    /// The last `days` days ending at `end`.
    pub fn days_back(days: u32, end: DateTime<Utc>) -> Self {
        Self::new(end - Duration::days(i64::from(days)), end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    /// Clamp the start forward to `watermark` when it falls inside the
    /// window. Returns `None` when nothing of the window remains.
    pub fn clamp_start(&self, watermark: DateTime<Utc>) -> Option<Self> {
        if watermark >= self.end {
            return None;
        }
        if watermark <= self.start {
            return Some(*self);
        }
        Some(Self {
            start: watermark,
            end: self.end,
        })
    }

    /// Epoch-second bounds for store queries.
    pub fn epoch_bounds(&self) -> (f64, f64) {
        let to_epoch = |ts: DateTime<Utc>| {
            ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9
        };
        (to_epoch(self.start), to_epoch(self.end))
    }
}

impl std::fmt::Display for ExportWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} .. {})",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
