// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Tabular records
//!
//! A record is one row of the append-only store. The timestamp is kept as
//! the text that was written so that rows with an unreadable timestamp
//! survive in the store; they are only dropped when aggregated over time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Header columns of the record store, in write order
pub const RECORD_COLUMNS: [&str; 3] = ["timestamp", "label", "value"];

/// Format used when stamping new rows (ISO-8601, second precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Naive date-time spellings accepted by [`parse_timestamp`]
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// One row of the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Raw timestamp text as stored
    pub timestamp: String,
    /// Free-form category label (may be empty)
    pub label: String,
    /// Numeric value
    pub value: f64,
}

impl Record {
    pub fn new(timestamp: impl Into<String>, label: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            label: label.into(),
            value,
        }
    }

    /// Create a record stamped with the current local time
    pub fn stamped(label: impl Into<String>, value: f64) -> Self {
        let now = Local::now().naive_local();
        Self::new(now.format(TIMESTAMP_FORMAT).to_string(), label, value)
    }

    /// Parsed timestamp, or `None` when the stored text is not a date-time
    pub fn instant(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Calendar date of the timestamp
    pub fn date(&self) -> Option<NaiveDate> {
        self.instant().map(|ts| ts.date())
    }
}

/// Parse a stored timestamp.
///
/// Accepts ISO-8601 date-times with `T` or a space as separator (seconds and
/// fractions optional), RFC 3339 with an offset (the wall-clock time in that
/// offset is kept), and bare `YYYY-MM-DD` dates which map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
