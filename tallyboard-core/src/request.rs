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

//! Aggregation request parameters
//!
//! Every chart render builds one immutable [`AggregationRequest`]. Contract
//! violations (`top_n < 1`, unknown frequency) are rejected here so the
//! pipeline itself never fails.

use crate::error::{Result, TallyboardError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Default number of labels kept before collapsing into "Other"
pub const DEFAULT_TOP_N: usize = 5;

/// Bucket frequency for the activity chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Day,
    #[default]
    Week,
    Month,
}

impl Frequency {
    /// Short code used in config files and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Day => "D",
            Frequency::Week => "W",
            Frequency::Month => "M",
        }
    }
}

impl FromStr for Frequency {
    type Err = TallyboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Frequency::Day),
            "w" | "week" | "weekly" => Ok(Frequency::Week),
            "m" | "month" | "monthly" => Ok(Frequency::Month),
            _ => Err(TallyboardError::UnknownFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = TallyboardError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reduction applied per label by the label-aggregate chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Sum,
    Mean,
    Count,
}

impl FromStr for AggregationMode {
    type Err = TallyboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregationMode::Sum),
            "mean" | "avg" => Ok(AggregationMode::Mean),
            "count" => Ok(AggregationMode::Count),
            _ => Err(TallyboardError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationMode::Sum => "sum",
            AggregationMode::Mean => "mean",
            AggregationMode::Count => "count",
        };
        f.write_str(name)
    }
}

/// Label selection. An empty selection means "all labels", never "none".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl LabelFilter {
    /// Build a filter from a label list; an empty list keeps every label
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        if set.is_empty() {
            LabelFilter::All
        } else {
            LabelFilter::Only(set)
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            LabelFilter::All => true,
            LabelFilter::Only(set) => set.contains(label),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, LabelFilter::All)
    }
}

/// Parameters of one stacked-activity aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRequest {
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
    label_filter: LabelFilter,
    top_n: usize,
    cumulative: bool,
}

impl AggregationRequest {
    /// Start a request covering `[start, end]` with default settings
    pub fn builder(start: NaiveDate, end: NaiveDate) -> AggregationRequestBuilder {
        AggregationRequestBuilder {
            start,
            end,
            frequency: Frequency::default(),
            label_filter: LabelFilter::All,
            top_n: DEFAULT_TOP_N,
            cumulative: false,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn label_filter(&self) -> &LabelFilter {
        &self.label_filter
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn cumulative(&self) -> bool {
        self.cumulative
    }

    /// True when `start > end`; such a request aggregates to an empty series
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Inclusive date-range check on the calendar date
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Builder for [`AggregationRequest`]
#[derive(Debug, Clone)]
pub struct AggregationRequestBuilder {
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
    label_filter: LabelFilter,
    top_n: usize,
    cumulative: bool,
}

impl AggregationRequestBuilder {
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn label_filter(mut self, filter: LabelFilter) -> Self {
        self.label_filter = filter;
        self
    }

    pub fn labels<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_filter(LabelFilter::from_labels(labels))
    }

    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn build(self) -> Result<AggregationRequest> {
        if self.top_n < 1 {
            return Err(TallyboardError::InvalidRequest(format!(
                "top_n must be at least 1, got {}",
                self.top_n
            )));
        }

        Ok(AggregationRequest {
            start: self.start,
            end: self.end,
            frequency: self.frequency,
            label_filter: self.label_filter,
            top_n: self.top_n,
            cumulative: self.cumulative,
        })
    }
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TallyboardError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::Day);
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Week);
        assert_eq!(" m ".parse::<Frequency>().unwrap(), Frequency::Month);
        assert!(matches!(
            "Q".parse::<Frequency>(),
            Err(TallyboardError::UnknownFrequency(_))
        ));
    }

    #[test]
    fn test_frequency_serde_uses_code() {
        let json = serde_json::to_string(&Frequency::Month).unwrap();
        assert_eq!(json, "\"M\"");
        let parsed: Frequency = serde_json::from_str("\"D\"").unwrap();
        assert_eq!(parsed, Frequency::Day);
        assert!(serde_json::from_str::<Frequency>("\"fortnight\"").is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("SUM".parse::<AggregationMode>().unwrap(), AggregationMode::Sum);
        assert_eq!("mean".parse::<AggregationMode>().unwrap(), AggregationMode::Mean);
        assert_eq!("count".parse::<AggregationMode>().unwrap(), AggregationMode::Count);
        assert!("median".parse::<AggregationMode>().is_err());
    }

    #[test]
    fn test_empty_label_filter_means_all() {
        let filter = LabelFilter::from_labels(Vec::<String>::new());
        assert!(filter.is_all());
        assert!(filter.matches("anything"));
        assert!(filter.matches(""));

        let filter = LabelFilter::from_labels(["Sleep"]);
        assert!(filter.matches("Sleep"));
        assert!(!filter.matches("Study"));
    }

    #[test]
    fn test_builder_defaults() {
        let request = AggregationRequest::builder(date(2024, 1, 1), date(2024, 1, 31))
            .build()
            .unwrap();
        assert_eq!(request.frequency(), Frequency::Week);
        assert_eq!(request.top_n(), DEFAULT_TOP_N);
        assert!(!request.cumulative());
        assert!(request.label_filter().is_all());
    }

    #[test]
    fn test_builder_rejects_zero_top_n() {
        let result = AggregationRequest::builder(date(2024, 1, 1), date(2024, 1, 31))
            .top_n(0)
            .build();
        assert!(matches!(result, Err(TallyboardError::InvalidRequest(_))));
    }

    #[test]
    fn test_inverted_range_is_allowed() {
        let request = AggregationRequest::builder(date(2024, 2, 1), date(2024, 1, 1))
            .build()
            .unwrap();
        assert!(request.is_inverted());
        assert!(!request.covers(date(2024, 1, 15)));
    }

    #[test]
    fn test_covers_is_inclusive() {
        let request = AggregationRequest::builder(date(2024, 1, 1), date(2024, 1, 7))
            .build()
            .unwrap();
        assert!(request.covers(date(2024, 1, 1)));
        assert!(request.covers(date(2024, 1, 7)));
        assert!(!request.covers(date(2024, 1, 8)));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
        assert!(matches!(
            parse_date("2023-02-29"),
            Err(TallyboardError::InvalidDate(_))
        ));
    }
}
