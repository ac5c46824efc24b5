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

//! Plottable outputs of the aggregation pipeline
//!
//! A [`BucketedSeries`] is a dense period × column table: every row carries
//! one value per column, in column order.

use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

/// Display name of the synthetic catch-all column
pub const OTHER_COLUMN: &str = "Other";

/// Column of a bucketed series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesColumn {
    /// A label retained by Top-N selection
    Label(String),
    /// Sum of every label dropped by Top-N selection
    Other,
}

impl SeriesColumn {
    pub fn name(&self) -> &str {
        match self {
            SeriesColumn::Label(label) => label,
            SeriesColumn::Other => OTHER_COLUMN,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, SeriesColumn::Other)
    }
}

impl fmt::Display for SeriesColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SeriesColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One period of a bucketed series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    /// First day of the bucket
    pub period: NaiveDate,
    /// One value per series column, in column order
    pub values: Vec<f64>,
}

impl SeriesRow {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Wide time-bucketed series, ready for a stacked chart
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BucketedSeries {
    columns: Vec<SeriesColumn>,
    rows: Vec<SeriesRow>,
}

impl BucketedSeries {
    /// Assemble a series. Every row must carry one value per column.
    pub fn new(columns: Vec<SeriesColumn>, rows: Vec<SeriesRow>) -> Self {
        debug_assert!(rows.iter().all(|row| row.values.len() == columns.len()));
        Self { columns, rows }
    }

    /// Series with zero periods and zero columns
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn periods(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|row| row.period)
    }

    /// Number of retained (non-"Other") columns
    pub fn label_column_count(&self) -> usize {
        self.columns.iter().filter(|c| !c.is_other()).count()
    }

    pub fn has_other(&self) -> bool {
        self.columns.iter().any(SeriesColumn::is_other)
    }

    /// Value of `column` in the row for `period`
    pub fn value(&self, period: NaiveDate, column: &SeriesColumn) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|row| row.period == period)
            .map(|row| row.values[col])
    }

    /// Value of the retained label column `label` in the row for `period`
    pub fn label_value(&self, period: NaiveDate, label: &str) -> Option<f64> {
        self.value(period, &SeriesColumn::Label(label.to_string()))
    }

    /// Per-column sums across all periods
    pub fn column_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.columns.len()];
        for row in &self.rows {
            for (total, value) in totals.iter_mut().zip(&row.values) {
                *total += value;
            }
        }
        totals
    }

    /// Sum of every cell
    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(SeriesRow::total).sum()
    }

    /// Last row, if any
    pub fn last(&self) -> Option<&SeriesRow> {
        self.rows.last()
    }
}

struct RowValues<'a> {
    columns: &'a [SeriesColumn],
    values: &'a [f64],
}

impl Serialize for RowValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(column.name(), value)?;
        }
        map.end()
    }
}

struct RowView<'a> {
    columns: &'a [SeriesColumn],
    row: &'a SeriesRow,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SeriesRow", 2)?;
        state.serialize_field("period", &self.row.period)?;
        state.serialize_field(
            "values",
            &RowValues {
                columns: self.columns,
                values: &self.row.values,
            },
        )?;
        state.end()
    }
}

impl Serialize for BucketedSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows
            .iter()
            .map(|row| RowView {
                columns: &self.columns,
                row,
            })
            .collect();

        let mut state = serializer.serialize_struct("BucketedSeries", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// One bar of the label-aggregate chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAggregate {
    pub label: String,
    pub value: f64,
}

impl LabelAggregate {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> BucketedSeries {
        BucketedSeries::new(
            vec![SeriesColumn::Label("A".into()), SeriesColumn::Other],
            vec![
                SeriesRow {
                    period: date(2024, 1, 1),
                    values: vec![15.0, 2.0],
                },
                SeriesRow {
                    period: date(2024, 1, 8),
                    values: vec![0.0, 7.0],
                },
            ],
        )
    }

    #[test]
    fn test_empty_series() {
        let series = BucketedSeries::empty();
        assert!(series.is_empty());
        assert!(series.columns().is_empty());
        assert_eq!(series.grand_total(), 0.0);
    }

    #[test]
    fn test_lookups_and_totals() {
        let series = sample();
        assert_eq!(series.len(), 2);
        assert_eq!(series.label_column_count(), 1);
        assert!(series.has_other());
        assert_eq!(series.label_value(date(2024, 1, 1), "A"), Some(15.0));
        assert_eq!(series.value(date(2024, 1, 8), &SeriesColumn::Other), Some(7.0));
        assert_eq!(series.label_value(date(2024, 1, 15), "A"), None);
        assert_eq!(series.column_totals(), vec![15.0, 9.0]);
        assert_eq!(series.grand_total(), 24.0);
    }

    #[test]
    fn test_real_other_label_is_distinct_from_synthetic() {
        let real = SeriesColumn::Label(OTHER_COLUMN.to_string());
        assert_ne!(real, SeriesColumn::Other);
        assert_eq!(real.name(), SeriesColumn::Other.name());
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["columns"], serde_json::json!(["A", "Other"]));
        assert_eq!(json["rows"][0]["period"], "2024-01-01");
        assert_eq!(json["rows"][0]["values"]["A"], 15.0);
        assert_eq!(json["rows"][1]["values"]["Other"], 7.0);
    }
}
