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

//! Time-bucketed aggregation with Top-N/Other collapsing
//!
//! Feeds the stacked activity chart. The pipeline runs in one pass over the
//! records followed by a pass over the (small) bucket table:
//!
//! 1. drop rows whose timestamp does not parse
//! 2. keep rows whose calendar date lies in `[start, end]`
//! 3. keep rows matching the label filter (empty filter keeps everything)
//! 4. align each row to its Day/Week/Month bucket
//! 5. sum values per `(period, label)`
//! 6. densify over observed periods × observed labels
//! 7. rank labels by total, descending, ties by first appearance
//! 8. collapse labels past `top_n` into a trailing "Other" column
//! 9. optionally turn every column into running totals
//!
//! The function is total: malformed input is either dropped (step 1) or was
//! already rejected when the [`AggregationRequest`] was built.

use crate::bucket::bucket_start;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tallyboard_core::{AggregationRequest, BucketedSeries, Record, SeriesColumn, SeriesRow};

/// Sparse `(period, label)` sums, labels indexed by first appearance
#[derive(Default)]
struct BucketTable<'a> {
    labels: Vec<&'a str>,
    label_index: HashMap<&'a str, usize>,
    cells: BTreeMap<NaiveDate, HashMap<usize, f64>>,
}

impl<'a> BucketTable<'a> {
    fn add(&mut self, period: NaiveDate, label: &'a str, value: f64) {
        let idx = match self.label_index.get(label) {
            Some(idx) => *idx,
            None => {
                let idx = self.labels.len();
                self.labels.push(label);
                self.label_index.insert(label, idx);
                idx
            }
        };

        // NaN contributes nothing but still registers the cell
        let value = if value.is_nan() { 0.0 } else { value };
        *self
            .cells
            .entry(period)
            .or_default()
            .entry(idx)
            .or_insert(0.0) += value;
    }

    /// Dense rows, one value per label in first-appearance order
    fn densify(&self) -> Vec<(NaiveDate, Vec<f64>)> {
        self.cells
            .iter()
            .map(|(period, cells)| {
                let mut values = vec![0.0; self.labels.len()];
                for (idx, value) in cells {
                    values[*idx] = *value;
                }
                (*period, values)
            })
            .collect()
    }
}

/// Label indices ordered by descending total; stable, so ties keep
/// first-appearance order
fn rank_labels(rows: &[(NaiveDate, Vec<f64>)], label_count: usize) -> Vec<usize> {
    let mut totals = vec![0.0f64; label_count];
    for (_, values) in rows {
        for (total, value) in totals.iter_mut().zip(values) {
            *total += value;
        }
    }

    let mut order: Vec<usize> = (0..label_count).collect();
    order.sort_by(|a, b| totals[*b].total_cmp(&totals[*a]));
    order
}

/// Aggregate records into a wide, time-bucketed series
pub fn aggregate(records: &[Record], request: &AggregationRequest) -> BucketedSeries {
    if request.is_inverted() {
        tracing::debug!(
            start = %request.start(),
            end = %request.end(),
            "Inverted date range, returning empty series"
        );
        return BucketedSeries::empty();
    }

    let mut table = BucketTable::default();
    let mut unparseable = 0usize;

    for record in records {
        let Some(instant) = record.instant() else {
            unparseable += 1;
            continue;
        };

        let date = instant.date();
        if !request.covers(date) || !request.label_filter().matches(&record.label) {
            continue;
        }

        table.add(
            bucket_start(date, request.frequency()),
            &record.label,
            record.value,
        );
    }

    if unparseable > 0 {
        tracing::debug!(unparseable, "Dropped records with unparseable timestamps");
    }

    let rows = table.densify();
    if rows.is_empty() {
        return BucketedSeries::empty();
    }

    let ranked = rank_labels(&rows, table.labels.len());
    let keep_count = request.top_n().min(ranked.len());
    let (kept, excluded) = ranked.split_at(keep_count);

    let mut columns: Vec<SeriesColumn> = kept
        .iter()
        .map(|idx| SeriesColumn::Label(table.labels[*idx].to_string()))
        .collect();
    if !excluded.is_empty() {
        columns.push(SeriesColumn::Other);
    }

    let mut running = vec![0.0f64; columns.len()];
    let series_rows = rows
        .into_iter()
        .map(|(period, dense)| {
            let mut values: Vec<f64> = kept.iter().map(|idx| dense[*idx]).collect();
            if !excluded.is_empty() {
                values.push(excluded.iter().map(|idx| dense[*idx]).sum());
            }

            if request.cumulative() {
                for (acc, value) in running.iter_mut().zip(values.iter_mut()) {
                    *acc += *value;
                    *value = *acc;
                }
            }

            SeriesRow { period, values }
        })
        .collect();

    tracing::debug!(
        periods = table.cells.len(),
        labels = table.labels.len(),
        kept = keep_count,
        frequency = %request.frequency(),
        "Aggregated activity series"
    );

    BucketedSeries::new(columns, series_rows)
}

/// Earliest and latest calendar dates among records with a valid timestamp
pub fn date_bounds(records: &[Record]) -> Option<(NaiveDate, NaiveDate)> {
    records
        .iter()
        .filter_map(Record::date)
        .fold(None, |bounds, date| match bounds {
            None => Some((date, date)),
            Some((min, max)) => Some((min.min(date), max.max(date))),
        })
}
