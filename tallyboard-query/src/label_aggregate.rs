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

//! Unbucketed per-label aggregate for the bar chart

use std::collections::HashMap;
use tallyboard_core::{AggregationMode, LabelAggregate, LabelFilter, Record};

/// Running reduction for one label
#[derive(Debug, Clone, Copy, Default)]
struct LabelAccumulator {
    sum: f64,
    numeric: u64,
    rows: u64,
}

impl LabelAccumulator {
    fn add(&mut self, value: f64) {
        self.rows += 1;
        if !value.is_nan() {
            self.sum += value;
            self.numeric += 1;
        }
    }

    fn avg(&self) -> f64 {
        if self.numeric == 0 {
            0.0
        } else {
            self.sum / self.numeric as f64
        }
    }

    fn finish(&self, mode: AggregationMode) -> f64 {
        match mode {
            AggregationMode::Sum => self.sum,
            AggregationMode::Mean => self.avg(),
            AggregationMode::Count => self.rows as f64,
        }
    }
}

/// Reduce records per label, sorted ascending by the result (ties by label).
///
/// Timestamps are not inspected, so rows with an unreadable timestamp still
/// count here.
pub fn aggregate_by_label(
    records: &[Record],
    filter: &LabelFilter,
    mode: AggregationMode,
) -> Vec<LabelAggregate> {
    let mut groups: HashMap<&str, LabelAccumulator> = HashMap::new();
    for record in records.iter().filter(|r| filter.matches(&r.label)) {
        groups.entry(record.label.as_str()).or_default().add(record.value);
    }

    let mut result: Vec<LabelAggregate> = groups
        .into_iter()
        .map(|(label, acc)| LabelAggregate::new(label, acc.finish(mode)))
        .collect();
    result.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.label.cmp(&b.label)));
    result
}
