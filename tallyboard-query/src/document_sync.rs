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

//! Per-label totals pushed into the chart document

use std::collections::BTreeMap;
use tallyboard_core::{DataPoint, Record};

/// Per-label totals for the chart document, ordered by label
pub fn sync_document_points(records: &[Record]) -> Vec<DataPoint> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        let total = totals.entry(record.label.as_str()).or_insert(0.0);
        if !record.value.is_nan() {
            *total += record.value;
        }
    }

    totals
        .into_iter()
        .map(|(label, value)| DataPoint::new(label, value))
        .collect()
}
