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

//! Tallyboard Query
//!
//! Pure aggregations over in-memory records. Nothing here performs I/O or
//! keeps state between calls.

pub mod bucket;
pub mod document_sync;
pub mod label_aggregate;
pub mod pipeline;

pub use bucket::bucket_start;
pub use document_sync::sync_document_points;
pub use label_aggregate::aggregate_by_label;
pub use pipeline::{aggregate, date_bounds};
