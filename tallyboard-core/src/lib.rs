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

//! Tallyboard Core
//!
//! Fundamental data structures shared by the record store, the aggregation
//! pipeline and the command-line front end.

pub mod document;
pub mod error;
pub mod record;
pub mod request;
pub mod series;

pub use document::{ChartDocument, DataPoint, DEFAULT_CHART_TITLE, FALLBACK_CHART_TITLE};
pub use error::{Result, TallyboardError};
pub use record::{parse_timestamp, Record, RECORD_COLUMNS, TIMESTAMP_FORMAT};
pub use request::{
    parse_date, AggregationMode, AggregationRequest, AggregationRequestBuilder, Frequency,
    LabelFilter, DEFAULT_TOP_N,
};
pub use series::{BucketedSeries, LabelAggregate, SeriesColumn, SeriesRow, OTHER_COLUMN};
