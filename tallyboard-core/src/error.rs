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

//! Tallyboard error types

use thiserror::Error;

/// Result type for tallyboard operations
pub type Result<T> = std::result::Result<T, TallyboardError>;

/// Errors that can occur across the tallyboard crates
#[derive(Debug, Error)]
pub enum TallyboardError {
    // Request construction errors
    #[error("Invalid aggregation request: {0}")]
    InvalidRequest(String),

    #[error("Unknown frequency: {0} (expected D, W or M)")]
    UnknownFrequency(String),

    #[error("Unknown aggregation mode: {0} (expected sum, mean or count)")]
    UnknownMode(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    // Record store errors
    #[error("Label must not be empty")]
    EmptyLabel,

    #[error("Record store is missing column: {0}")]
    MissingColumn(String),

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    // Chart document errors
    #[error("Data point index {index} out of range (document has {len} points)")]
    PointOutOfRange { index: usize, len: usize },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
