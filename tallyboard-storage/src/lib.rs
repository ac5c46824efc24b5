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

//! Tallyboard Storage Layer
//!
//! Flat-file persistence for the two collaborators of the aggregation
//! pipeline:
//!
//! - **Record store**: append-only CSV table of `(timestamp, label, value)` rows
//! - **Document store**: the JSON chart document (`chart_title`, `data_points`)
//!
//! Both use synchronous `std::fs` I/O with "last write wins" semantics; there
//! is no locking between concurrent writers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tallyboard_storage::RecordStore;
//!
//! let store = RecordStore::open("./data.csv")?;
//! store.append("Study", 2.0)?;
//! let report = store.load()?;
//! ```

pub mod csv;
pub mod document_store;
pub mod record_store;

pub use document_store::DocumentStore;
pub use record_store::{LoadReport, RecordStore};
