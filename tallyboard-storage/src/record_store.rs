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

//! Append-only record store
//!
//! A flat CSV file with a `timestamp,label,value` header. Rows are only ever
//! appended; loading validates the schema at this boundary so that the
//! aggregation pipeline only ever sees typed [`Record`]s.
//!
//! Rows with an unreadable timestamp are kept (they still count for label
//! aggregates). Rows whose `value` is not a number are skipped on load and
//! counted in the [`LoadReport`].

use crate::csv::{encode_row, parse_rows};
use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tallyboard_core::{Record, Result, TallyboardError, RECORD_COLUMNS};

/// Result of loading the store
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Rows that passed schema validation, in file order
    pub records: Vec<Record>,
    /// Rows dropped because their value was not numeric
    pub skipped: usize,
}

/// Position of each required column in the file header
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    timestamp: usize,
    label: usize,
    value: usize,
    width: usize,
}

impl ColumnLayout {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| TallyboardError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            timestamp: find(RECORD_COLUMNS[0])?,
            label: find(RECORD_COLUMNS[1])?,
            value: find(RECORD_COLUMNS[2])?,
            width: header.len(),
        })
    }

    /// Lay a record out in header order, leaving unknown columns empty
    fn encode(&self, record: &Record) -> String {
        let mut fields = vec![String::new(); self.width];
        fields[self.timestamp] = record.timestamp.clone();
        fields[self.label] = record.label.clone();
        fields[self.value] = format_value(record.value);
        encode_row(fields.as_slice())
    }
}

fn format_value(value: f64) -> String {
    // Debug keeps a trailing `.0` on whole numbers
    format!("{:?}", value)
}

/// Flat-file record store
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Open a store, creating the file (and its directory) with a header if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self { path };
        store.ensure_header()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header into a missing or zero-length file
    fn ensure_header(&self) -> Result<()> {
        let has_content = std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if has_content {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(&self.path)?;
        writeln!(file, "{}", encode_row(&RECORD_COLUMNS))?;
        file.flush()?;
        tracing::info!("Created record store at {:?}", self.path);
        Ok(())
    }

    fn read_text(&self) -> Result<String> {
        let mut text = String::new();
        File::open(&self.path)?.read_to_string(&mut text)?;
        // Spreadsheet exports often start with a UTF-8 byte order mark
        if text.starts_with(UTF8_BOM) {
            text.replace_range(..UTF8_BOM.len_utf8(), "");
        }
        Ok(text)
    }

    fn layout(&self) -> Result<ColumnLayout> {
        let rows = parse_rows(&self.read_text()?)?;
        match rows.first() {
            Some(header) => ColumnLayout::from_header(&header.fields),
            None => Err(TallyboardError::MissingColumn(RECORD_COLUMNS[0].to_string())),
        }
    }

    /// Append a row stamped with the current local time.
    ///
    /// The label is trimmed and must not be empty.
    pub fn append(&self, label: &str, value: f64) -> Result<Record> {
        let label = label.trim();
        if label.is_empty() {
            return Err(TallyboardError::EmptyLabel);
        }

        let record = Record::stamped(label, value);
        self.append_record(&record)?;
        Ok(record)
    }

    /// Append a caller-provided row as-is
    pub fn append_record(&self, record: &Record) -> Result<()> {
        self.ensure_header()?;
        let layout = self.layout()?;

        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        let needs_newline = ends_without_newline(&mut file)?;

        let mut writer = BufWriter::new(file);
        if needs_newline {
            writer.write_all(b"\n")?;
        }
        writeln!(writer, "{}", layout.encode(record))?;
        writer.flush()?;

        tracing::info!(
            label = %record.label,
            value = record.value,
            "Appended row to {:?}",
            self.path
        );
        Ok(())
    }

    /// Load and validate every row
    pub fn load(&self) -> Result<LoadReport> {
        if !self.path.exists() {
            return Ok(LoadReport::default());
        }

        let rows = parse_rows(&self.read_text()?)?;
        let mut iter = rows.into_iter();
        let Some(header) = iter.next() else {
            return Ok(LoadReport::default());
        };
        let layout = ColumnLayout::from_header(&header.fields)?;

        let mut report = LoadReport::default();
        for row in iter {
            let field = |idx: usize| row.fields.get(idx).map(String::as_str).unwrap_or("");

            let value = match field(layout.value).trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(
                        line = row.line,
                        "Skipping row with non-numeric value {:?}",
                        field(layout.value)
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            report.records.push(Record::new(
                field(layout.timestamp),
                field(layout.label),
                value,
            ));
        }

        tracing::debug!(
            rows = report.records.len(),
            skipped = report.skipped,
            "Loaded record store {:?}",
            self.path
        );
        Ok(report)
    }

    /// Last `n` valid rows, oldest first
    pub fn tail(&self, n: usize) -> Result<Vec<Record>> {
        let mut records = self.load()?.records;
        let start = records.len().saturating_sub(n);
        Ok(records.split_off(start))
    }

    /// Distinct labels, sorted
    pub fn labels(&self) -> Result<Vec<String>> {
        let labels: BTreeSet<String> = self
            .load()?
            .records
            .into_iter()
            .map(|r| r.label)
            .collect();
        Ok(labels.into_iter().collect())
    }
}

const UTF8_BOM: char = '\u{feff}';

fn ends_without_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
