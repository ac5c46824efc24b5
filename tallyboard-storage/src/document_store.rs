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

//! Chart document persistence
//!
//! The JSON chart document is read whole and written whole; the last save
//! wins. A missing or unreadable file is replaced by
//! [`ChartDocument::fallback`].

use std::path::{Path, PathBuf};
use tallyboard_core::{ChartDocument, Result};

/// File-backed store for the JSON chart document
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, surfacing IO and parse errors
    pub fn try_load(&self) -> Result<ChartDocument> {
        let contents = std::fs::read_to_string(&self.path)?;
        let doc: ChartDocument = serde_json::from_str(&contents)?;
        Ok(doc)
    }

    /// Read the document, falling back to an empty one on any error
    pub fn load(&self) -> ChartDocument {
        match self.try_load() {
            Ok(doc) => {
                tracing::debug!(
                    points = doc.data_points.len(),
                    "Loaded chart document from {:?}",
                    self.path
                );
                doc
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load chart document {:?}: {}. Using an empty document.",
                    self.path,
                    e
                );
                ChartDocument::fallback()
            }
        }
    }

    /// Write the document as pretty JSON
    pub fn save(&self, doc: &ChartDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Create backup before saving
        if self.path.exists() {
            std::fs::copy(&self.path, self.backup_path())?;
        }

        std::fs::write(&self.path, json)?;
        tracing::info!(
            points = doc.data_points.len(),
            "Saved chart document to {:?}",
            self.path
        );
        Ok(())
    }

    /// `<name>.json.bak` next to the document
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallyboard_core::{DataPoint, FALLBACK_CHART_TITLE};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("data.json"));

        assert!(store.try_load().is_err());
        let doc = store.load();
        assert_eq!(doc.chart_title, FALLBACK_CHART_TITLE);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let doc = DocumentStore::new(&path).load();
        assert_eq!(doc, ChartDocument::fallback());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("data.json"));

        let mut doc = ChartDocument::default();
        doc.set_title("Weekly habits");
        doc.replace_points(vec![DataPoint::new("Sleep", 52.5), DataPoint::new("Study", 9.0)]);
        store.save(&doc).unwrap();

        assert_eq!(store.load(), doc);
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"chart_title\": \"Weekly habits\""));
    }

    #[test]
    fn test_save_keeps_backup_of_previous_version() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("data.json"));
        assert_eq!(store.backup_path(), dir.path().join("data.json.bak"));

        let mut doc = ChartDocument::default();
        doc.set_title("first");
        store.save(&doc).unwrap();
        assert!(!store.backup_path().exists());

        doc.set_title("second");
        store.save(&doc).unwrap();

        let backup = std::fs::read_to_string(store.backup_path()).unwrap();
        assert!(backup.contains("first"));
        assert_eq!(store.load().chart_title, "second");
    }
}
