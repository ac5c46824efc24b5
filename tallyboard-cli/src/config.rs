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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tallyboard_core::{Frequency, DEFAULT_TOP_N};

/// Tallyboard configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TallyboardConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the record store and the chart document
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Record store file name, relative to `data_dir`
    #[serde(default = "default_records_file")]
    pub records_file: String,

    /// Chart document file name, relative to `data_dir`
    #[serde(default = "default_document_file")]
    pub document_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            records_file: default_records_file(),
            document_file: default_document_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartConfig {
    /// Default bucket width for `activity` (D, W or M)
    #[serde(default)]
    pub frequency: Frequency,

    /// Default number of labels kept before collapsing into "Other"
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Rows printed by `show` without `--tail`
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,

    /// Width of the widest bar, in characters
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::default(),
            top_n: default_top_n(),
            tail_rows: default_tail_rows(),
            bar_width: default_bar_width(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_records_file() -> String {
    "data.csv".to_string()
}

fn default_document_file() -> String {
    "data.json".to_string()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_tail_rows() -> usize {
    20
}

fn default_bar_width() -> usize {
    40
}

const ENV_DATA_DIR: &str = "TALLYBOARD_DATA_DIR";
const ENV_RECORDS_FILE: &str = "TALLYBOARD_RECORDS_FILE";
const ENV_DOCUMENT_FILE: &str = "TALLYBOARD_DOCUMENT_FILE";
const ENV_FREQUENCY: &str = "TALLYBOARD_FREQUENCY";
const ENV_TOP_N: &str = "TALLYBOARD_TOP_N";

impl TallyboardConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - TALLYBOARD_DATA_DIR: Data directory (default: .)
    /// - TALLYBOARD_RECORDS_FILE: Record store file name (default: data.csv)
    /// - TALLYBOARD_DOCUMENT_FILE: Chart document file name (default: data.json)
    /// - TALLYBOARD_FREQUENCY: Default activity frequency (default: W)
    /// - TALLYBOARD_TOP_N: Default top-N label count (default: 5)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration with priority: file > env > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        // Override with environment variables
        config.apply_env()?;

        Ok(config)
    }

    /// Overwrite fields whose environment variable is set
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(data_dir) = std::env::var(ENV_DATA_DIR) {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(file) = std::env::var(ENV_RECORDS_FILE) {
            self.storage.records_file = file;
        }

        if let Ok(file) = std::env::var(ENV_DOCUMENT_FILE) {
            self.storage.document_file = file;
        }

        if let Ok(freq) = std::env::var(ENV_FREQUENCY) {
            self.chart.frequency = freq
                .parse()
                .with_context(|| format!("{} is not a valid frequency", ENV_FREQUENCY))?;
        }

        if let Ok(top_n) = std::env::var(ENV_TOP_N) {
            self.chart.top_n = top_n
                .trim()
                .parse()
                .with_context(|| format!("{}={:?} is not a number", ENV_TOP_N, top_n))?;
        }

        Ok(())
    }

    /// Point both stores at another directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.storage.data_dir = data_dir.into();
        self
    }

    pub fn records_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.records_file)
    }

    pub fn document_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.document_file)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chart.top_n < 1 {
            anyhow::bail!("chart.top_n must be at least 1");
        }

        if self.chart.bar_width == 0 {
            anyhow::bail!("chart.bar_width must be greater than 0");
        }

        if self.storage.records_file.trim().is_empty()
            || self.storage.document_file.trim().is_empty()
        {
            anyhow::bail!("storage file names must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TallyboardConfig::default();
        assert_eq!(config.chart.frequency, Frequency::Week);
        assert_eq!(config.chart.top_n, 5);
        assert_eq!(config.records_path(), PathBuf::from("./data.csv"));
        assert_eq!(config.document_path(), PathBuf::from("./data.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tallyboard.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/srv/tally\"\n\n[chart]\nfrequency = \"M\"\ntop_n = 3\n",
        )
        .unwrap();

        let config = TallyboardConfig::from_file(&path).unwrap();
        assert_eq!(config.chart.frequency, Frequency::Month);
        assert_eq!(config.chart.top_n, 3);
        assert_eq!(config.chart.bar_width, 40);
        assert_eq!(config.records_path(), PathBuf::from("/srv/tally/data.csv"));
    }

    #[test]
    fn test_from_file_rejects_unknown_frequency() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tallyboard.toml");
        std::fs::write(&path, "[chart]\nfrequency = \"Q\"\n").unwrap();

        assert!(TallyboardConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = TallyboardConfig::default();
        config.chart.top_n = 0;
        assert!(config.validate().is_err());

        let mut config = TallyboardConfig::default();
        config.chart.bar_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_dir_override() {
        let config = TallyboardConfig::default().with_data_dir("/tmp/elsewhere");
        assert_eq!(
            config.document_path(),
            PathBuf::from("/tmp/elsewhere/data.json")
        );
    }

    // Only this test touches the process environment
    #[test]
    fn test_from_env() {
        std::env::set_var(ENV_DATA_DIR, "/var/lib/tally");
        std::env::set_var(ENV_FREQUENCY, "daily");
        std::env::set_var(ENV_TOP_N, "7");

        let config = TallyboardConfig::from_env().unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/tally"));
        assert_eq!(config.chart.frequency, Frequency::Day);
        assert_eq!(config.chart.top_n, 7);

        std::env::set_var(ENV_TOP_N, "many");
        assert!(TallyboardConfig::from_env().is_err());

        std::env::remove_var(ENV_DATA_DIR);
        std::env::remove_var(ENV_FREQUENCY);
        std::env::remove_var(ENV_TOP_N);
    }
}
