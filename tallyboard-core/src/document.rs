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

use crate::error::{Result, TallyboardError};
use serde::{Deserialize, Serialize};

/// Title used when a document exists but has no `chart_title` key
pub const DEFAULT_CHART_TITLE: &str = "My JSON Visualization";

/// Title of the document used when the file is missing or unreadable
pub const FALLBACK_CHART_TITLE: &str = "JSON Chart";

fn default_chart_title() -> String {
    DEFAULT_CHART_TITLE.to_string()
}

/// One bar of the JSON-backed chart
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Editable key-value chart document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    #[serde(default = "default_chart_title")]
    pub chart_title: String,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
}

impl Default for ChartDocument {
    fn default() -> Self {
        Self {
            chart_title: default_chart_title(),
            data_points: Vec::new(),
        }
    }
}

impl ChartDocument {
    /// Document substituted when the file cannot be read
    pub fn fallback() -> Self {
        Self {
            chart_title: FALLBACK_CHART_TITLE.to_string(),
            data_points: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.chart_title = title.into();
    }

    /// Append a blank point (empty label, zero value)
    pub fn add_point(&mut self) -> &DataPoint {
        self.data_points.push(DataPoint::default());
        &self.data_points[self.data_points.len() - 1]
    }

    /// Edit the label and/or value of the point at `index`
    pub fn set_point(
        &mut self,
        index: usize,
        label: Option<String>,
        value: Option<f64>,
    ) -> Result<&DataPoint> {
        let len = self.data_points.len();
        let point = self
            .data_points
            .get_mut(index)
            .ok_or(TallyboardError::PointOutOfRange { index, len })?;

        if let Some(label) = label {
            point.label = label;
        }
        if let Some(value) = value {
            point.value = value;
        }
        Ok(point)
    }

    pub fn remove_point(&mut self, index: usize) -> Result<DataPoint> {
        let len = self.data_points.len();
        if index >= len {
            return Err(TallyboardError::PointOutOfRange { index, len });
        }
        Ok(self.data_points.remove(index))
    }

    pub fn replace_points(&mut self, points: Vec<DataPoint>) {
        self.data_points = points;
    }

    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_get_defaults() {
        let doc: ChartDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.chart_title, DEFAULT_CHART_TITLE);
        assert!(doc.is_empty());

        let doc: ChartDocument =
            serde_json::from_str(r#"{"data_points": [{"label": "a", "value": 3}, {}]}"#).unwrap();
        assert_eq!(doc.data_points[0], DataPoint::new("a", 3.0));
        assert_eq!(doc.data_points[1], DataPoint::default());
    }

    #[test]
    fn test_fallback_title() {
        assert_eq!(ChartDocument::fallback().chart_title, FALLBACK_CHART_TITLE);
    }

    #[test]
    fn test_edit_points() {
        let mut doc = ChartDocument::default();
        doc.add_point();
        doc.add_point();

        doc.set_point(1, Some("Sleep".into()), Some(7.5)).unwrap();
        doc.set_point(0, None, Some(2.0)).unwrap();
        assert_eq!(doc.data_points[0], DataPoint::new("", 2.0));
        assert_eq!(doc.data_points[1], DataPoint::new("Sleep", 7.5));

        let removed = doc.remove_point(0).unwrap();
        assert_eq!(removed.value, 2.0);
        assert_eq!(doc.data_points.len(), 1);
    }

    #[test]
    fn test_out_of_range_edits() {
        let mut doc = ChartDocument::default();
        assert!(matches!(
            doc.set_point(0, None, None),
            Err(TallyboardError::PointOutOfRange { index: 0, len: 0 })
        ));
        assert!(matches!(
            doc.remove_point(3),
            Err(TallyboardError::PointOutOfRange { index: 3, len: 0 })
        ));
    }

    #[test]
    fn test_unicode_survives_serialization() {
        let mut doc = ChartDocument::default();
        doc.set_title("Schlaf & Lernen 📈");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("📈"));
    }
}
