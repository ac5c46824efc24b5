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

//! Plain-text chart rendering

use std::fmt::Write;
use tallyboard_core::{BucketedSeries, Record};

/// Glyphs assigned to stacked series columns, in column order
const STACK_GLYPHS: [char; 8] = ['█', '▓', '▒', '░', '#', '=', '+', '.'];

const POSITIVE_BAR: char = '█';
const NEGATIVE_BAR: char = '▒';

/// Whole numbers without decimals, everything else with two
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn display_label(label: &str) -> &str {
    if label.is_empty() {
        "(empty)"
    } else {
        label
    }
}

fn scaled(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !value.is_finite() {
        return 0;
    }
    ((value.abs() / max) * width as f64).round() as usize
}

/// Table of stored rows
pub fn records_table(records: &[Record]) -> String {
    let ts_width = records
        .iter()
        .map(|r| r.timestamp.chars().count())
        .chain(std::iter::once("timestamp".len()))
        .max()
        .unwrap_or(0);
    let label_width = records
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once("label".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<ts_width$}  {:<label_width$}  {:>10}",
        "timestamp", "label", "value"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:<ts_width$}  {:<label_width$}  {:>10}",
            record.timestamp,
            record.label,
            format_number(record.value)
        );
    }
    out
}

/// Horizontal bar chart, one bar per `(label, value)` pair
pub fn bar_chart(title: Option<&str>, bars: &[(String, f64)], width: usize) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
    }

    let label_width = bars
        .iter()
        .map(|(label, _)| display_label(label).chars().count())
        .max()
        .unwrap_or(0);
    let max = bars
        .iter()
        .map(|(_, value)| value.abs())
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    for (label, value) in bars {
        let glyph = if *value < 0.0 { NEGATIVE_BAR } else { POSITIVE_BAR };
        let bar: String = std::iter::repeat(glyph)
            .take(scaled(*value, max, width))
            .collect();
        let _ = writeln!(
            out,
            "{:<label_width$} | {:<width$} {}",
            display_label(label),
            bar,
            format_number(*value)
        );
    }
    out
}

/// Period table plus a stacked bar per period
pub fn stacked_chart(series: &BucketedSeries, width: usize) -> String {
    let mut out = String::new();
    let columns = series.columns();

    let value_width = series
        .rows()
        .iter()
        .flat_map(|row| row.values.iter().copied().chain(std::iter::once(row.total())))
        .map(|v| format_number(v).len())
        .chain(columns.iter().map(|c| display_label(c.name()).chars().count()))
        .chain(std::iter::once("total".len()))
        .max()
        .unwrap_or(0);

    let _ = write!(out, "{:<10}", "period");
    for column in columns {
        let _ = write!(out, "  {:>value_width$}", display_label(column.name()));
    }
    let _ = writeln!(out, "  {:>value_width$}", "total");

    for row in series.rows() {
        let _ = write!(out, "{:<10}", row.period.format("%Y-%m-%d"));
        for value in &row.values {
            let _ = write!(out, "  {:>value_width$}", format_number(*value));
        }
        let _ = writeln!(out, "  {:>value_width$}", format_number(row.total()));
    }

    // Stacked bars only show positive contributions
    let max_total = series
        .rows()
        .iter()
        .map(|row| row.values.iter().filter(|v| **v > 0.0).sum::<f64>())
        .fold(0.0f64, f64::max);

    let _ = writeln!(out);
    for row in series.rows() {
        let mut bar = String::new();
        for (idx, value) in row.values.iter().enumerate() {
            if *value > 0.0 {
                let glyph = STACK_GLYPHS[idx % STACK_GLYPHS.len()];
                bar.extend(std::iter::repeat(glyph).take(scaled(*value, max_total, width)));
            }
        }
        let _ = writeln!(out, "{} | {}", row.period.format("%Y-%m-%d"), bar);
    }

    let legend: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            format!(
                "{} {}",
                STACK_GLYPHS[idx % STACK_GLYPHS.len()],
                display_label(column.name())
            )
        })
        .collect();
    let _ = writeln!(out, "\n{}", legend.join("   "));
    out
}
