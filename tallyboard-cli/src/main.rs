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

//! Tallyboard CLI
//!
//! Record labelled values into a CSV store and chart them in the terminal.

mod config;
mod render;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::TallyboardConfig;
use std::path::PathBuf;
use tallyboard_core::{
    parse_date, AggregationMode, AggregationRequest, BucketedSeries, ChartDocument, Frequency,
    LabelFilter, Record,
};
use tallyboard_query::{aggregate, aggregate_by_label, date_bounds, sync_document_points};
use tallyboard_storage::{DocumentStore, RecordStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const NO_ROWS_MESSAGE: &str = "No rows in the selected range/labels.";
const EMPTY_STORE_MESSAGE: &str = "No rows recorded yet.";

#[derive(Parser)]
#[command(name = "tallyboard")]
#[command(about = "Tallyboard - labelled activity charts in the terminal", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory, overrides config and environment
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a labelled value, stamped with the current local time
    Add {
        #[arg(short, long)]
        label: String,

        #[arg(short = 'V', long, allow_hyphen_values = true)]
        value: f64,
    },

    /// Print the most recent rows
    Show {
        /// Number of rows (default from config)
        #[arg(long)]
        tail: Option<usize>,
    },

    /// List distinct labels
    Labels,

    /// Per-label totals as horizontal bars
    ByLabel {
        /// Restrict to these labels (repeatable, none means all)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// sum, mean or count
        #[arg(short, long, default_value = "sum")]
        mode: AggregationMode,
    },

    /// Bucketed activity over time with top-N collapsing
    Activity {
        /// First day, YYYY-MM-DD (default: earliest row)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD (default: latest row)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// D, W or M (default from config)
        #[arg(short, long)]
        freq: Option<Frequency>,

        /// Labels kept before collapsing the rest into "Other"
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Running totals per column
        #[arg(long)]
        cumulative: bool,

        /// Restrict to these labels (repeatable, none means all)
        #[arg(short, long = "label")]
        labels: Vec<String>,
    },

    /// Edit and render the JSON chart document
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },
}

#[derive(Subcommand)]
enum DocCommands {
    /// Render the document as a bar chart
    Show,

    /// Set the chart title
    Title { title: String },

    /// Append a point (blank unless label/value given)
    Add {
        #[arg(short, long)]
        label: Option<String>,

        #[arg(short = 'V', long, allow_hyphen_values = true)]
        value: Option<f64>,
    },

    /// Edit the point at a 1-based position
    Set {
        index: usize,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short = 'V', long, allow_hyphen_values = true)]
        value: Option<f64>,
    },

    /// Remove the point at a 1-based position
    Remove { index: usize },

    /// Replace the points with per-label totals from the record store
    Sync,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "tallyboard=debug,tallyboard_core=debug,tallyboard_storage=debug,tallyboard_query=debug"
    } else {
        "tallyboard=info,tallyboard_storage=info,tallyboard_query=info"
    };
    let filter = if verbose {
        EnvFilter::new(default_filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = TallyboardConfig::load(cli.config.clone())?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    config.validate().context("invalid configuration")?;
    debug!(
        "Records at {:?}, document at {:?}",
        config.records_path(),
        config.document_path()
    );

    match cli.command {
        Commands::Doc { command } => handle_doc_command(command, &config, cli.json),
        command => handle_record_command(command, &config, cli.json),
    }
}

fn open_records(config: &TallyboardConfig) -> Result<RecordStore> {
    let path = config.records_path();
    RecordStore::open(&path).with_context(|| format!("opening record store {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_record_command(command: Commands, config: &TallyboardConfig, json: bool) -> Result<()> {
    let store = open_records(config)?;

    match command {
        Commands::Add { label, value } => {
            let record = store.append(&label, value)?;
            if json {
                print_json(&record)?;
            } else {
                println!(
                    "✓ Added {} = {} at {}",
                    record.label,
                    render::format_number(record.value),
                    record.timestamp
                );
            }
        }

        Commands::Show { tail } => {
            let rows = store.tail(tail.unwrap_or(config.chart.tail_rows))?;
            if json {
                print_json(&rows)?;
            } else {
                print!("{}", show_text(&rows));
            }
        }

        Commands::Labels => {
            let labels = store.labels()?;
            if json {
                print_json(&labels)?;
            } else if labels.is_empty() {
                println!("No labels recorded yet.");
            } else {
                for label in &labels {
                    println!("{}", label);
                }
            }
        }

        Commands::ByLabel { labels, mode } => {
            let records = store.load()?.records;
            let filter = LabelFilter::from_labels(labels);
            let result = aggregate_by_label(&records, &filter, mode);

            if json {
                print_json(&result)?;
            } else if result.is_empty() {
                println!("{}", NO_ROWS_MESSAGE);
            } else {
                let bars: Vec<(String, f64)> =
                    result.into_iter().map(|a| (a.label, a.value)).collect();
                let title = format!("{} by label", mode);
                print!(
                    "{}",
                    render::bar_chart(Some(&title), &bars, config.chart.bar_width)
                );
            }
        }

        Commands::Activity {
            start,
            end,
            freq,
            top_n,
            cumulative,
            labels,
        } => {
            let records = store.load()?.records;
            let bounds = date_bounds(&records);
            let range = match (start, end, bounds) {
                (Some(start), Some(end), _) => Some((start, end)),
                (start, end, Some((first, last))) => {
                    Some((start.unwrap_or(first), end.unwrap_or(last)))
                }
                (_, _, None) => None,
            };

            let series = match range {
                Some((start, end)) => {
                    let request = AggregationRequest::builder(start, end)
                        .frequency(freq.unwrap_or(config.chart.frequency))
                        .labels(labels)
                        .top_n(top_n.unwrap_or(config.chart.top_n))
                        .cumulative(cumulative)
                        .build()?;
                    aggregate(&records, &request)
                }
                None => BucketedSeries::empty(),
            };

            if json {
                print_json(&series)?;
            } else if series.is_empty() {
                println!("{}", NO_ROWS_MESSAGE);
            } else {
                print!(
                    "{}",
                    render::stacked_chart(&series, config.chart.bar_width)
                );
            }
        }

        Commands::Doc { .. } => unreachable!(), // Handled in main
    }

    Ok(())
}

fn show_text(rows: &[Record]) -> String {
    if rows.is_empty() {
        format!("{}\n", EMPTY_STORE_MESSAGE)
    } else {
        render::records_table(rows)
    }
}

/// Convert a 1-based position from the command line
fn position(index: usize) -> Result<usize> {
    index
        .checked_sub(1)
        .context("point positions start at 1")
}

fn handle_doc_command(command: DocCommands, config: &TallyboardConfig, json: bool) -> Result<()> {
    let documents = DocumentStore::new(config.document_path());
    let mut doc = documents.load();

    let changed = match command {
        DocCommands::Show => false,
        DocCommands::Title { title } => {
            doc.set_title(title);
            true
        }
        DocCommands::Add { label, value } => {
            doc.add_point();
            if label.is_some() || value.is_some() {
                let last = doc.data_points.len() - 1;
                doc.set_point(last, label, value)?;
            }
            true
        }
        DocCommands::Set {
            index,
            label,
            value,
        } => {
            doc.set_point(position(index)?, label, value)?;
            true
        }
        DocCommands::Remove { index } => {
            let removed = doc.remove_point(position(index)?)?;
            info!("Removed point {:?}", removed.label);
            true
        }
        DocCommands::Sync => {
            let records = open_records(config)?.load()?.records;
            doc.replace_points(sync_document_points(&records));
            true
        }
    };

    if changed {
        documents.save(&doc).with_context(|| {
            format!("saving chart document {}", documents.path().display())
        })?;
    }

    if json {
        print_json(&doc)?;
    } else {
        print!("{}", render_document(&doc, config.chart.bar_width));
    }
    Ok(())
}

fn render_document(doc: &ChartDocument, width: usize) -> String {
    if doc.is_empty() {
        return format!("{}\n\n(no data points)\n", doc.chart_title);
    }
    let bars: Vec<(String, f64)> = doc
        .data_points
        .iter()
        .enumerate()
        .map(|(idx, point)| (format!("{}. {}", idx + 1, point.label), point.value))
        .collect();
    render::bar_chart(Some(&doc.chart_title), &bars, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallyboard_core::DataPoint;

    #[test]
    fn test_cli_parses_activity_flags() {
        let cli = Cli::try_parse_from([
            "tallyboard",
            "--json",
            "activity",
            "--start",
            "2024-01-01",
            "--freq",
            "M",
            "-n",
            "3",
            "--cumulative",
            "-l",
            "Study",
            "-l",
            "Sleep",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Activity {
                start,
                end,
                freq,
                top_n,
                cumulative,
                labels,
            } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(end, None);
                assert_eq!(freq, Some(Frequency::Month));
                assert_eq!(top_n, Some(3));
                assert!(cumulative);
                assert_eq!(labels, vec!["Study", "Sleep"]);
            }
            _ => panic!("expected activity"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_date_and_mode() {
        assert!(Cli::try_parse_from(["tallyboard", "activity", "--start", "01/02/2024"]).is_err());
        assert!(Cli::try_parse_from(["tallyboard", "by-label", "--mode", "median"]).is_err());
    }

    #[test]
    fn test_cli_accepts_negative_values() {
        let cli = Cli::try_parse_from(["tallyboard", "add", "--label", "Debt", "--value", "-4.5"])
            .unwrap();
        match cli.command {
            Commands::Add { label, value } => {
                assert_eq!(label, "Debt");
                assert_eq!(value, -4.5);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_show_text_on_empty_store() {
        assert_eq!(show_text(&[]), "No rows recorded yet.\n");
        let rows = vec![Record::new("2024-01-01T10:00:00", "Sleep", 8.0)];
        assert!(show_text(&rows).starts_with("timestamp"));
    }

    #[test]
    fn test_position_is_one_based() {
        assert_eq!(position(1).unwrap(), 0);
        assert!(position(0).is_err());
    }

    #[test]
    fn test_render_document_numbers_points() {
        let doc = ChartDocument {
            chart_title: "Hours".to_string(),
            data_points: vec![DataPoint::new("Sleep", 8.0), DataPoint::new("Study", 4.0)],
        };
        let text = render_document(&doc, 8);
        assert!(text.starts_with("Hours\n-----\n"));
        assert!(text.contains("1. Sleep | ████████ 8"));
        assert!(text.contains("2. Study | ████     4"));

        let empty = render_document(&ChartDocument::fallback(), 8);
        assert!(empty.starts_with("JSON Chart"));
        assert!(empty.contains("(no data points)"));
    }

    #[test]
    fn test_doc_commands_edit_and_persist() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = TallyboardConfig::default().with_data_dir(dir.path());

        handle_doc_command(DocCommands::Title { title: "Week".into() }, &config, true).unwrap();
        handle_doc_command(
            DocCommands::Add {
                label: Some("Run".into()),
                value: Some(5.0),
            },
            &config,
            true,
        )
        .unwrap();
        handle_doc_command(
            DocCommands::Set {
                index: 1,
                label: None,
                value: Some(6.0),
            },
            &config,
            true,
        )
        .unwrap();
        assert!(handle_doc_command(DocCommands::Remove { index: 2 }, &config, true).is_err());

        let doc = DocumentStore::new(config.document_path()).load();
        assert_eq!(doc.chart_title, "Week");
        assert_eq!(doc.data_points, vec![DataPoint::new("Run", 6.0)]);
    }

    #[test]
    fn test_doc_sync_reads_record_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = TallyboardConfig::default().with_data_dir(dir.path());
        let store = open_records(&config).unwrap();
        store.append("b", 1.0).unwrap();
        store.append("a", 2.0).unwrap();
        store.append("b", 3.0).unwrap();

        handle_doc_command(DocCommands::Sync, &config, true).unwrap();

        let doc = DocumentStore::new(config.document_path()).load();
        assert_eq!(
            doc.data_points,
            vec![DataPoint::new("a", 2.0), DataPoint::new("b", 4.0)]
        );
    }
}
