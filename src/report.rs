// Report bundle for one district: a Markdown document with tables and text
// charts, plus CSV/JSON copies of the data behind it.
//
// Each bundle goes to its own `<location>-<uuid>` directory so two requests
// for the same district never write over each other.
use crate::dataset::LocationSlice;
use crate::error::ReportError;
use crate::output::{render_table, write_csv, write_json};
use crate::pipeline::{Pipeline, ReportInputs};
use crate::types::{HistoricalRecord, HistoryRow, PredictionRow};
use crate::util::{format_number, format_opt};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const CHART_WIDTH: usize = 40;

/// Paths of everything written for one report.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub dir: PathBuf,
    pub markdown: PathBuf,
    pub history_csv: PathBuf,
    pub forecast_csv: PathBuf,
    pub summary_json: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportComposer {
    out_dir: PathBuf,
}

impl ReportComposer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn generate(&self, pipeline: &Pipeline, location: &str) -> Result<ReportArtifacts, ReportError> {
        let inputs = pipeline.get_report_inputs(location)?;
        self.compose(location, &inputs)
    }

    pub fn compose(&self, location: &str, inputs: &ReportInputs<'_>) -> Result<ReportArtifacts, ReportError> {
        let dir = self
            .out_dir
            .join(format!("{}-{}", sanitize(location), Uuid::new_v4().simple()));
        let artifacts = compose_into(dir, location, inputs, Local::now())?;
        log::info!("Report for {} written to {}", location, artifacts.dir.display());
        Ok(artifacts)
    }
}

/// Write the bundle into `dir`. On failure the directory is removed so no
/// half-written bundle is left behind.
fn compose_into(
    dir: PathBuf,
    location: &str,
    inputs: &ReportInputs<'_>,
    generated_at: DateTime<Local>,
) -> Result<ReportArtifacts, ReportError> {
    fs::create_dir_all(&dir)?;
    let artifacts = ReportArtifacts {
        markdown: dir.join("report.md"),
        history_csv: dir.join("history.csv"),
        forecast_csv: dir.join("forecast.csv"),
        summary_json: dir.join("summary.json"),
        dir,
    };

    if let Err(e) = write_bundle(&artifacts, location, inputs, generated_at) {
        if let Err(cleanup) = fs::remove_dir_all(&artifacts.dir) {
            log::warn!("Could not remove {}: {}", artifacts.dir.display(), cleanup);
        }
        return Err(e);
    }
    Ok(artifacts)
}

fn write_bundle(
    artifacts: &ReportArtifacts,
    location: &str,
    inputs: &ReportInputs<'_>,
    generated_at: DateTime<Local>,
) -> Result<(), ReportError> {
    fs::write(&artifacts.markdown, render_markdown(location, inputs, generated_at))?;
    write_csv(&artifacts.history_csv, inputs.slice.records())?;
    write_csv(&artifacts.forecast_csv, &prediction_rows(inputs))?;
    write_json(
        &artifacts.summary_json,
        &serde_json::json!({
            "location": location,
            "generated_at": generated_at,
            "summary": inputs.summary,
            "future": inputs.future,
        }),
    )
}

pub fn render_markdown(location: &str, inputs: &ReportInputs<'_>, generated_at: DateTime<Local>) -> String {
    let summary = &inputs.summary;
    let mut doc = String::new();

    doc.push_str(&format!("# Deforestation Report - {}\n\n", location));
    doc.push_str(&format!("_Generated {}_\n\n", generated_at.format("%Y-%m-%d %H:%M:%S")));

    doc.push_str("## Historical Data\n\n");
    if let Some(table) = render_table(&history_rows(&inputs.slice)) {
        doc.push_str(&format!("{}\n\n", table));
    }

    doc.push_str(&format!("## {}-Year Prediction\n\n", inputs.future.len()));
    if inputs.future.is_empty() {
        doc.push_str("Not enough history to forecast.\n\n");
    } else if let Some(table) = render_table(&prediction_rows(inputs)) {
        doc.push_str(&format!("{}\n\n", table));
    }

    doc.push_str("## Charts\n\n");
    let series: [(&str, fn(&HistoricalRecord) -> Option<f64>); 4] = [
        ("Deforestation History", |r| r.deforestation_rate),
        ("Temperature Over Years", |r| r.temperature_c),
        ("Rainfall Over Years", |r| r.rainfall_mm),
        ("Pollution Over Years", |r| r.pollution_index),
    ];
    for (title, field) in series {
        let mut points: Vec<(i32, f64)> = inputs
            .slice
            .iter()
            .filter_map(|r| Some((r.year?, field(r)?)))
            .collect();
        points.sort_by_key(|(year, _)| *year);
        if let Some(chart) = text_chart(&format!("{} - {}", title, location), &points) {
            doc.push_str(&format!("```text\n{}```\n\n", chart));
        }
    }
    let predicted: Vec<(i32, f64)> = inputs
        .future
        .years
        .iter()
        .copied()
        .zip(inputs.future.rates.iter().copied())
        .collect();
    if let Some(chart) = text_chart(&format!("Predicted Deforestation Rate - {}", location), &predicted) {
        doc.push_str(&format!("```text\n{}```\n\n", chart));
    }

    doc.push_str("## Deforestation Summary\n\n");
    doc.push_str(&format!("{}\n\n", summary.text));
    doc.push_str(&format!("- Average Rate: {}%\n", format_number(summary.average_rate, 2)));
    doc.push_str(&format!(
        "- Min Rate: {}% | Max Rate: {}%\n\n",
        format_number(summary.min_rate, 2),
        format_number(summary.max_rate, 2)
    ));

    doc.push_str("### Causes of Deforestation\n\n");
    if summary.causes.is_empty() {
        doc.push_str("- (none listed)\n");
    }
    for cause in &summary.causes {
        doc.push_str(&format!("- {}\n", cause));
    }
    doc.push_str("\n### Reduction Methods\n\n");
    for method in &summary.reduction_methods {
        doc.push_str(&format!("- {}\n", method));
    }
    doc
}

pub fn history_rows(slice: &LocationSlice<'_>) -> Vec<HistoryRow> {
    slice
        .iter()
        .map(|r| HistoryRow {
            year: r.year.map_or_else(|| "N/A".to_string(), |y| y.to_string()),
            deforestation_rate: format_opt(r.deforestation_rate),
            rainfall: format_opt(r.rainfall_mm),
            temperature: format_opt(r.temperature_c),
            pollution: format_opt(r.pollution_index),
        })
        .collect()
}

/// Predicted rates alongside the last observed row's climate values, which
/// are carried forward unchanged.
pub fn prediction_rows(inputs: &ReportInputs<'_>) -> Vec<PredictionRow> {
    let last = inputs.slice.last();
    inputs
        .future
        .years
        .iter()
        .zip(&inputs.future.rates)
        .map(|(year, rate)| PredictionRow {
            year: *year,
            predicted_rate: format_number(*rate, 2),
            rainfall: format_opt(last.rainfall_mm),
            temperature: format_opt(last.temperature_c),
            pollution: format_opt(last.pollution_index),
        })
        .collect()
}

/// Horizontal bar chart, one line per point, bars scaled to the largest
/// magnitude. `None` when there are no points.
fn text_chart(title: &str, points: &[(i32, f64)]) -> Option<String> {
    if points.is_empty() {
        return None;
    }
    let peak = points.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    let mut out = format!("{}\n", title);
    for (year, value) in points {
        let len = if peak > 0.0 {
            ((value.abs() / peak) * CHART_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!("{} | {} {}\n", year, "█".repeat(len), format_number(*value, 2)));
    }
    Some(out)
}

/// File-system safe form of a district name.
fn sanitize(location: &str) -> String {
    let cleaned: String = location
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            ' ' => Some('_'),
            _ => None,
        })
        .collect();
    if cleaned.is_empty() {
        "district".to_string()
    } else {
        cleaned
    }
}
