use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::types::{HistoricalRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{parse_f64_safe, parse_year_safe};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Counters describing what happened while loading. Invalid-cell counts are
/// per column: a row with a bad temperature still contributes its rate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub rejected_rows: usize,
    pub invalid_years: usize,
    pub invalid_rates: usize,
    pub invalid_temperatures: usize,
    pub invalid_rainfall: usize,
    pub invalid_pollution: usize,
}

impl LoadReport {
    pub fn invalid_cells(&self) -> usize {
        self.invalid_years
            + self.invalid_rates
            + self.invalid_temperatures
            + self.invalid_rainfall
            + self.invalid_pollution
    }
}

pub fn load_dataset(path: &Path) -> Result<(Dataset, LoadReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_dataset(file)
}

/// Read and type the dataset from any CSV source.
///
/// Header names are trimmed before the required-column check so `" Year "`
/// resolves to `Year`. Rows that cannot be deserialized at all, or that have
/// no district, are rejected; every other row is kept with its unparsable
/// numeric cells set to `None`.
pub fn read_dataset<R: Read>(reader: R) -> Result<(Dataset, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| (*col).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }

    let mut report = LoadReport::default();
    let mut records: Vec<HistoricalRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("Skipping row {}: {}", report.total_rows, e);
                report.rejected_rows += 1;
                continue;
            }
        };

        let district = match row.district {
            Some(d) if !d.trim().is_empty() => d,
            _ => {
                log::debug!("Skipping row {}: empty District", report.total_rows);
                report.rejected_rows += 1;
                continue;
            }
        };

        let year = coerce(row.year.as_deref(), parse_year_safe, &mut report.invalid_years);
        let deforestation_rate =
            coerce(row.deforestation_rate.as_deref(), parse_f64_safe, &mut report.invalid_rates);
        let temperature_c =
            coerce(row.temperature_c.as_deref(), parse_f64_safe, &mut report.invalid_temperatures);
        let rainfall_mm =
            coerce(row.rainfall_mm.as_deref(), parse_f64_safe, &mut report.invalid_rainfall);
        let pollution_index =
            coerce(row.pollution_index.as_deref(), parse_f64_safe, &mut report.invalid_pollution);

        records.push(HistoricalRecord {
            district,
            year,
            deforestation_rate,
            temperature_c,
            rainfall_mm,
            pollution_index,
        });
    }

    report.loaded_rows = records.len();
    if report.rejected_rows > 0 || report.invalid_cells() > 0 {
        log::warn!(
            "Dataset loaded with {} rejected rows and {} unparsable cells",
            report.rejected_rows,
            report.invalid_cells()
        );
    }
    Ok((Dataset::new(records), report))
}

/// Run one cell through its parser, bumping `invalid` when the cell had
/// content that did not parse. Empty cells are missing, not invalid.
fn coerce<T>(cell: Option<&str>, parse: fn(Option<&str>) -> Option<T>, invalid: &mut usize) -> Option<T> {
    let value = parse(cell);
    if value.is_none() && cell.is_some_and(|c| !c.trim().is_empty()) {
        *invalid += 1;
    }
    value
}
