// Deforestation and environment summarizers plus the reference tables they
// draw descriptive text from.
use crate::dataset::LocationSlice;
use crate::error::{LoadError, PipelineError};
use crate::types::{EnvironmentSummary, SummaryResult, COL_RATE};
use crate::util::{format_number, max_value, mean, min_value, round2};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

static BUILTIN_TABLES: Lazy<ReferenceTables> = Lazy::new(|| {
    let causes: &[(&str, &[&str])] = &[
        ("Alipurduar", &["Logging", "Agricultural expansion", "Urbanization"]),
        ("Bankura", &["Mining", "Agriculture", "Deforestation for fuel"]),
        ("Birbhum", &["Industrial development", "Agriculture"]),
        ("Cooch Behar", &["Urbanization", "Timber collection"]),
        ("Darjeeling", &["Tea plantations", "Logging"]),
        ("Hooghly", &["Industrial growth", "Urban spread"]),
        ("Jalpaiguri", &["Timber extraction", "Agriculture expansion"]),
        ("Murshidabad", &["Agriculture", "Urbanization"]),
        ("Nadia", &["Urbanization", "Agriculture"]),
        ("North 24 Parganas", &["Construction", "Deforestation for fuel"]),
        ("South 24 Parganas", &["Construction", "Deforestation for fuel"]),
        ("Paschim Medinipur", &["Logging", "Industrial expansion"]),
        ("Purulia", &["Mining", "Agriculture"]),
    ];
    let reduction_methods = [
        "Afforestation & Reforestation",
        "Sustainable agriculture",
        "Strict logging regulations",
        "Community awareness",
        "Protected forest areas",
    ];
    ReferenceTables::new(
        causes
            .iter()
            .map(|(d, cs)| (d.to_string(), cs.iter().map(|c| c.to_string()).collect()))
            .collect(),
        reduction_methods.iter().map(|m| m.to_string()).collect(),
    )
});

/// Static descriptive text: deforestation causes keyed by exact district
/// name and a district-independent list of reduction methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    causes: HashMap<String, Vec<String>>,
    reduction_methods: Vec<String>,
}

/// Shape of an override file. Absent keys keep the built-in values.
#[derive(Debug, Deserialize)]
struct TablesOverride {
    causes: Option<HashMap<String, Vec<String>>>,
    reduction_methods: Option<Vec<String>>,
}

impl ReferenceTables {
    pub fn new(causes: HashMap<String, Vec<String>>, reduction_methods: Vec<String>) -> Self {
        Self {
            causes,
            reduction_methods,
        }
    }

    /// The tables shipped with the program.
    pub fn builtin() -> Self {
        BUILTIN_TABLES.clone()
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_reader(file)
    }

    /// Overlay a JSON override (`{"causes": {...}, "reduction_methods": [...]}`)
    /// on top of the built-in tables.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let overrides: TablesOverride = serde_json::from_reader(reader)?;
        let mut tables = Self::builtin();
        if let Some(causes) = overrides.causes {
            tables.causes = causes;
        }
        if let Some(methods) = overrides.reduction_methods {
            tables.reduction_methods = methods;
        }
        Ok(tables)
    }

    /// Causes for a district by exact name; unknown districts have none.
    pub fn causes_for(&self, district: &str) -> &[String] {
        self.causes.get(district).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn reduction_methods(&self) -> &[String] {
        &self.reduction_methods
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Average, min and max deforestation rate (each rounded to 2 places) plus
/// the descriptive sentence for the district.
///
/// Fails with [`PipelineError::InsufficientData`] when no record in the
/// slice has a valid rate, or when the rates are too large to average.
pub fn summarize_deforestation(
    slice: &LocationSlice<'_>,
    tables: &ReferenceTables,
) -> Result<SummaryResult, PipelineError> {
    let district = slice.district();
    let rates = slice.column(|r| r.deforestation_rate);
    let (Some(avg), Some(min), Some(max)) = (mean(&rates), min_value(&rates), max_value(&rates))
    else {
        return Err(PipelineError::InsufficientData {
            district: district.to_string(),
            column: COL_RATE.to_string(),
        });
    };
    if rates.len() < slice.len() {
        log::debug!(
            "{}: {} of {} rows have no valid rate",
            district,
            slice.len() - rates.len(),
            slice.len()
        );
    }

    let average_rate = round2(avg);
    let causes = tables.causes_for(district).to_vec();
    let reduction_methods = tables.reduction_methods().to_vec();
    let text = describe(district, average_rate, &causes, &reduction_methods);

    Ok(SummaryResult {
        average_rate,
        min_rate: round2(min),
        max_rate: round2(max),
        causes,
        reduction_methods,
        text,
    })
}

fn describe(district: &str, average_rate: f64, causes: &[String], methods: &[String]) -> String {
    let causes = if causes.is_empty() {
        "not documented for this district".to_string()
    } else {
        causes.join(", ")
    };
    format!(
        "The deforestation rate in {} has fluctuated over the years with an average rate of {}%. \
         The main causes are {}. Recommended reduction methods include {} \
         to maintain forest cover and ensure sustainable growth.",
        district,
        format_number(average_rate, 2),
        causes,
        methods.join(", ")
    )
}

/// Per-column means of temperature, rainfall and pollution. Each column drops
/// its own invalid cells; a column with no valid cell yields `None`.
pub fn summarize_environment(slice: &LocationSlice<'_>) -> EnvironmentSummary {
    let avg = |values: Vec<f64>| mean(&values).map(round2);
    EnvironmentSummary {
        avg_temp: avg(slice.column(|r| r.temperature_c)),
        avg_rainfall: avg(slice.column(|r| r.rainfall_mm)),
        avg_pollution: avg(slice.column(|r| r.pollution_index)),
    }
}
