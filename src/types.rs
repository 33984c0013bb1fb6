use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Column names the dataset must carry (after header whitespace is stripped).
pub const COL_DISTRICT: &str = "District";
pub const COL_YEAR: &str = "Year";
pub const COL_RATE: &str = "Deforestation_Rate_%";
pub const COL_TEMPERATURE: &str = "Temperature_C";
pub const COL_RAINFALL: &str = "Rainfall_mm";
pub const COL_POLLUTION: &str = "Pollution_Index";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DISTRICT,
    COL_YEAR,
    COL_RATE,
    COL_TEMPERATURE,
    COL_RAINFALL,
    COL_POLLUTION,
];

/// A row exactly as it comes off the CSV reader. Every field is kept as text
/// so one bad cell never rejects the whole row.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "District")]
    pub district: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Deforestation_Rate_%")]
    pub deforestation_rate: Option<String>,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: Option<String>,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: Option<String>,
    #[serde(rename = "Pollution_Index")]
    pub pollution_index: Option<String>,
}

/// One typed row of the dataset. Numeric fields that failed coercion are
/// `None` and are left out of every aggregate that reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRecord {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Year")]
    pub year: Option<i32>,
    #[serde(rename = "Deforestation_Rate_%")]
    pub deforestation_rate: Option<f64>,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: Option<f64>,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: Option<f64>,
    #[serde(rename = "Pollution_Index")]
    pub pollution_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub average_rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    pub causes: Vec<String>,
    pub reduction_methods: Vec<String>,
    pub text: String,
}

/// Column means for the climate/pollution fields. `None` means the column
/// had no valid value for the district.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentSummary {
    pub avg_temp: Option<f64>,
    pub avg_rainfall: Option<f64>,
    pub avg_pollution: Option<f64>,
}

/// Index-aligned projected years and rates. Both are empty when the history
/// is too short to extrapolate from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastResult {
    pub years: Vec<i32>,
    pub rates: Vec<f64>,
}

impl ForecastResult {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryPayload<'a> {
    pub history: Vec<&'a HistoricalRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPayload {
    pub summary: SummaryResult,
    pub future: ForecastResult,
    pub environment: EnvironmentSummary,
}

#[derive(Debug, Tabled, Clone)]
pub struct HistoryRow {
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Deforestation Rate (%)")]
    pub deforestation_rate: String,
    #[tabled(rename = "Rainfall (mm)")]
    pub rainfall: String,
    #[tabled(rename = "Temperature (°C)")]
    pub temperature: String,
    #[tabled(rename = "Pollution Index")]
    pub pollution: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PredictionRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "PredictedRate")]
    #[tabled(rename = "Predicted Rate (%)")]
    pub predicted_rate: String,
    #[serde(rename = "Rainfall")]
    #[tabled(rename = "Rainfall (mm)")]
    pub rainfall: String,
    #[serde(rename = "Temperature")]
    #[tabled(rename = "Temperature (°C)")]
    pub temperature: String,
    #[serde(rename = "PollutionIndex")]
    #[tabled(rename = "Pollution Index")]
    pub pollution: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DistrictRow {
    #[tabled(rename = "District")]
    pub district: String,
    #[tabled(rename = "Records")]
    pub records: usize,
}
