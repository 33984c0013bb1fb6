// Query entry points used by the CLI and the report composer.
//
// Every operation is a pure read over the loaded dataset; a `Pipeline` can be
// shared across threads behind a plain reference.
use crate::dataset::{Dataset, LocationSlice};
use crate::error::PipelineError;
use crate::forecast::{forecast, ForecastStrategy, DEFAULT_HORIZON};
use crate::summary::{summarize_deforestation, summarize_environment, ReferenceTables};
use crate::types::{ForecastResult, HistoricalRecord, SummaryPayload, SummaryResult};

/// Everything the report composer needs for one district.
#[derive(Debug, Clone)]
pub struct ReportInputs<'a> {
    pub slice: LocationSlice<'a>,
    pub summary: SummaryResult,
    pub future: ForecastResult,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    dataset: Dataset,
    tables: ReferenceTables,
    horizon: usize,
    strategy: ForecastStrategy,
}

impl Pipeline {
    pub fn new(dataset: Dataset, tables: ReferenceTables) -> Self {
        Self {
            dataset,
            tables,
            horizon: DEFAULT_HORIZON,
            strategy: ForecastStrategy::default(),
        }
    }

    pub fn with_forecast(mut self, horizon: usize, strategy: ForecastStrategy) -> Self {
        self.horizon = horizon;
        self.strategy = strategy;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Raw records for a district in dataset order.
    pub fn get_history(&self, location: &str) -> Result<Vec<&HistoricalRecord>, PipelineError> {
        let slice = self.dataset.filter(location)?;
        Ok(slice.records().to_vec())
    }

    pub fn get_summary(&self, location: &str) -> Result<SummaryPayload, PipelineError> {
        let slice = self.dataset.filter(location)?;
        Ok(SummaryPayload {
            summary: summarize_deforestation(&slice, &self.tables)?,
            future: forecast(&slice, self.horizon, self.strategy),
            environment: summarize_environment(&slice),
        })
    }

    pub fn get_report_inputs(&self, location: &str) -> Result<ReportInputs<'_>, PipelineError> {
        let slice = self.dataset.filter(location)?;
        let summary = summarize_deforestation(&slice, &self.tables)?;
        let future = forecast(&slice, self.horizon, self.strategy);
        Ok(ReportInputs {
            slice,
            summary,
            future,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_dataset;

    const CSV: &str = "District,Year,Deforestation_Rate_%,Temperature_C,Rainfall_mm,Pollution_Index\n\
                       Purulia,2018,10.0,27.0,1300,50\n\
                       Darjeeling,2018,2.0,17.0,3000,30\n\
                       Purulia,2019,12.0,27.5,1250,52\n\
                       Purulia,2020,14.0,28.0,bad,54\n";

    fn pipeline() -> Pipeline {
        let (ds, _) = read_dataset(CSV.as_bytes()).unwrap();
        Pipeline::new(ds, ReferenceTables::builtin())
    }

    #[test]
    fn history_for_missing_district_is_not_found() {
        let err = pipeline().get_history("Bankura").unwrap_err();
        assert_eq!(
            err,
            PipelineError::NotFound {
                location: "Bankura".to_string()
            }
        );
    }

    #[test]
    fn history_returns_matching_rows_only() {
        let p = pipeline();
        let history = p.get_history("PURULIA").unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|r| r.district == "Purulia"));
    }

    #[test]
    fn summary_combines_all_three_parts() {
        let payload = pipeline().get_summary("purulia").unwrap();
        assert_eq!(payload.summary.average_rate, 12.0);
        assert_eq!(payload.summary.min_rate, 10.0);
        assert_eq!(payload.summary.max_rate, 14.0);
        assert_eq!(payload.future.years.first(), Some(&2021));
        assert_eq!(payload.future.rates.last(), Some(&34.0));
        assert_eq!(payload.environment.avg_temp, Some(27.5));
        assert_eq!(payload.environment.avg_rainfall, Some(1275.0));
        assert_eq!(payload.environment.avg_pollution, Some(52.0));
    }

    #[test]
    fn summary_payload_serializes_missing_means_as_null() {
        let csv = "District,Year,Deforestation_Rate_%,Temperature_C,Rainfall_mm,Pollution_Index\n\
                   Nadia,2018,1.0,,,\n";
        let (ds, _) = read_dataset(csv.as_bytes()).unwrap();
        let payload = Pipeline::new(ds, ReferenceTables::builtin())
            .get_summary("Nadia")
            .unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["environment"]["avg_temp"].is_null());
        assert_eq!(json["future"]["years"], serde_json::json!([]));
        assert_eq!(json["summary"]["causes"][0], "Urbanization");
    }

    #[test]
    fn forecast_settings_flow_through() {
        let p = pipeline().with_forecast(
            2,
            ForecastStrategy::FixedGrowth {
                growth_factor: 0.5,
            },
        );
        let inputs = p.get_report_inputs("Purulia").unwrap();
        assert_eq!(inputs.slice.len(), 3);
        assert_eq!(inputs.future.years, vec![2021, 2022]);
        assert_eq!(inputs.future.rates, vec![21.0, 28.0]);
    }
}
