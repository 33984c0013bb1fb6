// The dataset store and the location filter.
//
// A `Dataset` is built once by the loader and never mutated afterwards, so
// slices borrow straight from it and can be handed out concurrently.
use crate::error::PipelineError;
use crate::types::HistoricalRecord;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<HistoricalRecord>,
}

impl Dataset {
    pub fn new(records: Vec<HistoricalRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct district names in first-seen order, with their row counts.
    pub fn districts(&self) -> Vec<(&str, usize)> {
        let mut out: Vec<(&str, usize)> = Vec::new();
        for r in &self.records {
            match out.iter_mut().find(|(d, _)| *d == r.district) {
                Some((_, n)) => *n += 1,
                None => out.push((r.district.as_str(), 1)),
            }
        }
        out
    }

    /// Select every record whose district matches `location` ignoring case,
    /// preserving dataset order.
    ///
    /// Fails with [`PipelineError::NotFound`] when nothing matches.
    pub fn filter(&self, location: &str) -> Result<LocationSlice<'_>, PipelineError> {
        let wanted = location.to_lowercase();
        let records: Vec<&HistoricalRecord> = self
            .records
            .iter()
            .filter(|r| r.district.to_lowercase() == wanted)
            .collect();
        if records.is_empty() {
            log::debug!("No records for location {:?}", location);
            return Err(PipelineError::NotFound {
                location: location.to_string(),
            });
        }
        Ok(LocationSlice { records })
    }
}

/// The records of one district, borrowed from the dataset. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSlice<'a> {
    records: Vec<&'a HistoricalRecord>,
}

impl<'a> LocationSlice<'a> {
    /// District name as stored on the first matching record.
    pub fn district(&self) -> &'a str {
        self.records[0].district.as_str()
    }

    pub fn records(&self) -> &[&'a HistoricalRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a HistoricalRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The last record in dataset order.
    pub fn last(&self) -> &'a HistoricalRecord {
        self.records[self.records.len() - 1]
    }

    /// Valid values of one numeric column, in slice order.
    pub fn column(&self, field: impl Fn(&HistoricalRecord) -> Option<f64>) -> Vec<f64> {
        self.records.iter().filter_map(|r| field(r)).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(district: &str, year: Option<i32>, rate: Option<f64>) -> HistoricalRecord {
        HistoricalRecord {
            district: district.to_string(),
            year,
            deforestation_rate: rate,
            temperature_c: Some(25.0),
            rainfall_mm: Some(1200.0),
            pollution_index: Some(50.0),
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            record("Darjeeling", Some(2018), Some(2.0)),
            record("Purulia", Some(2018), Some(10.0)),
            record("Darjeeling", Some(2019), Some(2.5)),
            record("DARJEELING", Some(2020), Some(3.0)),
        ])
    }

    #[test]
    fn filter_is_case_insensitive_and_keeps_order() {
        let ds = sample();
        let lower = ds.filter("darjeeling").unwrap();
        let proper = ds.filter("Darjeeling").unwrap();
        assert_eq!(lower, proper);
        let years: Vec<Option<i32>> = lower.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(2018), Some(2019), Some(2020)]);
        // Stored spelling is not normalized.
        assert_eq!(lower.last().district, "DARJEELING");
        assert_eq!(lower.district(), "Darjeeling");
    }

    #[test]
    fn unknown_location_is_not_found() {
        let ds = sample();
        assert_eq!(
            ds.filter("Bankura").unwrap_err(),
            PipelineError::NotFound {
                location: "Bankura".to_string()
            }
        );
    }

    #[test]
    fn filter_does_not_trim_the_query() {
        let ds = sample();
        assert!(ds.filter(" Purulia").is_err());
    }

    #[test]
    fn districts_are_listed_in_first_seen_order() {
        let ds = sample();
        assert_eq!(
            ds.districts(),
            vec![("Darjeeling", 2), ("Purulia", 1), ("DARJEELING", 1)]
        );
    }

    #[test]
    fn column_skips_missing_values() {
        let ds = Dataset::new(vec![
            record("Nadia", Some(2018), Some(1.0)),
            record("Nadia", Some(2019), None),
            record("Nadia", Some(2020), Some(3.0)),
        ]);
        let slice = ds.filter("nadia").unwrap();
        assert_eq!(slice.column(|r| r.deforestation_rate), vec![1.0, 3.0]);
    }
}
