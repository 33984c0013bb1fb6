// Trend extrapolation of the deforestation rate.
//
// The default strategy projects the average per-year change observed in the
// district's own history. A fixed-percentage growth model is available but
// only when a caller asks for it by name.
use crate::dataset::LocationSlice;
use crate::types::ForecastResult;
use crate::util::{mean, round2};

pub const DEFAULT_HORIZON: usize = 10;
pub const DEFAULT_GROWTH_FACTOR: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ForecastStrategy {
    /// `last_rate + avg_change_per_year * step`, where the average change is
    /// the mean of `delta_rate / delta_year` over chronologically adjacent rows.
    #[default]
    AverageDelta,
    /// `last_rate * (1 + growth_factor * step)`; ignores the historical trend.
    FixedGrowth { growth_factor: f64 },
}

/// Project the next `horizon` years of the deforestation rate.
///
/// Rows missing a year or rate are ignored. With fewer than two usable rows
/// the result is empty; otherwise it holds exactly `horizon` contiguous years
/// starting the year after the last observation.
pub fn forecast(slice: &LocationSlice<'_>, horizon: usize, strategy: ForecastStrategy) -> ForecastResult {
    let mut points: Vec<(i32, f64)> = slice
        .iter()
        .filter_map(|r| Some((r.year?, r.deforestation_rate?)))
        .collect();
    if points.len() < 2 {
        log::debug!(
            "{}: {} usable rows, not enough history to forecast",
            slice.district(),
            points.len()
        );
        return ForecastResult::default();
    }

    // Stable, so among duplicate years the later dataset row stays last.
    points.sort_by_key(|(year, _)| *year);
    let (last_year, last_rate) = points[points.len() - 1];

    let project: Box<dyn Fn(f64) -> f64> = match strategy {
        ForecastStrategy::AverageDelta => {
            let Some(change) = average_change_per_year(&points) else {
                log::debug!("{}: all observations share one year", slice.district());
                return ForecastResult::default();
            };
            Box::new(move |step| last_rate + change * step)
        }
        ForecastStrategy::FixedGrowth { growth_factor } => {
            Box::new(move |step| last_rate * (1.0 + growth_factor * step))
        }
    };

    if i32::try_from(horizon).ok().and_then(|h| last_year.checked_add(h)).is_none() {
        log::debug!(
            "{}: horizon {} past {} leaves the year range",
            slice.district(),
            horizon,
            last_year
        );
        return ForecastResult::default();
    }

    let mut result = ForecastResult::default();
    for step in 1..=horizon {
        // In range: checked against the full horizon above.
        let year = last_year + step as i32;
        let rate = round2(project(step as f64));
        if !rate.is_finite() {
            log::debug!("{}: projected rate overflowed at {}", slice.district(), year);
            return ForecastResult::default();
        }
        result.years.push(year);
        result.rates.push(rate);
    }
    result
}

/// Mean of per-year rate changes between adjacent points sorted by year.
/// Pairs with the same year are skipped; `None` if no pair remains.
fn average_change_per_year(points: &[(i32, f64)]) -> Option<f64> {
    let slopes: Vec<f64> = points
        .windows(2)
        .filter_map(|pair| {
            let (y0, r0) = pair[0];
            let (y1, r1) = pair[1];
            let delta_year = y1 - y0;
            if delta_year == 0 {
                log::debug!("Skipping duplicate year {}", y1);
                return None;
            }
            Some((r1 - r0) / f64::from(delta_year))
        })
        .collect();
    mean(&slopes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::record;
    use crate::dataset::Dataset;

    fn dataset(rows: &[(Option<i32>, Option<f64>)]) -> Dataset {
        Dataset::new(rows.iter().map(|(y, r)| record("Purulia", *y, *r)).collect())
    }

    #[test]
    fn average_delta_projects_linear_trend() {
        let ds = dataset(&[(Some(2018), Some(10.0)), (Some(2019), Some(12.0)), (Some(2020), Some(14.0))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, DEFAULT_HORIZON, ForecastStrategy::AverageDelta);
        assert_eq!(f.years, (2021..=2030).collect::<Vec<_>>());
        assert_eq!(
            f.rates,
            vec![16.0, 18.0, 20.0, 22.0, 24.0, 26.0, 28.0, 30.0, 32.0, 34.0]
        );
    }

    #[test]
    fn unsorted_input_is_sorted_by_year() {
        let ds = dataset(&[(Some(2020), Some(14.0)), (Some(2018), Some(10.0)), (Some(2019), Some(12.0))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, 3, ForecastStrategy::AverageDelta);
        assert_eq!(f.years, vec![2021, 2022, 2023]);
        assert_eq!(f.rates, vec![16.0, 18.0, 20.0]);
    }

    #[test]
    fn irregular_spacing_uses_per_year_change() {
        // Slopes: (14-10)/4 = 1.0 and (16-14)/1 = 2.0, mean 1.5.
        let ds = dataset(&[(Some(2010), Some(10.0)), (Some(2014), Some(14.0)), (Some(2015), Some(16.0))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, 2, ForecastStrategy::AverageDelta);
        assert_eq!(f.years, vec![2016, 2017]);
        assert_eq!(f.rates, vec![17.5, 19.0]);
    }

    #[test]
    fn short_history_yields_empty_forecast() {
        let ds = dataset(&[(Some(2018), Some(10.0)), (Some(2019), None), (None, Some(3.0))]);
        let slice = ds.filter("Purulia").unwrap();
        for strategy in [
            ForecastStrategy::AverageDelta,
            ForecastStrategy::FixedGrowth { growth_factor: DEFAULT_GROWTH_FACTOR },
        ] {
            let f = forecast(&slice, DEFAULT_HORIZON, strategy);
            assert!(f.years.is_empty());
            assert!(f.rates.is_empty());
        }
    }

    #[test]
    fn duplicate_years_do_not_divide_by_zero() {
        // Pairs: 2019->2020 (+2), 2020->2020 skipped, 2020->2021 (+1); mean 1.5.
        let ds = dataset(&[
            (Some(2019), Some(10.0)),
            (Some(2020), Some(12.0)),
            (Some(2020), Some(11.0)),
            (Some(2021), Some(12.0)),
        ]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, 2, ForecastStrategy::AverageDelta);
        assert_eq!(f.rates, vec![13.5, 15.0]);
        assert!(f.rates.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn single_year_history_yields_empty_forecast() {
        let ds = dataset(&[(Some(2020), Some(10.0)), (Some(2020), Some(12.0))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, DEFAULT_HORIZON, ForecastStrategy::AverageDelta);
        assert_eq!(f, ForecastResult::default());
    }

    #[test]
    fn declining_history_never_exceeds_last_rate() {
        let ds = dataset(&[(Some(2016), Some(9.0)), (Some(2017), Some(8.25)), (Some(2019), Some(6.5))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, DEFAULT_HORIZON, ForecastStrategy::AverageDelta);
        assert_eq!(f.len(), DEFAULT_HORIZON);
        assert!(f.rates.iter().all(|r| *r <= 6.5));
        assert!(f.rates.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn years_are_contiguous_after_last_observation() {
        let ds = dataset(&[(Some(2001), Some(1.0)), (Some(2005), Some(1.4))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, DEFAULT_HORIZON, ForecastStrategy::AverageDelta);
        assert_eq!(f.years.len(), 10);
        assert_eq!(f.years[0], 2006);
        assert!(f.years.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(f.rates.len(), f.years.len());
    }

    #[test]
    fn fixed_growth_ignores_trend() {
        let ds = dataset(&[(Some(2018), Some(20.0)), (Some(2019), Some(10.0))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, 3, ForecastStrategy::FixedGrowth { growth_factor: 0.02 });
        assert_eq!(f.years, vec![2020, 2021, 2022]);
        assert_eq!(f.rates, vec![10.2, 10.4, 10.6]);
    }

    #[test]
    fn horizon_past_year_range_is_empty_not_partial() {
        let ds = dataset(&[(Some(i32::MAX - 4), Some(1.0)), (Some(i32::MAX - 3), Some(2.0))]);
        let slice = ds.filter("Purulia").unwrap();
        let f = forecast(&slice, DEFAULT_HORIZON, ForecastStrategy::AverageDelta);
        assert!(f.years.is_empty());
        assert!(f.rates.is_empty());

        let fits = forecast(&slice, 3, ForecastStrategy::AverageDelta);
        assert_eq!(fits.years, vec![i32::MAX - 2, i32::MAX - 1, i32::MAX]);
    }

    #[test]
    fn overflowing_rates_yield_empty_forecast() {
        let ds = dataset(&[(Some(2018), Some(-1e308)), (Some(2019), Some(1e308))]);
        let slice = ds.filter("Purulia").unwrap();
        assert!(forecast(&slice, DEFAULT_HORIZON, ForecastStrategy::AverageDelta).is_empty());
    }

    #[test]
    fn zero_horizon_is_empty() {
        let ds = dataset(&[(Some(2018), Some(1.0)), (Some(2019), Some(2.0))]);
        let slice = ds.filter("Purulia").unwrap();
        assert!(forecast(&slice, 0, ForecastStrategy::default()).is_empty());
    }
}
