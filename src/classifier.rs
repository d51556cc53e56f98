//! Classification of a single reading against a seasonal baseline.

use crate::error::StatsError;
use crate::model::EnrichedRecord;
use crate::season::{Season, season_of};
use crate::stats::{OUTLIER_SIGMAS, is_outlier};
use chrono::NaiveDate;
use serde::Serialize;

/// A row that carries the season baseline of its city.
pub trait Baseline {
    fn city(&self) -> &str;
    fn season(&self) -> Season;
    fn season_mean(&self) -> f64;
    fn season_std(&self) -> Option<f64>;
}

impl Baseline for EnrichedRecord {
    fn city(&self) -> &str {
        &self.record.city
    }

    fn season(&self) -> Season {
        self.record.season
    }

    fn season_mean(&self) -> f64 {
        self.season_mean
    }

    fn season_std(&self) -> Option<f64> {
        self.season_std
    }
}

/// Outcome of classifying a reading, with the band it was tested against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub city: String,
    pub season: Season,
    pub temperature: f64,
    pub season_mean: f64,
    pub season_std: Option<f64>,
    /// `(lower, upper)` normal band, absent when the std is undefined.
    pub normal_range: Option<(f64, f64)>,
    pub is_outlier: bool,
}

/// Test `temperature` against the baseline of the season containing
/// `reference_date`.
///
/// # Errors
/// Returns [`StatsError::BaselineNotFound`] if `table` has no row for this
/// city and season.
pub fn classify_reading<B: Baseline>(
    table: &[B],
    city: &str,
    temperature: f64,
    reference_date: NaiveDate,
) -> Result<bool, StatsError> {
    assess_reading(table, city, temperature, reference_date).map(|verdict| verdict.is_outlier)
}

/// Like [`classify_reading`], but returns the full [`Verdict`].
pub fn assess_reading<B: Baseline>(
    table: &[B],
    city: &str,
    temperature: f64,
    reference_date: NaiveDate,
) -> Result<Verdict, StatsError> {
    let season = season_of(reference_date);
    let row = table
        .iter()
        .find(|row| row.city() == city && row.season() == season)
        .ok_or_else(|| StatsError::BaselineNotFound {
            city: city.to_string(),
            season,
        })?;

    let season_mean = row.season_mean();
    let season_std = row.season_std();
    let normal_range = season_std
        .filter(|std_dev| std_dev.is_finite())
        .map(|std_dev| {
            (
                season_mean - OUTLIER_SIGMAS * std_dev,
                season_mean + OUTLIER_SIGMAS * std_dev,
            )
        });

    Ok(Verdict {
        city: city.to_string(),
        season,
        temperature,
        season_mean,
        season_std,
        normal_range,
        is_outlier: is_outlier(temperature, season_mean, season_std),
    })
}
