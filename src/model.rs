//! Temperature data types.

use crate::season::Season;
use chrono::NaiveDateTime;
use serde::Serialize;

/// A single historical temperature observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureRecord {
    pub city: String,
    pub timestamp: NaiveDateTime,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Season label supplied with the data.
    pub season: Season,
}

/// A [`TemperatureRecord`] annotated with its rolling mean, season baseline
/// and outlier flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: TemperatureRecord,

    /// Trailing mean over the preceding 30 days, current day included.
    pub rolling_mean_30d: f64,

    /// Mean temperature of all records sharing this city and season.
    pub season_mean: f64,
    /// Sample standard deviation of the same group, `None` below two records.
    pub season_std: Option<f64>,

    pub is_outlier: bool,
}

/// Seasonal baseline summary row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonProfile {
    pub season: Season,
    pub season_mean: f64,
    pub season_std: Option<f64>,
}

/// Result of analyzing one city's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityStatistics {
    /// Earliest timestamp, formatted `YYYY-MM-DD`.
    pub min_date: String,
    /// Latest timestamp, formatted `YYYY-MM-DD`.
    pub max_date: String,
    /// Number of distinct timestamps (not rows).
    pub distinct_date_count: usize,
    pub season_profiles: Vec<SeasonProfile>,
    pub enriched: Vec<EnrichedRecord>,
}

impl CityStatistics {
    pub fn outliers(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.enriched.iter().filter(|rec| rec.is_outlier)
    }
}
