use crate::error::StatsError;
use crate::model::{CityStatistics, EnrichedRecord, SeasonProfile, TemperatureRecord};
use crate::season::Season;
use crate::stats::{Accumulator, AccumulatorReport, RollingMean, is_outlier};
use chrono::Duration;
use std::collections::{HashMap, HashSet};

/// Span of the trailing rolling mean.
pub const ROLLING_WINDOW_DAYS: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Compute rolling means, season baselines and outlier flags for one city.
///
/// Rows of other cities are ignored and `table` is left untouched.
///
/// # Errors
/// Returns [`StatsError::EmptyResult`] if `table` has no rows for `city`.
pub fn compute_seasonal_statistics(
    table: &[TemperatureRecord],
    city: &str,
) -> Result<CityStatistics, StatsError> {
    let mut rows: Vec<&TemperatureRecord> = table.iter().filter(|rec| rec.city == city).collect();
    if rows.is_empty() {
        return Err(StatsError::EmptyResult {
            city: city.to_string(),
        });
    }
    // Stable, so equal timestamps keep their input order.
    rows.sort_by_key(|rec| rec.timestamp);
    log::debug!("{city}: {} rows", rows.len());

    let rolling_means = compute_rolling_means(&rows);
    let baselines = compute_season_baselines(&rows);

    let enriched: Vec<EnrichedRecord> = rows
        .iter()
        .zip(rolling_means)
        .map(|(&rec, rolling_mean_30d)| {
            let baseline = &baselines[&rec.season];
            EnrichedRecord {
                record: rec.clone(),
                rolling_mean_30d,
                season_mean: baseline.mean,
                season_std: baseline.std_dev,
                is_outlier: is_outlier(rec.temperature, baseline.mean, baseline.std_dev),
            }
        })
        .collect();

    let first = rows[0].timestamp;
    let last = rows[rows.len() - 1].timestamp;
    let distinct_date_count = rows
        .iter()
        .map(|rec| rec.timestamp)
        .collect::<HashSet<_>>()
        .len();

    Ok(CityStatistics {
        min_date: first.format(DATE_FORMAT).to_string(),
        max_date: last.format(DATE_FORMAT).to_string(),
        distinct_date_count,
        season_profiles: dedup_season_profiles(&enriched),
        enriched,
    })
}

fn compute_rolling_means(rows: &[&TemperatureRecord]) -> Vec<f64> {
    let mut roll = RollingMean::new(Duration::days(ROLLING_WINDOW_DAYS));
    rows.iter()
        .map(|rec| roll.push(rec.timestamp, rec.temperature))
        .collect()
}

fn compute_season_baselines(rows: &[&TemperatureRecord]) -> HashMap<Season, AccumulatorReport> {
    let mut acc_map: HashMap<Season, Accumulator> = HashMap::new();
    for rec in rows {
        acc_map
            .entry(rec.season)
            .or_insert_with(Accumulator::new)
            .add(rec.temperature);
    }
    acc_map
        .into_iter()
        .map(|(season, acc)| (season, acc.report()))
        .collect()
}

/// Distinct `(season, mean, std)` rows in order of first appearance.
fn dedup_season_profiles(enriched: &[EnrichedRecord]) -> Vec<SeasonProfile> {
    let mut seen = HashSet::new();
    enriched
        .iter()
        .filter(|rec| {
            let key = (
                rec.record.season,
                rec.season_mean.to_bits(),
                rec.season_std.map(f64::to_bits),
            );
            seen.insert(key)
        })
        .map(|rec| SeasonProfile {
            season: rec.record.season,
            season_mean: rec.season_mean,
            season_std: rec.season_std,
        })
        .collect()
}
