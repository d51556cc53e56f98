use crate::classifier::{Verdict, assess_reading};
use crate::config::Config;
use crate::data::{list_cities, load_table};
use crate::engine::compute_seasonal_statistics;
use crate::model::{CityStatistics, TemperatureRecord};
use crate::weather::{OpenWeatherMap, TemperatureProvider};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    data_file: PathBuf,
    cfg: Config,
}

/// Live reading together with its classification.
#[derive(Debug, Serialize)]
pub struct LiveReport {
    pub description: String,
    pub feels_like: f64,
    pub verdict: Verdict,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_file: P, cfg: Config) -> Self {
        Self {
            data_file: data_file.as_ref().to_path_buf(),
            cfg,
        }
    }

    pub fn show_cities(&self) -> Result<Vec<String>> {
        let table = self.load().context("failed to load table")?;
        let cities = list_cities(&table);
        for city in &cities {
            println!("{city}");
        }
        Ok(cities)
    }

    pub fn analyze_city(&self, city: &str, output: Option<&Path>) -> Result<CityStatistics> {
        let stats = self.compute(city)?;

        log::info!(
            "{city}: {} to {}, {} distinct dates",
            stats.min_date,
            stats.max_date,
            stats.distinct_date_count
        );
        for profile in &stats.season_profiles {
            match profile.season_std {
                Some(std_dev) => log::info!(
                    "{}: mean {:.2} std {:.2}",
                    profile.season,
                    profile.season_mean,
                    std_dev
                ),
                None => log::warn!(
                    "{}: mean {:.2} std undefined (single observation)",
                    profile.season,
                    profile.season_mean
                ),
            }
        }
        let n_outliers = stats.outliers().count();
        log::info!("{n_outliers} of {} records are outliers", stats.enriched.len());

        if let Some(output) = output {
            save_report(output, &stats).context("failed to save report")?;
            log::info!("wrote {output:?}");
        }

        Ok(stats)
    }

    pub fn check_reading(&self, city: &str, temperature: f64, date: NaiveDate) -> Result<Verdict> {
        let stats = self.compute(city)?;
        let verdict = assess_reading(&stats.enriched, city, temperature, date)
            .context("failed to classify reading")?;
        log_verdict(&verdict);
        Ok(verdict)
    }

    pub fn check_live(&self, city: &str, api_key: Option<String>, today: NaiveDate) -> Result<LiveReport> {
        let provider = OpenWeatherMap::new(&self.cfg.live, api_key)
            .context("failed to construct weather client")?;
        self.check_with_provider(&provider, city, today)
    }

    pub fn check_with_provider<T: TemperatureProvider>(
        &self,
        provider: &T,
        city: &str,
        today: NaiveDate,
    ) -> Result<LiveReport> {
        // Baseline first, so an unknown city never triggers a request.
        let stats = self.compute(city)?;

        let reading = provider
            .current(city)
            .with_context(|| format!("failed to fetch current weather for {city:?}"))?;
        log::info!(
            "{city} now: {:.1} °C, feels like {:.1} °C, {}",
            reading.temperature,
            reading.feels_like,
            reading.description
        );

        let verdict = assess_reading(&stats.enriched, city, reading.temperature, today)
            .context("failed to classify live reading")?;
        log_verdict(&verdict);

        Ok(LiveReport {
            description: reading.description,
            feels_like: reading.feels_like,
            verdict,
        })
    }

    fn load(&self) -> Result<Vec<TemperatureRecord>> {
        let table = load_table(&self.data_file)?;
        log::info!("loaded {} rows from {:?}", table.len(), self.data_file);
        Ok(table)
    }

    fn compute(&self, city: &str) -> Result<CityStatistics> {
        let table = self.load().context("failed to load table")?;
        let stats = compute_seasonal_statistics(&table, city)
            .with_context(|| format!("failed to compute statistics for {city:?}"))?;
        Ok(stats)
    }
}

fn log_verdict(verdict: &Verdict) {
    let band = match verdict.normal_range {
        Some((lower, upper)) => format!("[{lower:.1}, {upper:.1}]"),
        None => "undefined".to_string(),
    };
    if verdict.is_outlier {
        log::warn!(
            "{:.1} °C is anomalous for {} in {} (normal range {band})",
            verdict.temperature,
            verdict.city,
            verdict.season
        );
    } else {
        log::info!(
            "{:.1} °C is normal for {} in {} (normal range {band})",
            verdict.temperature,
            verdict.city,
            verdict.season
        );
    }
}

fn save_report<P: AsRef<Path>>(file: P, stats: &CityStatistics) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, stats).context("failed to serialize report")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
