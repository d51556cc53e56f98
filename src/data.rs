//! Loading historical temperature tables from CSV.

use crate::model::TemperatureRecord;
use crate::season::Season;
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::{collections::BTreeSet, fs::File, io::Read, path::Path};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Raw CSV row; any extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    city: String,
    timestamp: String,
    temperature: f64,
    season: String,
}

/// Load a temperature table from a CSV file with a header row.
///
/// Required columns are `city`, `timestamp`, `temperature` and `season`.
pub fn load_table<P: AsRef<Path>>(file: P) -> Result<Vec<TemperatureRecord>> {
    let file = file.as_ref();
    let reader = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    read_table(reader).with_context(|| format!("failed to read table from {file:?}"))
}

/// Read a temperature table from any CSV source.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<TemperatureRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut table = Vec::new();
    for (i_row, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        // Header is line 1.
        let line = i_row + 2;
        let row = row.with_context(|| format!("invalid row on line {line}"))?;
        let record = parse_row(row).with_context(|| format!("invalid row on line {line}"))?;
        table.push(record);
    }

    log::debug!("read {} rows", table.len());
    Ok(table)
}

fn parse_row(row: RawRow) -> Result<TemperatureRecord> {
    if row.city.is_empty() {
        bail!("city must not be empty");
    }
    if !row.temperature.is_finite() {
        bail!("temperature must be finite, but is {}", row.temperature);
    }
    Ok(TemperatureRecord {
        timestamp: parse_timestamp(&row.timestamp)?,
        season: row.season.parse::<Season>()?,
        city: row.city,
        temperature: row.temperature,
    })
}

/// Parse a naive date or date-time; a bare date means midnight.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime);
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid timestamp {text:?}"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN))
}

/// Distinct cities in `table`, sorted.
pub fn list_cities(table: &[TemperatureRecord]) -> Vec<String> {
    table
        .iter()
        .map(|rec| rec.city.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}
