//! Current weather from the OpenWeatherMap API.
//!
//! API documentation: https://openweathermap.org/current

use crate::config::LiveConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Current conditions for a city, in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveReading {
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WeatherError {
    /// Non-2xx response; `code` is the `cod` field of the payload (401 means
    /// an invalid API key).
    #[error("weather API error {code}: {message}")]
    Api { code: u16, message: String },
    #[error("weather request failed: {0}")]
    Transport(String),
    #[error("could not decode weather response: {0}")]
    Decode(String),
    #[error("no API key given")]
    MissingApiKey,
}

/// Source of current temperature readings.
pub trait TemperatureProvider {
    fn current(&self, city: &str) -> Result<LiveReading, WeatherError>;
}

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
}

/// Error payload; `cod` is a number on some endpoints and a string on others.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    cod: serde_json::Value,
    #[serde(default)]
    message: String,
}

// ============================================================================
// Client
// ============================================================================

pub struct OpenWeatherMap {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    lang: String,
}

impl OpenWeatherMap {
    pub fn new(cfg: &LiveConfig, api_key: Option<String>) -> Result<Self, WeatherError> {
        let api_key = api_key
            .or_else(|| cfg.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .ok_or(WeatherError::MissingApiKey)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            lang: cfg.lang.clone(),
        })
    }
}

impl TemperatureProvider for OpenWeatherMap {
    fn current(&self, city: &str) -> Result<LiveReading, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        log::debug!("GET {url} q={city}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        parse_response(status, &body)
    }
}

fn parse_response(status: u16, body: &str) -> Result<LiveReading, WeatherError> {
    if !(200..300).contains(&status) {
        return Err(parse_error(status, body));
    }

    let current: CurrentResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    let description = current
        .weather
        .into_iter()
        .next()
        .map(|cond| cond.description)
        .unwrap_or_default();

    Ok(LiveReading {
        temperature: current.main.temp,
        feels_like: current.main.feels_like,
        description,
    })
}

fn parse_error(status: u16, body: &str) -> WeatherError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(payload) => {
            let code = match &payload.cod {
                serde_json::Value::Number(num) => num.as_u64(),
                serde_json::Value::String(text) => text.parse().ok(),
                _ => None,
            }
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(status);
            WeatherError::Api {
                code,
                message: payload.message,
            }
        }
        Err(_) => WeatherError::Api {
            code: status,
            message: body.trim().to_string(),
        },
    }
}
