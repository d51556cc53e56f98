//! Seasonal temperature baselines and two-sigma outlier detection.
//!
//! [`engine::compute_seasonal_statistics`] enriches one city's history with a
//! 30-day rolling mean, per-season mean and standard deviation, and an outlier
//! flag. [`classifier::classify_reading`] tests a new reading against the
//! baseline of the season it falls in.

pub mod classifier;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod manager;
pub mod model;
pub mod season;
pub mod stats;
pub mod weather;
