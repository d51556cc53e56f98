//! Errors raised by the statistics core.

use crate::season::Season;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    /// The requested city has no historical rows.
    #[error("no temperature records for city {city:?}")]
    EmptyResult { city: String },

    /// The baseline table has no row for this city and season.
    #[error("no {season} baseline for city {city:?}")]
    BaselineNotFound { city: String, season: Season },
}
