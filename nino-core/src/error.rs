use chrono::NaiveDate;
use thiserror::Error;

/// Bad user input. Reported back to the user; never changes any state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("select a valid date range")]
    MissingDate,
    #[error("start date must be before end date ({start} > {end})")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("coordinates out of range (lat {lat}, lon {lon})")]
    CoordinateOutOfRange { lat: f64, lon: f64 },
    #[error("not a coordinate pair: {0:?}")]
    InvalidCoordinate(String),
}

/// Failure to load a risk zone table.
#[derive(Debug, Error)]
pub enum ZoneTableError {
    #[error("zone table csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("zone {zone}: unknown risk level {level:?}")]
    UnknownRiskLevel { zone: String, level: String },
    #[error("zone {zone}: probability {probability} is outside 0-100")]
    Probability { zone: String, probability: u8 },
    #[error("zone {zone}: minimum corner lies north or east of maximum corner")]
    InvertedBounds { zone: String },
}
