use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Validate and build a coordinate. Latitude must lie in [-90, 90] and
    /// longitude in [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Coordinate, ValidationError> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Ok(Coordinate { lat, lon })
        } else {
            Err(ValidationError::CoordinateOutOfRange { lat, lon })
        }
    }

    /// Parse the search box form `"lat, lon"`, e.g. `"-5.2, -80.6"`.
    ///
    /// Only plain decimal numbers are accepted; anything else is left to
    /// place-name geocoding.
    pub fn parse(input: &str) -> Result<Coordinate, ValidationError> {
        let invalid = || ValidationError::InvalidCoordinate(input.to_string());
        let (lat, lon) = input.split_once(',').ok_or_else(invalid)?;
        let lat = parse_decimal(lat).ok_or_else(invalid)?;
        let lon = parse_decimal(lon).ok_or_else(invalid)?;
        Coordinate::new(lat, lon)
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty()
        || !digits.starts_with(|c: char| c.is_ascii_digit())
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    s.parse::<f64>().ok()
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {:.6}, Lon: {:.6}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::Coordinate;
    use crate::error::ValidationError;

    #[test]
    fn test_parse_search_input() {
        let c = Coordinate::parse("-5.2, -80.6").unwrap();
        assert_eq!(c, Coordinate { lat: -5.2, lon: -80.6 });

        let c = Coordinate::parse("12,77").unwrap();
        assert_eq!(c, Coordinate { lat: 12.0, lon: 77.0 });
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        for input in ["Piura", "-5.2", "1e3, 4", "inf, 2", ", 3", "-.5, 3", "5.2, -80.6, 1"] {
            assert_eq!(
                Coordinate::parse(input),
                Err(ValidationError::InvalidCoordinate(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            Coordinate::parse("91, 0"),
            Err(ValidationError::CoordinateOutOfRange { lat: 91.0, lon: 0.0 })
        );
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_display() {
        let c = Coordinate::new(-5.2, -80.6).unwrap();
        assert_eq!(c.to_string(), "Lat: -5.200000, Lon: -80.600000");
    }
}
