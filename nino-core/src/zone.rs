use crate::coordinate::Coordinate;
use crate::error::ZoneTableError;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Embedded CSV data for the built-in risk zones, in precedence order.
pub static CSV_OBJECT: &str = include_str!("../../fixtures/risk_zones.csv");

/// Separator between recommendations inside the `recommendations` column.
const RECOMMENDATION_SEPARATOR: char = '|';

/// Flood risk classification of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "LOW-MODERATE")]
    LowModerate,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "MODERATE-HIGH")]
    ModerateHigh,
    #[serde(rename = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::LowModerate => "LOW-MODERATE",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::ModerateHigh => "MODERATE-HIGH",
            RiskLevel::High => "HIGH",
        }
    }

    /// Panel colour: anything touching HIGH is red, anything touching
    /// MODERATE is orange, the rest green.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::High | RiskLevel::ModerateHigh => "#e74c3c",
            RiskLevel::Moderate | RiskLevel::LowModerate => "#f39c12",
            RiskLevel::Low => "#27ae60",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', "-");
        match normalized.as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "LOW-MODERATE" => Ok(RiskLevel::LowModerate),
            "MODERATE" => Ok(RiskLevel::Moderate),
            "MODERATE-HIGH" => Ok(RiskLevel::ModerateHigh),
            "HIGH" => Ok(RiskLevel::High),
            _ => Err(s.to_string()),
        }
    }
}

/// Inclusive latitude/longitude box, `[[min_lat, min_lon], [max_lat, max_lon]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Bounds {
        Bounds {
            min_lat: min[0],
            min_lon: min[1],
            max_lat: max[0],
            max_lon: max[1],
        }
    }

    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        self.min_lat <= lat && lat <= self.max_lat && self.min_lon <= lon && lon <= self.max_lon
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.contains_point(coord.lat, coord.lon)
    }
}

/// A fixed geographic box with its flood risk metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub name: String,
    pub bounds: Bounds,
    pub risk_level: RiskLevel,
    /// Expected precipitation, e.g. "350-450 mm/month"
    pub precipitation_range: String,
    /// Probability of the event in percent (0-100)
    pub probability: u8,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ZoneRecord {
    name: String,
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    risk_level: String,
    precipitation: String,
    probability: u8,
    recommendations: String,
}

impl TryFrom<ZoneRecord> for RiskZone {
    type Error = ZoneTableError;

    fn try_from(record: ZoneRecord) -> Result<Self, Self::Error> {
        let risk_level = record.risk_level.parse::<RiskLevel>().map_err(|level| {
            ZoneTableError::UnknownRiskLevel {
                zone: record.name.clone(),
                level,
            }
        })?;
        if record.probability > 100 {
            return Err(ZoneTableError::Probability {
                zone: record.name,
                probability: record.probability,
            });
        }
        let bounds = Bounds::new(
            [record.min_lat, record.min_lon],
            [record.max_lat, record.max_lon],
        );
        if bounds.min_lat > bounds.max_lat || bounds.min_lon > bounds.max_lon {
            return Err(ZoneTableError::InvertedBounds { zone: record.name });
        }
        let recommendations = record
            .recommendations
            .split(RECOMMENDATION_SEPARATOR)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        Ok(RiskZone {
            name: record.name,
            bounds,
            risk_level,
            precipitation_range: record.precipitation,
            probability: record.probability,
            recommendations,
        })
    }
}

/// Ordered, immutable table of risk zones. Earlier zones take precedence
/// where boxes overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTable {
    zones: Vec<RiskZone>,
}

impl ZoneTable {
    pub fn new(zones: Vec<RiskZone>) -> ZoneTable {
        ZoneTable { zones }
    }

    /// The zone table shipped with the crate.
    pub fn builtin() -> ZoneTable {
        match ZoneTable::parse_zone_csv(CSV_OBJECT) {
            Ok(table) => table,
            Err(e) => panic!("failed to parse embedded zone table: {e}"),
        }
    }

    /// Parse a CSV string of zones.
    ///
    /// Expected CSV columns: name, min_lat, min_lon, max_lat, max_lon,
    /// risk_level, precipitation, probability, recommendations
    /// (recommendations separated by `|`).
    pub fn parse_zone_csv(csv_object: &str) -> Result<ZoneTable, ZoneTableError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_object.as_bytes());
        let mut zones = Vec::new();
        for row in rdr.deserialize::<ZoneRecord>() {
            zones.push(RiskZone::try_from(row?)?);
        }
        Ok(ZoneTable { zones })
    }

    /// First zone whose box contains the point, if any.
    pub fn resolve(&self, lat: f64, lon: f64) -> Option<&RiskZone> {
        self.zones.iter().find(|z| z.bounds.contains_point(lat, lon))
    }

    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = ZoneTable::builtin();
        assert_eq!(table.len(), 5);
        let names: Vec<&str> = table.zones().iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["Piura", "Tumbes", "Lambayeque", "La Libertad", "Lima"]);
        assert!(table.zones().iter().all(|z| z.recommendations.len() == 4));
        assert_eq!(table.zones()[4].risk_level, RiskLevel::LowModerate);
    }

    #[test]
    fn test_piura_click() {
        let table = ZoneTable::builtin();
        let zone = table.resolve(-5.2, -80.6).unwrap();
        assert_eq!(zone.name, "Piura");
        assert_eq!(zone.risk_level, RiskLevel::High);
        assert_eq!(zone.probability, 85);
        assert_eq!(zone.precipitation_range, "350-450 mm/month");
        assert_eq!(zone.recommendations[2], "Monitor SENAMHI alerts");
    }

    #[test]
    fn test_points_inside_each_box_resolve_to_it() {
        let table = ZoneTable::builtin();
        for (i, zone) in table.zones().iter().enumerate() {
            let b = zone.bounds;
            let mid_lat = (b.min_lat + b.max_lat) / 2.0;
            let mid_lon = (b.min_lon + b.max_lon) / 2.0;
            for (lat, lon) in [
                (mid_lat, mid_lon),
                (b.min_lat, b.min_lon),
                (b.max_lat, b.max_lon),
                (b.min_lat, b.max_lon),
                (b.max_lat, b.min_lon),
            ] {
                let hit = table.resolve(lat, lon).unwrap();
                // Lambayeque and La Libertad share a corner strip
                let shadowed = table.zones()[..i]
                    .iter()
                    .any(|z| z.bounds.contains_point(lat, lon));
                if !shadowed {
                    assert_eq!(hit.name, zone.name);
                }
            }
        }
        assert_eq!(table.resolve(-7.0, -79.5).unwrap().name, "Lambayeque");
    }

    #[test]
    fn test_points_outside_every_box() {
        let table = ZoneTable::builtin();
        for (lat, lon) in [
            (0.0, 0.0),
            (-9.2, -75.0),
            (-5.51, -80.6),
            (-4.6, -80.6),
            (-12.0, -76.49),
            (f64::NAN, -80.6),
        ] {
            assert!(table.resolve(lat, lon).is_none(), "({lat}, {lon})");
        }
    }

    #[test]
    fn test_earlier_zone_wins_on_overlap() {
        let csv = "\
name,min_lat,min_lon,max_lat,max_lon,risk_level,precipitation,probability,recommendations
First,0,0,2,2,LOW,10 mm/month,5,a
Second,1,1,3,3,HIGH,99 mm/month,95,b|c
";
        let table = ZoneTable::parse_zone_csv(csv).unwrap();
        assert_eq!(table.resolve(1.5, 1.5).unwrap().name, "First");
        assert_eq!(table.resolve(2.5, 2.5).unwrap().name, "Second");
        assert_eq!(table.zones()[1].recommendations, vec!["b", "c"]);
    }

    #[test]
    fn test_parse_errors() {
        let header = "name,min_lat,min_lon,max_lat,max_lon,risk_level,precipitation,probability,recommendations\n";
        let bad_level = format!("{header}X,0,0,1,1,SEVERE,1 mm,5,a\n");
        assert!(matches!(
            ZoneTable::parse_zone_csv(&bad_level),
            Err(ZoneTableError::UnknownRiskLevel { .. })
        ));
        let bad_probability = format!("{header}X,0,0,1,1,LOW,1 mm,101,a\n");
        assert!(matches!(
            ZoneTable::parse_zone_csv(&bad_probability),
            Err(ZoneTableError::Probability { .. })
        ));
        let inverted = format!("{header}X,1,0,0,1,LOW,1 mm,5,a\n");
        assert!(matches!(
            ZoneTable::parse_zone_csv(&inverted),
            Err(ZoneTableError::InvertedBounds { .. })
        ));
        let not_a_number = format!("{header}X,north,0,1,1,LOW,1 mm,5,a\n");
        assert!(matches!(
            ZoneTable::parse_zone_csv(&not_a_number),
            Err(ZoneTableError::Csv(_))
        ));
    }

    #[test]
    fn test_risk_level_parse_and_color() {
        assert_eq!("moderate_high".parse::<RiskLevel>(), Ok(RiskLevel::ModerateHigh));
        assert_eq!("MODERATE-HIGH".parse::<RiskLevel>(), Ok(RiskLevel::ModerateHigh));
        assert_eq!(RiskLevel::ModerateHigh.color(), "#e74c3c");
        assert_eq!(RiskLevel::LowModerate.color(), "#f39c12");
        assert_eq!(RiskLevel::Low.color(), "#27ae60");
        assert_eq!(RiskLevel::LowModerate.to_string(), "LOW-MODERATE");
    }
}
