//! Point selection against the zone table.
//!
//! A selection always moves the single point marker. When the point falls in
//! a zone the detail panel is rebuilt for it, otherwise any open panel is
//! closed.

use crate::coordinate::Coordinate;
use crate::zone::{RiskLevel, RiskZone, ZoneTable};
use log::{debug, info};
use serde::Serialize;
use std::fmt;

/// The one marker shown at the last selected point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
}

/// Rendered attributes of a matched zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDetail {
    pub title: String,
    pub zone: String,
    pub risk_level: RiskLevel,
    pub color: &'static str,
    pub probability: u8,
    pub precipitation: String,
    pub recommendations: Vec<String>,
    pub position: Coordinate,
}

impl ZoneDetail {
    pub fn new(zone: &RiskZone, position: Coordinate) -> ZoneDetail {
        ZoneDetail {
            title: format!("Prediction: {}", zone.name),
            zone: zone.name.clone(),
            risk_level: zone.risk_level,
            color: zone.risk_level.color(),
            probability: zone.probability,
            precipitation: zone.precipitation_range.clone(),
            recommendations: zone.recommendations.clone(),
            position,
        }
    }
}

impl fmt::Display for ZoneDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Risk Level: {}", self.risk_level)?;
        writeln!(f, "Probability: {}%", self.probability)?;
        writeln!(f, "Expected precipitation: {}", self.precipitation)?;
        writeln!(f, "Recommendations:")?;
        for r in &self.recommendations {
            writeln!(f, "  - {r}")?;
        }
        write!(
            f,
            "Coordinates: {:.4}, {:.4}",
            self.position.lat, self.position.lon
        )
    }
}

/// Owns the marker and detail panel for one map.
#[derive(Debug)]
pub struct ZoneResolver<'t> {
    table: &'t ZoneTable,
    marker: Option<Marker>,
    panel: Option<ZoneDetail>,
}

impl<'t> ZoneResolver<'t> {
    pub fn new(table: &'t ZoneTable) -> ZoneResolver<'t> {
        ZoneResolver {
            table,
            marker: None,
            panel: None,
        }
    }

    /// Handle a click at `position`.
    pub fn select(&mut self, position: Coordinate) -> Option<&'t RiskZone> {
        let table: &'t ZoneTable = self.table;
        let found = table.resolve(position.lat, position.lon);
        match found {
            Some(zone) => {
                self.panel = Some(ZoneDetail::new(zone, position));
                info!("Prediction generated for {}", zone.name);
            }
            None => {
                if self.panel.take().is_some() {
                    debug!("No zone at {position}, detail panel closed");
                }
            }
        }
        self.marker = Some(Marker { position });
        found
    }

    /// Close the detail panel, leaving the marker in place.
    pub fn dismiss(&mut self) {
        self.panel = None;
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn panel(&self) -> Option<&ZoneDetail> {
        self.panel.as_ref()
    }

    pub fn table(&self) -> &'t ZoneTable {
        self.table
    }
}
