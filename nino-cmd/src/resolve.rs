//! Point lookup against the zone table.

use anyhow::bail;
use log::info;
use nino_core::coordinate::Coordinate;
use nino_core::mode::{AnalysisMode, LegendEntry};
use nino_core::resolver::{Marker, ZoneDetail, ZoneResolver};
use nino_core::zone::ZoneTable;
use serde::Serialize;

/// Everything the map shows after a click.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub marker: Option<Marker>,
    pub panel: Option<ZoneDetail>,
    pub mode: AnalysisMode,
    pub heading: &'static str,
    pub description: Option<&'static str>,
    pub legend: Vec<LegendEntry>,
}

impl ResolveReport {
    pub fn build(table: &ZoneTable, position: Coordinate, mode: AnalysisMode) -> ResolveReport {
        let mut resolver = ZoneResolver::new(table);
        let zone = resolver.select(position);
        let level = zone.map(|z| z.risk_level);
        ResolveReport {
            marker: resolver.marker().copied(),
            panel: resolver.panel().cloned(),
            mode,
            heading: mode.heading(),
            description: level.map(|l| mode.description(l)),
            legend: level.map(|l| mode.legend(l)).unwrap_or_default(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(marker) = &self.marker {
            out.push_str(&format!("Marker at {}\n", marker.position));
        }
        match &self.panel {
            Some(panel) => {
                out.push_str(&panel.to_string());
                out.push('\n');
            }
            None => out.push_str("No risk zone at this location\n"),
        }
        if let Some(description) = self.description {
            out.push_str(&format!("\n{}\n{}\n", self.heading, description));
            for entry in &self.legend {
                out.push_str(&format!("  [{}] {}\n", entry.color, entry.label));
            }
        }
        out
    }
}

fn position_from_args(
    lat: Option<f64>,
    lon: Option<f64>,
    query: Option<&str>,
) -> anyhow::Result<Coordinate> {
    let position = match (query, lat, lon) {
        (Some(q), _, _) => Coordinate::parse(q)?,
        (None, Some(lat), Some(lon)) => Coordinate::new(lat, lon)?,
        _ => bail!("give either --query or both --lat and --lon"),
    };
    Ok(position)
}

pub fn run_resolve(
    lat: Option<f64>,
    lon: Option<f64>,
    query: Option<&str>,
    mode: AnalysisMode,
    json: bool,
) -> anyhow::Result<()> {
    let position = position_from_args(lat, lon, query)?;
    let table = ZoneTable::builtin();
    let report = ResolveReport::build(&table, position, mode);
    info!(
        "Resolved {} to {}",
        position,
        report.panel.as_ref().map_or("no zone", |p| p.zone.as_str())
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}
