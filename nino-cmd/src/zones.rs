//! Listing of the built-in zone table.

use nino_core::zone::{RiskZone, ZoneTable};

pub fn run_zones(json: bool) -> anyhow::Result<()> {
    let table = ZoneTable::builtin();
    if json {
        println!("{}", serde_json::to_string_pretty(table.zones())?);
    } else {
        for zone in table.zones() {
            println!("{}", zone_line(zone));
        }
    }
    Ok(())
}

fn zone_line(zone: &RiskZone) -> String {
    let b = &zone.bounds;
    format!(
        "{:<12} {:<14} {:>3}%  {:<17} [[{}, {}], [{}, {}]]",
        zone.name,
        zone.risk_level,
        zone.probability,
        zone.precipitation_range,
        b.min_lat,
        b.min_lon,
        b.max_lat,
        b.max_lon
    )
}
