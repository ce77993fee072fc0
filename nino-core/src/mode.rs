use crate::zone::RiskLevel;
use serde::{Deserialize, Serialize};

const FALLBACK_DESCRIPTION: &str = "Risk assessment completed based on available data.";

/// What the user is assessing a location for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Route,
    Construction,
}

/// One row of the map legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: &'static str,
}

const fn entry(color: &'static str, label: &'static str) -> LegendEntry {
    LegendEntry { color, label }
}

impl AnalysisMode {
    pub fn heading(&self) -> &'static str {
        match self {
            AnalysisMode::Route => "Safe Route Analysis",
            AnalysisMode::Construction => "Construction Site Viability",
        }
    }

    /// Plain-language reading of a risk level. Only the three headline levels
    /// have dedicated texts.
    pub fn description(&self, level: RiskLevel) -> &'static str {
        match (self, level) {
            (AnalysisMode::Route, RiskLevel::Low) => "Favorable conditions detected. Standard travel precautions apply. Routes shown indicate safe directions with minimal weather-related risks.",
            (AnalysisMode::Route, RiskLevel::Moderate) => "Moderate risk conditions identified. Enhanced precautions recommended. Follow marked safer routes and monitor weather updates regularly.",
            (AnalysisMode::Route, RiskLevel::High) => "High risk conditions detected. Evacuation routes are displayed. Consider delaying travel or following emergency routes only if necessary.",
            (AnalysisMode::Construction, RiskLevel::Low) => "Site conditions are favorable for construction. Standard building practices and local codes apply. Green zones indicate suitable areas.",
            (AnalysisMode::Construction, RiskLevel::Moderate) => "Site has moderate risk factors. Construction is possible with enhanced precautions including reinforced foundations and improved drainage systems.",
            (AnalysisMode::Construction, RiskLevel::High) => "Site has high risk factors including flood or disaster potential. Construction is not recommended. Alternative safer locations are marked on the map.",
            _ => FALLBACK_DESCRIPTION,
        }
    }

    pub fn legend(&self, level: RiskLevel) -> Vec<LegendEntry> {
        let mut entries = Vec::new();
        match self {
            AnalysisMode::Route => {
                entries.push(entry("#f44336", "Your selected location"));
                match level {
                    RiskLevel::Low => {
                        entries.push(entry("#2ecc71", "Safe travel directions"));
                        entries.push(entry("#2ecc71", "Low risk zone (1km radius)"));
                    }
                    RiskLevel::Moderate => {
                        entries.push(entry("#f39c12", "Recommended safer routes"));
                        entries.push(entry("#f39c12", "Caution zone (5km radius)"));
                    }
                    RiskLevel::High => {
                        entries.push(entry("#e74c3c", "PRIMARY evacuation route"));
                        entries.push(entry("#e67e22", "Secondary evacuation route"));
                        entries.push(entry("#e74c3c", "HIGH RISK zone - Avoid travel"));
                    }
                    _ => {}
                }
                entries.push(entry("#f44336", "Natural event location"));
            }
            AnalysisMode::Construction => {
                entries.push(entry("#f44336", "Selected construction site"));
                match level {
                    RiskLevel::Low => {
                        entries.push(entry("#2ecc71", "SUITABLE zone (2km radius)"));
                        entries.push(entry("#27ae60", "Alternative safe sites"));
                    }
                    RiskLevel::Moderate => {
                        entries.push(entry("#f39c12", "Construction POSSIBLE with precautions"));
                        entries.push(entry("#f39c12", "Recommended alternative sites"));
                    }
                    RiskLevel::High => {
                        entries.push(entry("#e74c3c", "NOT RECOMMENDED - High risk"));
                        entries.push(entry("#2ecc71", "Better alternative locations"));
                        entries.push(entry("#ffffff", "Connection to alternatives"));
                    }
                    _ => {}
                }
            }
        }
        entries
    }

    /// Closing note under the legend.
    pub fn legend_note(&self, level: RiskLevel) -> &'static str {
        match (self, level) {
            (AnalysisMode::Route, _) => "Arrows indicate safer travel directions. Follow main roads and monitor local alerts.",
            (AnalysisMode::Construction, RiskLevel::High) => "Circles show site viability zones. Consider marked alternatives for safer construction.",
            (AnalysisMode::Construction, _) => "Circles show site viability zones. Follow building codes and conduct site studies.",
        }
    }
}
