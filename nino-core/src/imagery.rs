//! Per-date raster imagery sources for the overlay layer.

use chrono::NaiveDate;
use nino_utils::dates::format_date;
use serde::{Deserialize, Serialize};

const GIBS_WMTS: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best";

/// Anything that can name an image for a calendar day.
pub trait ImagerySource {
    /// Tile URL template for `date`, with `{z}/{y}/{x}` left for the map.
    fn tile_template(&self, date: NaiveDate) -> String;

    /// Opacity a fully faded-in layer settles at.
    fn target_opacity(&self) -> f32;

    fn attribution(&self) -> &str;

    /// One concrete tile, used to check that a day's imagery is reachable.
    fn probe_url(&self, date: NaiveDate) -> String {
        fill_tile(&self.tile_template(date), 0, 0, 0)
    }
}

/// Substitute tile indices into a `{z}/{y}/{x}` template.
pub fn fill_tile(template: &str, z: u32, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{y}", &y.to_string())
        .replace("{x}", &x.to_string())
}

/// NASA GIBS daily products shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageryProduct {
    /// GHRSST MUR L4 sea surface temperature anomalies
    #[default]
    SstAnomaly,
    /// GPM IMERG precipitation rate
    ImergPrecipitation,
}

impl ImageryProduct {
    fn layer(&self) -> &'static str {
        match self {
            ImageryProduct::SstAnomaly => "GHRSST_L4_MUR_Sea_Surface_Temperature_Anomalies",
            ImageryProduct::ImergPrecipitation => "IMERG_Precipitation_Rate",
        }
    }

    fn tile_matrix_set(&self) -> &'static str {
        match self {
            ImageryProduct::SstAnomaly => "GoogleMapsCompatible_Level7",
            ImageryProduct::ImergPrecipitation => "GoogleMapsCompatible_Level6",
        }
    }
}

impl ImagerySource for ImageryProduct {
    fn tile_template(&self, date: NaiveDate) -> String {
        format!(
            "{GIBS_WMTS}/{}/default/{}/{}/{{z}}/{{y}}/{{x}}.png",
            self.layer(),
            format_date(&date),
            self.tile_matrix_set()
        )
    }

    fn target_opacity(&self) -> f32 {
        match self {
            ImageryProduct::SstAnomaly => 0.75,
            ImageryProduct::ImergPrecipitation => 0.65,
        }
    }

    fn attribution(&self) -> &str {
        match self {
            ImageryProduct::SstAnomaly => "NASA GHRSST - SST Anomalies (MUR L4)",
            ImageryProduct::ImergPrecipitation => "NASA EOSDIS GIBS - IMERG Precipitation",
        }
    }
}
