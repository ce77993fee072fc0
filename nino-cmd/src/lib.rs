//! Command implementations for the nino CLI.
//!
//! Provides subcommands for looking up risk zones and for playing the
//! day-by-day imagery animation against a console map.

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use nino_core::config::SpeedPreset;
use nino_core::imagery::ImageryProduct;
use nino_core::mode::AnalysisMode;

pub mod animate;
pub mod resolve;
pub mod runtime;
pub mod zones;

#[derive(Subcommand)]
pub enum Command {
    /// List the built-in risk zones
    Zones {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the risk zone containing a point
    Resolve {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,

        /// Search box input, e.g. "-5.2, -80.6"
        #[arg(short, long, allow_hyphen_values = true, conflicts_with_all = ["lat", "lon"])]
        query: Option<String>,

        /// What the location is being assessed for
        #[arg(long, value_enum, default_value_t = ModeArg::Route)]
        mode: ModeArg,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play the imagery animation over a date range.
    ///
    /// While playing, type `pause`, `play`, `stop`, `speed <preset|ms>` or
    /// `date YYYY-MM-DD` on stdin.
    Animate {
        /// First day (defaults to 30 days ago)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day (defaults to 3 days ago, the latest published imagery)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Frame cadence
        #[arg(long, value_enum, default_value_t = SpeedArg::Normal)]
        speed: SpeedArg,

        /// Frame cadence in milliseconds, overrides --speed
        #[arg(long)]
        speed_ms: Option<u64>,

        /// Imagery product to animate
        #[arg(long, value_enum, default_value_t = ProductArg::Sst)]
        product: ProductArg,

        /// Fetch one tile per frame to find out when imagery is ready.
        /// Without it every frame counts as loaded straight away.
        #[arg(long)]
        probe: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Route,
    Construction,
}

impl From<ModeArg> for AnalysisMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Route => AnalysisMode::Route,
            ModeArg::Construction => AnalysisMode::Construction,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SpeedArg {
    Slow,
    Normal,
    Fast,
    VeryFast,
}

impl From<SpeedArg> for SpeedPreset {
    fn from(value: SpeedArg) -> Self {
        match value {
            SpeedArg::Slow => SpeedPreset::Slow,
            SpeedArg::Normal => SpeedPreset::Normal,
            SpeedArg::Fast => SpeedPreset::Fast,
            SpeedArg::VeryFast => SpeedPreset::VeryFast,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProductArg {
    /// Sea surface temperature anomalies
    Sst,
    /// IMERG precipitation rate
    Imerg,
}

impl From<ProductArg> for ImageryProduct {
    fn from(value: ProductArg) -> Self {
        match value {
            ProductArg::Sst => ImageryProduct::SstAnomaly,
            ProductArg::Imerg => ImageryProduct::ImergPrecipitation,
        }
    }
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Zones { json } => zones::run_zones(json),
        Command::Resolve {
            lat,
            lon,
            query,
            mode,
            json,
        } => resolve::run_resolve(lat, lon, query.as_deref(), mode.into(), json),
        Command::Animate {
            start,
            end,
            speed,
            speed_ms,
            product,
            probe,
        } => {
            let options = animate::AnimateOptions {
                start,
                end,
                speed: speed_ms.map_or_else(
                    || SpeedPreset::from(speed).interval(),
                    std::time::Duration::from_millis,
                ),
                product: product.into(),
                probe,
            };
            animate::run_animate(options).await
        }
    }
}
