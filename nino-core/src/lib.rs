//! Core of the El Nino flood-risk map.
//!
//! - `zone` / `resolver`: static risk-zone table and point lookup
//! - `animator`: the day-by-day overlay animation state machine
//! - `overlay` / `scheduler`: the seams the animator drives (map layers, timers)

pub mod animator;
pub mod config;
pub mod coordinate;
pub mod date_range;
pub mod error;
pub mod imagery;
pub mod mode;
pub mod overlay;
pub mod resolver;
pub mod scheduler;
pub mod view;
pub mod zone;
