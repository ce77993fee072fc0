//! The map surface the animator draws on.

use crate::overlay::{LayerId, OverlayLayer};
use chrono::NaiveDate;
use serde::Serialize;

/// Progress bar and current-date label contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub date: NaiveDate,
    /// 1-based position of the frame being shown
    pub position: usize,
    pub total: usize,
    pub percent: f64,
}

impl Progress {
    pub fn new(date: NaiveDate, index: usize, total: usize) -> Progress {
        let position = index + 1;
        Progress {
            date,
            position,
            total,
            percent: position as f64 / total as f64 * 100.0,
        }
    }

    pub fn label(&self) -> String {
        format!("Date: {} ({}/{})", self.date, self.position, self.total)
    }
}

pub trait MapView {
    fn attach_layer(&mut self, layer: &OverlayLayer);
    fn set_opacity(&mut self, layer: LayerId, opacity: f32);
    fn detach_layer(&mut self, layer: LayerId);

    fn show_progress(&mut self, _progress: &Progress) {}
    fn clear_progress(&mut self) {}
}
