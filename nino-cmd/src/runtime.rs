//! Tokio bindings for the animator: real timers and a console map.
//!
//! Timers and imagery loads report back over one unbounded channel, so the
//! animator is only ever touched from the task that drains it.

use log::{debug, info, warn};
use nino_core::imagery::fill_tile;
use nino_core::overlay::{LayerId, OverlayLayer};
use nino_core::scheduler::{Scheduler, TimerHandle, Wakeup};
use nino_core::view::{MapView, Progress};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Something for the animation loop to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    Timer { handle: TimerHandle, wakeup: Wakeup },
    LayerLoaded(LayerId),
}

/// One spawned sleep per scheduled wakeup. Cancelling aborts the task; a
/// wakeup that was already sent before the abort is caught by the
/// animator's generation check.
pub struct TokioScheduler {
    events: UnboundedSender<MapEvent>,
    next_id: u64,
    tasks: HashMap<u64, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(events: UnboundedSender<MapEvent>) -> TokioScheduler {
        TokioScheduler {
            events,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id);
        self.next_id += 1;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(MapEvent::Timer { handle, wakeup });
        });
        self.tasks.insert(handle.id(), task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle.id()) {
            task.abort();
        }
    }

    fn fired(&mut self, handle: TimerHandle) {
        self.tasks.remove(&handle.id());
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Prints frames to stdout and logs layer changes.
pub struct ConsoleMap {
    events: UnboundedSender<MapEvent>,
    /// Set when imagery should be fetched to learn when a layer is ready
    client: Option<reqwest::Client>,
}

impl ConsoleMap {
    pub fn new(events: UnboundedSender<MapEvent>, client: Option<reqwest::Client>) -> ConsoleMap {
        ConsoleMap { events, client }
    }

    fn request_imagery(&self, layer: &OverlayLayer) {
        let id = layer.id;
        let Some(client) = self.client.clone() else {
            let _ = self.events.send(MapEvent::LayerLoaded(id));
            return;
        };
        let url = fill_tile(&layer.url, 0, 0, 0);
        let date = layer.date;
        let events = self.events.clone();
        tokio::spawn(async move {
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Imagery for {} ready", date);
                    let _ = events.send(MapEvent::LayerLoaded(id));
                }
                Ok(response) => {
                    warn!("Imagery for {} unavailable: {}", date, response.status());
                }
                Err(e) => {
                    warn!("Imagery request for {} failed: {}", date, e);
                }
            }
        });
    }
}

impl MapView for ConsoleMap {
    fn attach_layer(&mut self, layer: &OverlayLayer) {
        debug!(
            "Attach layer {} for {} at opacity {:.2}",
            layer.id.id(),
            layer.date,
            layer.opacity
        );
        if layer.opacity <= 0.0 {
            self.request_imagery(layer);
        }
    }

    fn set_opacity(&mut self, layer: LayerId, opacity: f32) {
        debug!("Layer {} opacity {:.2}", layer.id(), opacity);
    }

    fn detach_layer(&mut self, layer: LayerId) {
        debug!("Detach layer {}", layer.id());
    }

    fn show_progress(&mut self, progress: &Progress) {
        println!("{} {}", progress_bar(progress.percent, 30), progress.label());
    }

    fn clear_progress(&mut self) {
        info!("Progress cleared");
    }
}

/// Text progress bar, e.g. `[#####     ]`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
}
