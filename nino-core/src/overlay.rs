//! Single-owner overlay slot with cross-fade.
//!
//! At most two layers are attached at once: the settled `current` layer and
//! the `incoming` one fading in over it. A fade ends in `settle`, reached
//! either by the fade ticks hitting the target opacity or by the load
//! timeout. `settle` detaches the old layer and promotes the new one, so
//! whichever path gets there first wins and the other becomes a no-op.

use crate::scheduler::{Scheduler, TimerHandle, Wakeup};
use crate::view::MapView;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(u64);

impl LayerId {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// One time-indexed raster layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub id: LayerId,
    pub date: NaiveDate,
    pub url: String,
    pub opacity: f32,
}

/// Cross-fade timing and the opacity layers settle at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub target: f32,
    pub step: f32,
    pub tick: Duration,
    pub load_timeout: Duration,
}

#[derive(Debug)]
struct Fade {
    layer: OverlayLayer,
    loaded: bool,
    tick: Option<TimerHandle>,
    timeout: Option<TimerHandle>,
}

#[derive(Debug)]
pub struct OverlaySlot {
    settings: FadeSettings,
    current: Option<OverlayLayer>,
    incoming: Option<Fade>,
    next_id: u64,
}

impl OverlaySlot {
    pub fn new(settings: FadeSettings) -> OverlaySlot {
        OverlaySlot {
            settings,
            current: None,
            incoming: None,
            next_id: 0,
        }
    }

    fn new_layer(&mut self, date: NaiveDate, url: String, opacity: f32) -> OverlayLayer {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        OverlayLayer {
            id,
            date,
            url,
            opacity,
        }
    }

    /// Attach a fully visible layer for `date` unless one is already shown.
    pub fn ensure_attached<V: MapView>(&mut self, date: NaiveDate, url: String, view: &mut V) {
        if self.current.is_some() || self.incoming.is_some() {
            return;
        }
        let layer = self.new_layer(date, url, self.settings.target);
        view.attach_layer(&layer);
        self.current = Some(layer);
    }

    /// Replace whatever is shown with a fully visible layer for `date`, no fade.
    pub fn replace<S: Scheduler, V: MapView>(
        &mut self,
        date: NaiveDate,
        url: String,
        sched: &mut S,
        view: &mut V,
    ) -> LayerId {
        self.settle(sched, view);
        if let Some(old) = self.current.take() {
            view.detach_layer(old.id);
        }
        let layer = self.new_layer(date, url, self.settings.target);
        let id = layer.id;
        view.attach_layer(&layer);
        self.current = Some(layer);
        id
    }

    /// Attach a transparent layer for `date` and start waiting for it to load.
    /// A fade still in flight is settled first.
    pub fn begin_fade<S: Scheduler, V: MapView>(
        &mut self,
        date: NaiveDate,
        url: String,
        sched: &mut S,
        view: &mut V,
    ) -> LayerId {
        self.settle(sched, view);
        let layer = self.new_layer(date, url, 0.0);
        let id = layer.id;
        view.attach_layer(&layer);
        let timeout = sched.schedule(self.settings.load_timeout, Wakeup::LoadTimeout { layer: id });
        self.incoming = Some(Fade {
            layer,
            loaded: false,
            tick: None,
            timeout: Some(timeout),
        });
        id
    }

    /// The incoming layer's imagery arrived: start raising its opacity.
    pub fn on_loaded<S: Scheduler>(&mut self, layer: LayerId, sched: &mut S) {
        let tick = self.settings.tick;
        match self.incoming.as_mut() {
            Some(fade) if fade.layer.id == layer && !fade.loaded => {
                fade.loaded = true;
                fade.tick = Some(sched.schedule(tick, Wakeup::FadeTick { layer }));
            }
            _ => debug!("Load event for {layer:?} ignored"),
        }
    }

    pub fn on_fade_tick<S: Scheduler, V: MapView>(
        &mut self,
        layer: LayerId,
        sched: &mut S,
        view: &mut V,
    ) {
        let settings = self.settings;
        let Some(fade) = self.incoming.as_mut().filter(|f| f.layer.id == layer) else {
            return;
        };
        fade.tick = None;
        let opacity = fade.layer.opacity + settings.step;
        if opacity >= settings.target {
            self.settle(sched, view);
        } else {
            fade.layer.opacity = opacity;
            view.set_opacity(layer, opacity);
            fade.tick = Some(sched.schedule(settings.tick, Wakeup::FadeTick { layer }));
        }
    }

    pub fn on_load_timeout<S: Scheduler, V: MapView>(
        &mut self,
        layer: LayerId,
        sched: &mut S,
        view: &mut V,
    ) {
        let Some(fade) = self.incoming.as_mut().filter(|f| f.layer.id == layer) else {
            return;
        };
        fade.timeout = None;
        if fade.layer.opacity < self.settings.target {
            warn!(
                "Imagery for {} not ready after {:?}, forcing full opacity",
                fade.layer.date, self.settings.load_timeout
            );
        }
        self.settle(sched, view);
    }

    /// Finish any fade in flight: the incoming layer jumps to the target
    /// opacity and replaces the current one.
    pub fn settle<S: Scheduler, V: MapView>(&mut self, sched: &mut S, view: &mut V) {
        let Some(fade) = self.incoming.take() else {
            return;
        };
        for handle in [fade.tick, fade.timeout].into_iter().flatten() {
            sched.cancel(handle);
        }
        let mut layer = fade.layer;
        layer.opacity = self.settings.target;
        view.set_opacity(layer.id, layer.opacity);
        if let Some(old) = self.current.take() {
            view.detach_layer(old.id);
        }
        debug!("Overlay settled on {}", layer.date);
        self.current = Some(layer);
    }

    pub fn current(&self) -> Option<&OverlayLayer> {
        self.current.as_ref()
    }

    pub fn incoming(&self) -> Option<&OverlayLayer> {
        self.incoming.as_ref().map(|f| &f.layer)
    }

    pub fn is_fading(&self) -> bool {
        self.incoming.is_some()
    }

    pub fn settings(&self) -> &FadeSettings {
        &self.settings
    }
}
