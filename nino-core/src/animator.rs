//! Day-by-day overlay animation.
//!
//! `Animator` owns the whole animation: the frame sequence, the pending
//! advance and the overlay slot. Every transition takes the scheduler and
//! the map view it should act on, so the state machine runs the same under
//! a fake clock, a tokio runtime or a browser event loop.
//!
//! ```text
//! Idle --start--> Playing --pause--> Paused --resume--> Playing
//!   ^                |                  |
//!   +------stop------+-------stop-------+
//! ```

use crate::config::AnimatorConfig;
use crate::date_range::DateRange;
use crate::error::ValidationError;
use crate::imagery::{ImageryProduct, ImagerySource};
use crate::overlay::{FadeSettings, LayerId, OverlaySlot};
use crate::scheduler::{Scheduler, TimerHandle, Wakeup};
use crate::view::{MapView, Progress};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Playing,
    Paused,
}

/// Where the animation is in its frame sequence.
///
/// `current_index` is the next frame to show and never exceeds
/// `dates.len()`. While playing there is always exactly one pending advance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub phase: Phase,
    pub current_index: usize,
    pub dates: Vec<NaiveDate>,
    pub speed: Duration,
    pending: Option<TimerHandle>,
}

impl AnimationState {
    pub fn playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug)]
pub struct Animator<I = ImageryProduct> {
    source: I,
    state: AnimationState,
    range: Option<DateRange>,
    /// Bumped whenever the pending advance is cancelled; advances scheduled
    /// under an older generation are dropped on delivery.
    generation: u64,
    overlay: OverlaySlot,
    /// Day shown on the map when no animation has run yet
    base_date: NaiveDate,
    progress: Option<Progress>,
}

impl<I: ImagerySource> Animator<I> {
    pub fn new(config: AnimatorConfig, source: I, base_date: NaiveDate) -> Animator<I> {
        let overlay = OverlaySlot::new(FadeSettings {
            target: source.target_opacity(),
            step: config.fade_step,
            tick: config.fade_tick,
            load_timeout: config.load_timeout,
        });
        Animator {
            source,
            state: AnimationState {
                phase: Phase::Idle,
                current_index: 0,
                dates: Vec::new(),
                speed: config.speed,
                pending: None,
            },
            range: None,
            generation: 0,
            overlay,
            base_date,
            progress: None,
        }
    }

    /// The play button: resumes a paused animation where it left off,
    /// otherwise starts over on the given range.
    pub fn play<S: Scheduler, V: MapView>(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        sched: &mut S,
        view: &mut V,
    ) -> Result<(), ValidationError> {
        if self.state.phase == Phase::Paused {
            self.resume(sched);
            Ok(())
        } else {
            self.start(start, end, sched, view)
        }
    }

    /// Start from the first day of `start..=end`. On a bad range nothing
    /// changes.
    pub fn start<S: Scheduler, V: MapView>(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        sched: &mut S,
        view: &mut V,
    ) -> Result<(), ValidationError> {
        let range = DateRange::checked(start, end)?;
        self.begin(range, sched, view);
        Ok(())
    }

    fn begin<S: Scheduler, V: MapView>(&mut self, range: DateRange, sched: &mut S, view: &mut V) {
        self.cancel_advance(sched);
        self.state.dates = range.collect();
        self.state.current_index = 0;
        self.state.phase = Phase::Playing;
        self.range = Some(range);

        let url = self.source.tile_template(self.base_date);
        self.overlay.ensure_attached(self.base_date, url, view);

        info!(
            "Animation: {} days ({} to {})",
            self.state.dates.len(),
            range.start(),
            range.end()
        );
        self.schedule_advance(Duration::ZERO, sched);
    }

    /// Show `dates[current_index]` and schedule the next frame. Runs out into
    /// `stop` once the sequence is exhausted or the animation is not playing.
    pub fn advance_frame<S: Scheduler, V: MapView>(&mut self, sched: &mut S, view: &mut V) {
        self.cancel_advance(sched);
        let index = self.state.current_index;
        let total = self.state.dates.len();
        if !self.state.playing() || index >= total {
            self.stop(sched, view);
            return;
        }

        let date = self.state.dates[index];
        let url = self.source.tile_template(date);
        self.overlay.begin_fade(date, url, sched, view);

        let progress = Progress::new(date, index, total);
        debug!("{}", progress.label());
        view.show_progress(&progress);
        self.progress = Some(progress);

        self.state.current_index = index + 1;
        self.schedule_advance(self.state.speed, sched);
    }

    /// Only valid while playing. Keeps the position so `resume` can carry on.
    pub fn pause<S: Scheduler>(&mut self, sched: &mut S) -> bool {
        if self.state.phase != Phase::Playing {
            return false;
        }
        self.cancel_advance(sched);
        self.state.phase = Phase::Paused;
        info!(
            "Animation paused at {}/{}",
            self.state.current_index,
            self.state.dates.len()
        );
        true
    }

    /// Only valid while paused. Continues from the current index.
    pub fn resume<S: Scheduler>(&mut self, sched: &mut S) -> bool {
        if self.state.phase != Phase::Paused {
            return false;
        }
        self.state.phase = Phase::Playing;
        info!(
            "Animation resumed at {}/{}",
            self.state.current_index,
            self.state.dates.len()
        );
        self.schedule_advance(Duration::ZERO, sched);
        true
    }

    /// Valid from any state. Leaves one settled layer on the map and nothing
    /// scheduled.
    pub fn stop<S: Scheduler, V: MapView>(&mut self, sched: &mut S, view: &mut V) {
        self.cancel_advance(sched);
        self.overlay.settle(sched, view);
        self.state.phase = Phase::Idle;
        self.state.current_index = 0;
        self.progress = None;
        view.clear_progress();
        if !self.state.dates.is_empty() {
            info!("Animation stopped");
        }
    }

    /// Takes effect immediately. A playing animation restarts from its first
    /// day at the new speed; a paused one keeps its place.
    pub fn change_speed<S: Scheduler, V: MapView>(
        &mut self,
        speed: Duration,
        sched: &mut S,
        view: &mut V,
    ) {
        self.state.speed = speed;
        info!("Animation speed set to {speed:?}");
        if let (Phase::Playing, Some(range)) = (self.state.phase, self.range) {
            self.stop(sched, view);
            self.begin(range, sched, view);
        }
    }

    /// Point the overlay at a single day without animating, the way the date
    /// picker's apply button does.
    pub fn show_date<S: Scheduler, V: MapView>(
        &mut self,
        date: NaiveDate,
        sched: &mut S,
        view: &mut V,
    ) -> LayerId {
        self.base_date = date;
        let url = self.source.tile_template(date);
        info!("Date updated to {date}");
        self.overlay.replace(date, url, sched, view)
    }

    /// Deliver a wakeup that the scheduler handed back.
    pub fn wake<S: Scheduler, V: MapView>(&mut self, wakeup: Wakeup, sched: &mut S, view: &mut V) {
        match wakeup {
            Wakeup::Advance { generation } => {
                if generation != self.generation {
                    debug!(
                        "Dropping stale advance (generation {generation}, now {})",
                        self.generation
                    );
                    return;
                }
                self.state.pending = None;
                self.advance_frame(sched, view);
            }
            Wakeup::FadeTick { layer } => self.overlay.on_fade_tick(layer, sched, view),
            Wakeup::LoadTimeout { layer } => self.overlay.on_load_timeout(layer, sched, view),
        }
    }

    /// The imagery for `layer` finished loading.
    pub fn layer_loaded<S: Scheduler>(&mut self, layer: LayerId, sched: &mut S) {
        self.overlay.on_loaded(layer, sched);
    }

    fn cancel_advance<S: Scheduler>(&mut self, sched: &mut S) {
        if let Some(handle) = self.state.pending.take() {
            sched.cancel(handle);
        }
        self.generation += 1;
    }

    fn schedule_advance<S: Scheduler>(&mut self, delay: Duration, sched: &mut S) {
        let handle = sched.schedule(
            delay,
            Wakeup::Advance {
                generation: self.generation,
            },
        );
        self.state.pending = Some(handle);
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn overlay(&self) -> &OverlaySlot {
        &self.overlay
    }

    pub fn source(&self) -> &I {
        &self.source
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::view::testing::RecordingView;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    struct Harness {
        anim: Animator,
        sched: ManualScheduler,
        view: RecordingView,
        auto_load: bool,
    }

    impl Harness {
        fn new(config: AnimatorConfig) -> Harness {
            let base = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
            Harness {
                anim: Animator::new(config, ImageryProduct::SstAnomaly, base),
                sched: ManualScheduler::new(),
                view: RecordingView::default(),
                auto_load: true,
            }
        }

        fn start(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
            self.anim
                .start(Some(start), Some(end), &mut self.sched, &mut self.view)
        }

        fn run(&mut self, ms: u64) {
            let Harness {
                anim,
                sched,
                view,
                auto_load,
            } = self;
            sched.run_for(Duration::from_millis(ms), |s, w| {
                anim.wake(w, s, view);
                if *auto_load {
                    if let Some(id) = anim.overlay().incoming().map(|l| l.id) {
                        anim.layer_loaded(id, s);
                    }
                }
            });
        }

        fn index(&self) -> usize {
            self.anim.state().current_index
        }
    }

    #[test]
    fn test_invalid_range_changes_nothing() {
        let mut h = Harness::new(AnimatorConfig::default());
        let before = h.anim.state().clone();

        assert_eq!(
            h.start(day(3), day(1)),
            Err(ValidationError::StartAfterEnd {
                start: day(3),
                end: day(1)
            })
        );
        assert_eq!(
            h.anim.start(None, Some(day(1)), &mut h.sched, &mut h.view),
            Err(ValidationError::MissingDate)
        );
        assert_eq!(h.anim.state(), &before);
        assert_eq!(h.anim.phase(), Phase::Idle);
        assert!(h.sched.is_idle());
        assert!(h.view.attached.is_empty());
    }

    #[test]
    fn test_start_builds_inclusive_day_sequence() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(3)).unwrap();

        let state = h.anim.state();
        assert_eq!(state.dates, vec![day(1), day(2), day(3)]);
        assert_eq!(state.current_index, 0);
        assert!(state.playing());
        assert!(state.has_pending_advance());
        // the overlay is on the map before the first frame
        assert_eq!(h.view.attached.len(), 1);
    }

    #[test]
    fn test_range_ending_on_last_representable_day() {
        let mut h = Harness::new(AnimatorConfig::default());
        let last = NaiveDate::MAX;
        h.anim
            .start(Some(last), Some(last), &mut h.sched, &mut h.view)
            .unwrap();
        assert_eq!(h.anim.state().dates, vec![last]);

        h.run(1000);
        assert_eq!(h.view.frames, vec![last]);
        assert_eq!(h.anim.phase(), Phase::Idle);
    }

    #[test]
    fn test_plays_every_frame_then_stops() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(3)).unwrap();

        h.run(0);
        assert_eq!(h.index(), 1);
        let progress = h.anim.progress().unwrap();
        assert_eq!(progress.label(), "Date: 2024-01-01 (1/3)");
        assert!((progress.percent - 100.0 / 3.0).abs() < 1e-9);

        h.run(2000);
        assert_eq!(h.view.frames, vec![day(1), day(2), day(3)]);
        assert_eq!(h.view.progress.as_ref().unwrap().percent, 100.0);
        assert!(h.anim.state().playing());

        h.run(1000);
        assert_eq!(h.anim.phase(), Phase::Idle);
        assert_eq!(h.index(), 0);
        assert!(h.view.progress.is_none());
        assert!(h.sched.is_idle());
        assert_eq!(h.view.dates(), vec![day(3)]);
        assert_eq!(h.view.opacities(), vec![0.75]);
        assert!(h.view.max_attached <= 2);
    }

    #[test]
    fn test_pause_then_resume_continues_from_same_index() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(5)).unwrap();
        h.run(1000);
        assert_eq!(h.index(), 2);

        assert!(h.anim.pause(&mut h.sched));
        assert!(!h.anim.state().has_pending_advance());
        h.run(10_000);
        assert_eq!(h.index(), 2);
        assert_eq!(h.view.frames.len(), 2);
        assert_eq!(h.anim.phase(), Phase::Paused);

        assert!(h.anim.resume(&mut h.sched));
        h.run(0);
        assert_eq!(h.index(), 3);
        assert_eq!(h.view.frames, vec![day(1), day(2), day(3)]);
        assert_eq!(h.anim.state().dates.len(), 5);
    }

    #[test]
    fn test_play_button_resumes_when_paused() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(5)).unwrap();
        h.run(1000);
        h.anim.pause(&mut h.sched);

        // the range passed in is ignored while paused
        h.anim
            .play(Some(day(20)), Some(day(25)), &mut h.sched, &mut h.view)
            .unwrap();
        h.run(0);
        assert_eq!(h.view.frames.last(), Some(&day(3)));
        assert_eq!(h.anim.state().dates[0], day(1));
    }

    #[test]
    fn test_pause_and_resume_only_from_matching_phase() {
        let mut h = Harness::new(AnimatorConfig::default());
        assert!(!h.anim.pause(&mut h.sched));
        assert!(!h.anim.resume(&mut h.sched));
        h.start(day(1), day(2)).unwrap();
        assert!(!h.anim.resume(&mut h.sched));
        assert_eq!(h.sched.pending(), 1);
    }

    #[test]
    fn test_stop_leaves_nothing_scheduled() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(10)).unwrap();
        h.run(1500);
        assert_eq!(h.index(), 2);

        h.anim.stop(&mut h.sched, &mut h.view);
        assert_eq!(h.index(), 0);
        assert!(!h.anim.state().playing());
        assert!(h.sched.is_idle());
        assert!(h.view.progress.is_none());

        h.run(60_000);
        assert_eq!(h.view.frames.len(), 2);
        assert_eq!(h.view.attached.len(), 1);
    }

    #[test]
    fn test_stop_mid_fade_settles_overlay() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.auto_load = false;
        h.start(day(1), day(3)).unwrap();
        h.run(100);
        assert!(h.anim.overlay().is_fading());

        h.anim.stop(&mut h.sched, &mut h.view);
        assert!(!h.anim.overlay().is_fading());
        assert!(h.sched.is_idle());
        assert_eq!(h.view.dates(), vec![day(1)]);
        assert_eq!(h.view.opacities(), vec![0.75]);
    }

    #[test]
    fn test_stale_advance_is_ignored() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(5)).unwrap();
        let stale = h.sched.pending_wakeups()[0];

        h.anim.stop(&mut h.sched, &mut h.view);
        h.start(day(1), day(5)).unwrap();
        h.run(0);
        assert_eq!(h.index(), 1);

        // a timer that escaped cancellation must not move the fresh run
        h.anim.wake(stale, &mut h.sched, &mut h.view);
        assert_eq!(h.index(), 1);
        let advances = h
            .sched
            .pending_wakeups()
            .into_iter()
            .filter(|w| matches!(w, Wakeup::Advance { .. }))
            .count();
        assert_eq!(advances, 1);
    }

    #[test]
    fn test_change_speed_while_playing_restarts() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(5)).unwrap();
        h.run(1000);
        assert_eq!(h.index(), 2);

        h.anim
            .change_speed(Duration::from_millis(500), &mut h.sched, &mut h.view);
        assert_eq!(h.index(), 0);
        assert!(h.anim.state().playing());
        h.run(500);
        assert_eq!(h.index(), 2);
        assert_eq!(h.view.frames, vec![day(1), day(2), day(1), day(2)]);
    }

    #[test]
    fn test_change_speed_while_paused_keeps_position() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(5)).unwrap();
        h.run(1000);
        h.anim.pause(&mut h.sched);

        h.anim
            .change_speed(Duration::from_millis(250), &mut h.sched, &mut h.view);
        assert_eq!(h.anim.phase(), Phase::Paused);
        assert_eq!(h.index(), 2);
        assert_eq!(h.anim.state().speed, Duration::from_millis(250));
        assert!(h
            .sched
            .pending_wakeups()
            .iter()
            .all(|w| !matches!(w, Wakeup::Advance { .. })));
    }

    #[test]
    fn test_fast_frames_without_imagery_never_stack_layers() {
        let config = AnimatorConfig::default().with_speed(Duration::from_millis(250));
        let mut h = Harness::new(config);
        h.auto_load = false;
        h.start(day(1), day(8)).unwrap();

        h.run(8 * 250);
        assert_eq!(h.view.frames.len(), 8);
        assert_eq!(h.anim.phase(), Phase::Idle);
        assert!(h.view.max_attached <= 2);
        assert_eq!(h.view.dates(), vec![day(8)]);
        assert_eq!(h.view.opacities(), vec![0.75]);
        assert!(h.sched.is_idle());
    }

    #[test]
    fn test_slow_imagery_falls_back_after_timeout() {
        let config = AnimatorConfig::default().with_speed(Duration::from_millis(2000));
        let mut h = Harness::new(config);
        h.auto_load = false;
        h.start(day(1), day(2)).unwrap();

        h.run(999);
        assert!(h.anim.overlay().is_fading());
        assert_eq!(h.view.attached.len(), 2);

        h.run(1);
        assert!(!h.anim.overlay().is_fading());
        assert_eq!(h.view.dates(), vec![day(1)]);
        assert_eq!(h.view.opacities(), vec![0.75]);
    }

    #[test]
    fn test_advance_when_not_playing_stops() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.start(day(1), day(5)).unwrap();
        h.run(1000);
        h.anim.pause(&mut h.sched);

        h.anim.advance_frame(&mut h.sched, &mut h.view);
        assert_eq!(h.anim.phase(), Phase::Idle);
        assert_eq!(h.index(), 0);
        assert!(h.sched.is_idle());
    }

    #[test]
    fn test_show_date_swaps_overlay_immediately() {
        let mut h = Harness::new(AnimatorConfig::default());
        h.anim.show_date(day(15), &mut h.sched, &mut h.view);
        assert_eq!(h.view.dates(), vec![day(15)]);
        assert_eq!(h.anim.base_date(), day(15));

        h.anim.show_date(day(16), &mut h.sched, &mut h.view);
        assert_eq!(h.view.dates(), vec![day(16)]);
        assert_eq!(h.view.opacities(), vec![0.75]);

        // starting keeps the shown layer instead of attaching another
        h.start(day(1), day(2)).unwrap();
        assert_eq!(h.view.attached.len(), 1);
    }
}
