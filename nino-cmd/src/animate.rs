//! Live animation run with stdin controls.

use crate::runtime::{ConsoleMap, MapEvent, TokioScheduler};
use chrono::NaiveDate;
use log::{info, warn};
use nino_core::animator::{Animator, Phase};
use nino_core::config::{AnimatorConfig, SpeedPreset};
use nino_core::imagery::{ImageryProduct, ImagerySource};
use nino_core::scheduler::Scheduler;
use nino_core::view::MapView;
use nino_utils::dates::{default_end_date, default_start_date, parse_date, today_utc};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub struct AnimateOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub speed: Duration,
    pub product: ImageryProduct,
    pub probe: bool,
}

/// A line typed while the animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Play,
    Pause,
    Stop,
    Speed(Duration),
    ShowDate(NaiveDate),
}

impl Control {
    pub fn parse(line: &str) -> Option<Control> {
        let mut words = line.split_whitespace();
        let control = match (words.next()?, words.next()) {
            ("play" | "resume", None) => Control::Play,
            ("pause", None) => Control::Pause,
            ("stop", None) => Control::Stop,
            ("speed", Some(arg)) => Control::Speed(parse_speed(arg)?),
            ("date", Some(arg)) => Control::ShowDate(parse_date(arg).ok()?),
            _ => return None,
        };
        words.next().is_none().then_some(control)
    }
}

fn parse_speed(arg: &str) -> Option<Duration> {
    let preset = match arg {
        "slow" => SpeedPreset::Slow,
        "normal" => SpeedPreset::Normal,
        "fast" => SpeedPreset::Fast,
        "very-fast" => SpeedPreset::VeryFast,
        ms => {
            let ms = ms.parse::<u64>().ok().filter(|ms| *ms > 0)?;
            return Some(Duration::from_millis(ms));
        }
    };
    Some(preset.interval())
}

/// One animation run: the animator plus the timers and map it acts on.
/// Every input the event loop receives goes through here.
pub struct Session<S, V> {
    animator: Animator,
    sched: S,
    map: V,
    start: NaiveDate,
    end: NaiveDate,
}

impl<S: Scheduler, V: MapView> Session<S, V> {
    pub fn new(animator: Animator, sched: S, map: V, start: NaiveDate, end: NaiveDate) -> Self {
        Session {
            animator,
            sched,
            map,
            start,
            end,
        }
    }

    pub fn begin(&mut self) -> anyhow::Result<()> {
        self.animator
            .start(Some(self.start), Some(self.end), &mut self.sched, &mut self.map)?;
        Ok(())
    }

    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Timer { handle, wakeup } => {
                self.sched.fired(handle);
                self.animator.wake(wakeup, &mut self.sched, &mut self.map);
            }
            MapEvent::LayerLoaded(layer) => self.animator.layer_loaded(layer, &mut self.sched),
        }
    }

    pub fn handle_control(&mut self, control: Control) -> anyhow::Result<()> {
        let (sched, map) = (&mut self.sched, &mut self.map);
        match control {
            Control::Play => self
                .animator
                .play(Some(self.start), Some(self.end), sched, map)?,
            Control::Pause => {
                if !self.animator.pause(sched) {
                    warn!("Nothing to pause");
                }
            }
            Control::Stop => self.animator.stop(sched, map),
            Control::Speed(speed) => self.animator.change_speed(speed, sched, map),
            Control::ShowDate(date) => {
                self.animator.show_date(date, sched, map);
            }
        }
        Ok(())
    }

    /// Nobody can resume a paused run once stdin is gone.
    pub fn input_closed(&mut self) {
        if self.animator.phase() == Phase::Paused {
            self.animator.stop(&mut self.sched, &mut self.map);
        }
    }

    pub fn interrupt(&mut self) {
        self.animator.stop(&mut self.sched, &mut self.map);
    }

    pub fn finished(&self) -> bool {
        self.animator.phase() == Phase::Idle
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }
}

pub async fn run_animate(options: AnimateOptions) -> anyhow::Result<()> {
    let today = today_utc();
    let start = options.start.unwrap_or_else(|| default_start_date(&today));
    let end = options.end.unwrap_or_else(|| default_end_date(&today));

    let client = if options.probe {
        Some(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
        )
    } else {
        None
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sched = TokioScheduler::new(tx.clone());
    let map = ConsoleMap::new(tx, client);
    let config = AnimatorConfig::default().with_speed(options.speed);
    let animator = Animator::new(config, options.product, end);

    info!(
        "Animating {} from {} to {} every {:?}",
        animator.source().attribution(),
        start,
        end,
        options.speed
    );
    let mut session = Session::new(animator, sched, map, start, end);
    session.begin()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => session.handle_event(event),
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match Control::parse(&line) {
                    Some(control) => session.handle_control(control)?,
                    None if line.trim().is_empty() => {}
                    None => warn!("Unknown control {:?}", line.trim()),
                },
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    session.input_closed();
                }
            },
            _ = &mut ctrl_c => session.interrupt(),
        }
        if session.finished() {
            break;
        }
    }

    info!("Animation finished");
    Ok(())
}
