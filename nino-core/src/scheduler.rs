//! Timer seam for the animator.
//!
//! The animator never sleeps. It asks a `Scheduler` to hand a `Wakeup` back
//! after a delay and reacts when the owner delivers it through
//! `Animator::wake`. Tests drive time by hand with `ManualScheduler`.

use crate::overlay::LayerId;
use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies one scheduled wakeup so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> TimerHandle {
        TimerHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What a timer asks the animator to do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// Show the next frame. Ignored unless `generation` is still current.
    Advance { generation: u64 },
    /// Raise the incoming layer's opacity by one step.
    FadeTick { layer: LayerId },
    /// The incoming layer's imagery did not load in time.
    LoadTimeout { layer: LayerId },
}

pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle;

    /// Cancelling a handle that already fired is a no-op.
    fn cancel(&mut self, handle: TimerHandle);

    /// The wakeup for `handle` was delivered; forget any bookkeeping for it.
    fn fired(&mut self, _handle: TimerHandle) {}
}

/// Fake clock. Wakeups fire in due order, ties in scheduling order.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Wakeup>,
}

impl ManualScheduler {
    pub fn new() -> ManualScheduler {
        ManualScheduler::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending_wakeups(&self) -> Vec<Wakeup> {
        self.queue.values().copied().collect()
    }

    /// Remove and return the earliest wakeup due at or before `until`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Wakeup> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        self.now = due;
        self.queue.remove(&(due, id))
    }

    /// Move the clock forward by `by`, handing every wakeup that falls due
    /// to `on_wakeup`. Wakeups scheduled from inside the callback fire too if
    /// they are due before the end of the window.
    pub fn run_for<F>(&mut self, by: Duration, mut on_wakeup: F)
    where
        F: FnMut(&mut ManualScheduler, Wakeup),
    {
        let until = self.now + by;
        while let Some(wakeup) = self.pop_due(until) {
            on_wakeup(self, wakeup);
        }
        self.now = until;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((self.now + delay, id), wakeup);
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.queue.retain(|&(_, id), _| id != handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_in_due_order() {
        let mut sched = ManualScheduler::new();
        sched.schedule(20 * MS, Wakeup::Advance { generation: 2 });
        sched.schedule(10 * MS, Wakeup::Advance { generation: 1 });
        sched.schedule(10 * MS, Wakeup::Advance { generation: 3 });

        let mut fired = Vec::new();
        sched.run_for(15 * MS, |_, w| fired.push(w));
        assert_eq!(
            fired,
            vec![
                Wakeup::Advance { generation: 1 },
                Wakeup::Advance { generation: 3 }
            ]
        );
        assert_eq!(sched.now(), 15 * MS);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut sched = ManualScheduler::new();
        let handle = sched.schedule(5 * MS, Wakeup::Advance { generation: 0 });
        sched.cancel(handle);
        sched.cancel(handle);
        assert!(sched.is_idle());
        let mut fired = 0;
        sched.run_for(10 * MS, |_, _| fired += 1);
        assert_eq!(fired, 0);
    }

    #[test]
    fn test_rescheduling_from_callback() {
        let mut sched = ManualScheduler::new();
        sched.schedule(Duration::ZERO, Wakeup::Advance { generation: 0 });
        let mut fired = Vec::new();
        sched.run_for(25 * MS, |s, w| {
            fired.push(s.now());
            if let Wakeup::Advance { generation } = w {
                s.schedule(10 * MS, Wakeup::Advance { generation: generation + 1 });
            }
        });
        assert_eq!(fired, vec![Duration::ZERO, 10 * MS, 20 * MS]);
        assert_eq!(sched.pending(), 1);
    }
}
