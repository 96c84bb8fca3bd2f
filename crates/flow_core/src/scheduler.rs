//! Deferred-task scheduling for the simulated backend.
//!
//! Controllers never sleep. They hand a task and a delay to a [`Scheduler`]
//! and handle the task when the host advances time past its deadline. The
//! bundled [`TimerQueue`] keeps a virtual clock, so tests step through a
//! whole payment in microseconds while the CLI drives the same queue against
//! the wall clock with [`drive_for`].

use std::{collections::BTreeMap, time::Duration};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub trait Scheduler<T> {
    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;

    /// Queues `task` to fire once `delay` has elapsed. There is no way to
    /// cancel it; a scheduled task always fires.
    fn schedule(&mut self, delay: Duration, task: T) -> TimerId;

    fn next_deadline(&self) -> Option<Duration>;

    /// Removes the earliest task due at or before `until`, moving the clock to
    /// its deadline.
    fn pop_due(&mut self, until: Duration) -> Option<T>;

    /// Moves the clock forward to `at` after every due task was popped.
    fn settle(&mut self, at: Duration);

    fn pending(&self) -> usize;
}

/// Virtual-clock timer queue ordered by deadline, then by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_seq: u64,
    entries: BTreeMap<(Duration, u64), T>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> for TimerQueue<T> {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = self.now.saturating_add(delay);
        self.entries.insert((deadline, seq), task);
        trace!(timer = seq, deadline_ms = deadline.as_millis() as u64, "timer scheduled");
        TimerId(seq)
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    fn pop_due(&mut self, until: Duration) -> Option<T> {
        let key = *self.entries.keys().next()?;
        if key.0 > until {
            return None;
        }
        let task = self.entries.remove(&key)?;
        self.now = self.now.max(key.0);
        Some(task)
    }

    fn settle(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    fn pending(&self) -> usize {
        self.entries.len()
    }
}

/// Something that owns a scheduler and reacts to its tasks.
pub trait TimerDriven {
    fn now(&self) -> Duration;
    fn next_deadline(&self) -> Option<Duration>;
    /// Fires every task due within `dt`, including tasks scheduled while
    /// handling earlier ones, then moves the clock by `dt`.
    fn advance(&mut self, dt: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Sleep on the tokio clock between deadlines.
    Realtime,
    /// Jump straight to each deadline.
    Instant,
}

/// Runs `target` for `span` of scheduler time.
pub async fn drive_for<D>(target: &mut D, span: Duration, pace: Pace)
where
    D: TimerDriven + ?Sized,
{
    let end = target.now().saturating_add(span);
    while let Some(deadline) = target.next_deadline().filter(|deadline| *deadline <= end) {
        let wait = deadline.saturating_sub(target.now());
        if pace == Pace::Realtime && !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        target.advance(wait);
    }

    let rest = end.saturating_sub(target.now());
    if pace == Pace::Realtime && !rest.is_zero() {
        tokio::time::sleep(rest).await;
    }
    target.advance(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn drain(queue: &mut TimerQueue<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(task) = queue.pop_due(until) {
            fired.push(task);
        }
        queue.settle(until);
        fired
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(300), "late");
        queue.schedule(ms(100), "early");
        queue.schedule(ms(200), "middle");

        assert_eq!(drain(&mut queue, ms(1000)), vec!["early", "middle", "late"]);
        assert_eq!(queue.now(), ms(1000));
    }

    #[test]
    fn equal_deadlines_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(50), "first");
        queue.schedule(ms(50), "second");
        assert_eq!(drain(&mut queue, ms(50)), vec!["first", "second"]);
    }

    #[test]
    fn tasks_beyond_the_target_stay_queued() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(100), "due");
        queue.schedule(ms(500), "later");

        assert_eq!(drain(&mut queue, ms(200)), vec!["due"]);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.next_deadline(), Some(ms(500)));
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut queue = TimerQueue::new();
        queue.settle(ms(1000));
        queue.schedule(ms(10), "soon");
        assert_eq!(queue.next_deadline(), Some(ms(1010)));
    }

    #[test]
    fn huge_delays_clamp_instead_of_overflowing() {
        let mut queue = TimerQueue::new();
        queue.settle(ms(1000));
        queue.schedule(Duration::MAX, "never");
        assert_eq!(queue.next_deadline(), Some(Duration::MAX));
        assert!(drain(&mut queue, ms(u64::MAX)).is_empty());
    }

    struct Counter {
        queue: TimerQueue<u32>,
        fired: Vec<(u32, Duration)>,
    }

    impl TimerDriven for Counter {
        fn now(&self) -> Duration {
            self.queue.now()
        }

        fn next_deadline(&self) -> Option<Duration> {
            self.queue.next_deadline()
        }

        fn advance(&mut self, dt: Duration) {
            let target = self.queue.now() + dt;
            while let Some(task) = self.queue.pop_due(target) {
                self.fired.push((task, self.queue.now()));
                if task < 3 {
                    self.queue.schedule(ms(10), task + 1);
                }
            }
            self.queue.settle(target);
        }
    }

    #[tokio::test]
    async fn drive_for_follows_chained_tasks() {
        let mut counter = Counter {
            queue: TimerQueue::new(),
            fired: Vec::new(),
        };
        counter.queue.schedule(ms(10), 1);

        drive_for(&mut counter, ms(100), Pace::Instant).await;

        assert_eq!(
            counter.fired,
            vec![(1, ms(10)), (2, ms(20)), (3, ms(30))]
        );
        assert_eq!(counter.now(), ms(100));
    }
}
