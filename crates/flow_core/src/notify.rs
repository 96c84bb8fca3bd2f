//! Transient toast notifications.
//!
//! A toast is created in [`ToastPhase::Entering`], becomes visible after the
//! fade-in delay, starts leaving once its display time (counted from creation)
//! is up and is removed after the fade-out. Toasts never coalesce; each call
//! to [`ToastTray::notify`] stacks a new one.

use std::time::Duration;

use shared::{
    domain::{Severity, ToastId},
    protocol::{Toast, ToastPhase, UiEvent},
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastTask {
    Show(ToastId),
    Dismiss(ToastId),
    Remove(ToastId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTiming {
    pub fade_in: Duration,
    pub display: Duration,
    pub fade_out: Duration,
}

pub struct ToastTray {
    timing: ToastTiming,
    next_id: u64,
    toasts: Vec<Toast>,
    events: broadcast::Sender<UiEvent>,
}

impl ToastTray {
    pub fn new(timing: ToastTiming, events: broadcast::Sender<UiEvent>) -> Self {
        Self {
            timing,
            next_id: 1,
            toasts: Vec::new(),
            events,
        }
    }

    pub fn notify<T, S>(
        &mut self,
        scheduler: &mut S,
        message: impl Into<String>,
        severity: Severity,
    ) -> ToastId
    where
        S: Scheduler<T> + ?Sized,
        T: From<ToastTask>,
    {
        let id = ToastId(self.next_id);
        self.next_id += 1;

        let toast = Toast {
            id,
            message: message.into(),
            severity,
            phase: ToastPhase::Entering,
        };
        debug!(toast = id.0, severity = severity.key(), message = %toast.message, "toast created");
        let _ = self.events.send(UiEvent::ToastChanged {
            toast: toast.clone(),
        });
        self.toasts.push(toast);

        scheduler.schedule(self.timing.fade_in, ToastTask::Show(id).into());
        scheduler.schedule(self.timing.display, ToastTask::Dismiss(id).into());
        id
    }

    pub fn handle<T, S>(&mut self, scheduler: &mut S, task: ToastTask)
    where
        S: Scheduler<T> + ?Sized,
        T: From<ToastTask>,
    {
        match task {
            ToastTask::Show(id) => {
                self.set_phase(id, ToastPhase::Visible);
            }
            ToastTask::Dismiss(id) => {
                if self.set_phase(id, ToastPhase::Leaving) {
                    scheduler.schedule(self.timing.fade_out, ToastTask::Remove(id).into());
                }
            }
            ToastTask::Remove(id) => {
                self.remove(id);
            }
        }
    }

    /// Removes a toast right away, as the close button does.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        self.remove(id)
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.toasts.iter().filter(|t| t.severity == severity).count()
    }

    fn set_phase(&mut self, id: ToastId, phase: ToastPhase) -> bool {
        let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        // A manual dismiss may already have moved the toast along.
        if toast.phase >= phase {
            return false;
        }
        toast.phase = phase;
        let _ = self.events.send(UiEvent::ToastChanged {
            toast: toast.clone(),
        });
        true
    }

    fn remove(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        let removed = self.toasts.len() != before;
        if removed {
            let _ = self.events.send(UiEvent::ToastRemoved { id });
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TimerQueue;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn tray() -> (ToastTray, broadcast::Receiver<UiEvent>) {
        let (tx, rx) = broadcast::channel(64);
        let timing = ToastTiming {
            fade_in: ms(100),
            display: ms(3000),
            fade_out: ms(300),
        };
        (ToastTray::new(timing, tx), rx)
    }

    fn run(tray: &mut ToastTray, queue: &mut TimerQueue<ToastTask>, until: Duration) {
        while let Some(task) = queue.pop_due(until) {
            tray.handle(queue, task);
        }
        queue.settle(until);
    }

    #[test]
    fn toast_walks_through_its_lifecycle() {
        let (mut tray, _rx) = tray();
        let mut queue = TimerQueue::new();
        let id = tray.notify(&mut queue, "UPI ID copied to clipboard", Severity::Success);

        assert_eq!(tray.active()[0].phase, ToastPhase::Entering);
        run(&mut tray, &mut queue, ms(100));
        assert_eq!(tray.active()[0].phase, ToastPhase::Visible);
        run(&mut tray, &mut queue, ms(3000));
        assert_eq!(tray.active()[0].phase, ToastPhase::Leaving);
        run(&mut tray, &mut queue, ms(3299));
        assert_eq!(tray.active().len(), 1);
        run(&mut tray, &mut queue, ms(3300));
        assert!(tray.active().iter().all(|t| t.id != id));
        assert!(queue.is_idle());
    }

    #[test]
    fn concurrent_toasts_stack_independently() {
        let (mut tray, _rx) = tray();
        let mut queue = TimerQueue::new();
        tray.notify(&mut queue, "first", Severity::Info);
        run(&mut tray, &mut queue, ms(1000));
        tray.notify(&mut queue, "second", Severity::Warning);

        assert_eq!(tray.active().len(), 2);
        run(&mut tray, &mut queue, ms(3300));
        assert_eq!(tray.active().len(), 1);
        assert_eq!(tray.active()[0].message, "second");
        assert_eq!(tray.count(Severity::Warning), 1);
    }

    #[test]
    fn manual_dismiss_leaves_pending_timers_harmless() {
        let (mut tray, mut rx) = tray();
        let mut queue = TimerQueue::new();
        let id = tray.notify(&mut queue, "closable", Severity::Error);
        assert!(tray.dismiss(id));
        run(&mut tray, &mut queue, ms(10_000));

        assert!(tray.active().is_empty());
        let mut removals = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, UiEvent::ToastRemoved { .. }) {
                removals += 1;
            }
        }
        assert_eq!(removals, 1);
    }
}
