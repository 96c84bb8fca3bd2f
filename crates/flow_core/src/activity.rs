use std::collections::VecDeque;

use shared::protocol::Activity;

pub const ACTIVITY_CAP: usize = 5;

/// Most-recent-first activity feed. Inserting past the cap evicts the entry
/// that was inserted earliest.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<Activity>,
    cap: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_cap(ACTIVITY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap + 1),
            cap,
        }
    }

    /// Returns the evicted entry, if any.
    pub fn push(&mut self, activity: Activity) -> Option<Activity> {
        self.entries.push_front(activity);
        if self.entries.len() > self.cap {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Replaces the feed with `entries`, newest first, keeping at most `cap`.
    pub fn replace(&mut self, entries: impl IntoIterator<Item = Activity>) {
        self.entries = entries.into_iter().take(self.cap).collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&Activity> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Activity> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::ActivityKind;

    use super::*;

    fn entry(n: usize) -> Activity {
        Activity::new(ActivityKind::Info, format!("event {n}"), "", "Just now")
    }

    fn titles(log: &ActivityLog) -> Vec<String> {
        log.iter().map(|a| a.title.clone()).collect()
    }

    #[test]
    fn sixth_entry_evicts_the_oldest() {
        let mut log = ActivityLog::new();
        for n in 1..=5 {
            assert!(log.push(entry(n)).is_none());
        }

        let evicted = log.push(entry(6)).expect("evicted");
        assert_eq!(evicted.title, "event 1");
        assert_eq!(
            titles(&log),
            vec!["event 6", "event 5", "event 4", "event 3", "event 2"]
        );
    }

    #[test]
    fn replace_truncates_to_cap() {
        let mut log = ActivityLog::with_cap(2);
        log.replace((1..=4).map(entry));
        assert_eq!(titles(&log), vec!["event 1", "event 2"]);
        assert_eq!(log.newest().map(|a| a.title.as_str()), Some("event 1"));
    }
}
