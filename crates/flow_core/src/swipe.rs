//! Horizontal swipe detection for step navigation on touch screens.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: go back a step.
    Back,
    /// Finger moved right: go forward a step.
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TouchOrigin {
    x: f64,
    y: f64,
}

/// Tracks one touch sequence at a time and reports at most one swipe per
/// sequence. Moves that are more vertical than horizontal are ignored.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f64,
    origin: Option<TouchOrigin>,
    fired: bool,
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            origin: None,
            fired: false,
        }
    }

    pub fn start(&mut self, x: f64, y: f64) {
        self.origin = Some(TouchOrigin { x, y });
        self.fired = false;
    }

    /// Reports a swipe once the drag passes the threshold. A direction that
    /// `allowed` rejects is not reported and does not use up the sequence.
    pub fn moved(
        &mut self,
        x: f64,
        y: f64,
        allowed: impl Fn(SwipeDirection) -> bool,
    ) -> Option<SwipeDirection> {
        let origin = self.origin?;
        if self.fired {
            return None;
        }

        let diff_x = origin.x - x;
        let diff_y = origin.y - y;
        if diff_y.abs() >= diff_x.abs() {
            return None;
        }

        let direction = if diff_x > self.threshold {
            SwipeDirection::Back
        } else if diff_x < -self.threshold {
            SwipeDirection::Forward
        } else {
            return None;
        };
        if !allowed(direction) {
            return None;
        }
        self.fired = true;
        Some(direction)
    }

    pub fn end(&mut self) {
        self.origin = None;
        self.fired = false;
    }
}
