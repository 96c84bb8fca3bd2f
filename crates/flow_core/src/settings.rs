use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every delay the simulated backend and the toast tray use, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTimings {
    pub toast_fade_in_ms: u64,
    pub toast_fade_out_ms: u64,
    pub parent_toast_ms: u64,
    pub admin_toast_ms: u64,
    pub upi_launch_ms: u64,
    pub processing_ms: u64,
    pub confirmation_ms: u64,
    pub success_animation_ms: u64,
    pub completion_ms: u64,
    pub dashboard_load_ms: u64,
    pub defaulters_load_ms: u64,
    pub parents_load_ms: u64,
    pub settings_load_ms: u64,
    pub reminder_send_ms: u64,
    pub success_toast_ms: u64,
    pub row_reminder_ms: u64,
    pub row_reminder_reset_ms: u64,
    pub realtime_refresh_ms: u64,
    pub haptic_pulse_ms: u64,
    pub swipe_threshold_px: f64,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            toast_fade_in_ms: 100,
            toast_fade_out_ms: 300,
            parent_toast_ms: 3000,
            admin_toast_ms: 4000,
            upi_launch_ms: 3000,
            processing_ms: 5000,
            confirmation_ms: 2000,
            success_animation_ms: 3000,
            completion_ms: 2000,
            dashboard_load_ms: 1000,
            defaulters_load_ms: 800,
            parents_load_ms: 1000,
            settings_load_ms: 0,
            reminder_send_ms: 2000,
            success_toast_ms: 5000,
            row_reminder_ms: 1500,
            row_reminder_reset_ms: 2000,
            realtime_refresh_ms: 30_000,
            haptic_pulse_ms: 50,
            swipe_threshold_px: 50.0,
        }
    }
}

pub(crate) fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

impl FlowTimings {
    /// Time from `initiate_payment` until the confirmation step is reached.
    pub fn payment_round_trip(&self) -> Duration {
        ms(self
            .upi_launch_ms
            .saturating_add(self.processing_ms)
            .saturating_add(self.confirmation_ms))
    }
}
