//! Parent-side payment flow: fee review, method selection, simulated UPI
//! hand-off and confirmation.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use rand::Rng;
use serde_json::json;
use shared::{
    domain::{NavItem, ParentModal, PaymentMethod, SessionId, Severity, Step, UpiApp},
    error::FlowFailure,
    format::transaction_id,
    protocol::{ModalRef, PaymentPhase, StudentProfile, TransactionSummary, UiEvent},
    sample::SCHOOL_UPI_ID,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    analytics::{AnalyticsSink, Tracker},
    capabilities::{Clipboard, Haptics, MissingClipboard, NoHaptics},
    error::FlowError,
    notify::{ToastTask, ToastTiming, ToastTray},
    scheduler::{Scheduler, TimerDriven, TimerQueue},
    settings::{ms, FlowTimings},
    swipe::{SwipeDirection, SwipeTracker},
    view::{self, MethodCard, ProgressIndicator},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentTask {
    Toast(ToastTask),
    BeginProcessing { app: UpiApp },
    ShowSuccess { app: UpiApp },
    EndSuccessAnimation,
    Confirm { app: UpiApp },
    Finish,
}

impl From<ToastTask> for PaymentTask {
    fn from(value: ToastTask) -> Self {
        Self::Toast(value)
    }
}

/// In-memory state of one parent's trip through the payment screens.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    id: SessionId,
    profile: StudentProfile,
    current_step: Step,
    selected_method: Option<PaymentMethod>,
    phase: PaymentPhase,
    open_modal: Option<ParentModal>,
    upi_id_visible: bool,
    success_animation: bool,
    active_nav: NavItem,
    transactions: Vec<TransactionSummary>,
}

impl PaymentSession {
    pub fn new(profile: StudentProfile) -> Self {
        Self {
            id: SessionId::new(),
            profile,
            current_step: Step::Review,
            selected_method: None,
            phase: PaymentPhase::Idle,
            open_modal: None,
            upi_id_visible: false,
            success_animation: false,
            active_nav: NavItem::default(),
            transactions: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn selected_method(&self) -> Option<PaymentMethod> {
        self.selected_method
    }

    pub fn phase(&self) -> PaymentPhase {
        self.phase
    }

    pub fn open_modal(&self) -> Option<ParentModal> {
        self.open_modal
    }

    pub fn upi_id_visible(&self) -> bool {
        self.upi_id_visible
    }

    pub fn success_animation(&self) -> bool {
        self.success_animation
    }

    pub fn active_nav(&self) -> NavItem {
        self.active_nav
    }

    /// Latest synthesized transaction, shown on the confirmation step.
    pub fn transaction(&self) -> Option<&TransactionSummary> {
        self.transactions.last()
    }

    pub fn transactions(&self) -> &[TransactionSummary] {
        &self.transactions
    }
}

pub struct PaymentFlow<S = TimerQueue<PaymentTask>> {
    session: PaymentSession,
    scheduler: S,
    toasts: ToastTray,
    timings: FlowTimings,
    tracker: Tracker,
    clipboard: Box<dyn Clipboard>,
    haptics: Box<dyn Haptics>,
    swipe: SwipeTracker,
    events: broadcast::Sender<UiEvent>,
}

impl PaymentFlow<TimerQueue<PaymentTask>> {
    pub fn new(
        profile: StudentProfile,
        timings: FlowTimings,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self::new_with_scheduler(profile, timings, analytics, TimerQueue::new())
    }
}

impl<S> PaymentFlow<S>
where
    S: Scheduler<PaymentTask>,
{
    pub fn new_with_scheduler(
        profile: StudentProfile,
        timings: FlowTimings,
        analytics: Arc<dyn AnalyticsSink>,
        scheduler: S,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session = PaymentSession::new(profile);
        let toast_timing = ToastTiming {
            fade_in: ms(timings.toast_fade_in_ms),
            display: ms(timings.parent_toast_ms),
            fade_out: ms(timings.toast_fade_out_ms),
        };

        Self {
            tracker: Tracker::new(session.id(), analytics),
            toasts: ToastTray::new(toast_timing, events.clone()),
            swipe: SwipeTracker::new(timings.swipe_threshold_px),
            session,
            scheduler,
            timings,
            clipboard: Box::new(MissingClipboard),
            haptics: Box::new(NoHaptics),
            events,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_haptics(mut self, haptics: Box<dyn Haptics>) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &PaymentSession {
        &self.session
    }

    pub fn toasts(&self) -> &ToastTray {
        &self.toasts
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn progress(&self) -> ProgressIndicator {
        view::progress_indicator(self.session.current_step)
    }

    pub fn selected_method_card(&self) -> Option<MethodCard> {
        self.session.selected_method.map(view::method_card)
    }

    /// Moves to the next step. Leaving the first step needs a payment method;
    /// without one the step stays put and a warning toast is shown.
    pub fn advance_step(&mut self) -> Result<Step, FlowError> {
        self.pulse();
        let from = self.session.current_step;
        if from == Step::Review && self.session.selected_method.is_none() {
            return Err(self.reject(FlowError::validation("Please select a payment method")));
        }

        let Some(to) = from.next() else {
            return Ok(from);
        };
        self.set_active_step(to);
        if to == Step::Pay {
            self.tracker.track("payment_step_2_entered", json!({}));
        } else {
            self.tracker.track(
                "payment_step_forward",
                json!({ "from": from.number(), "to": to.number() }),
            );
        }
        Ok(to)
    }

    pub fn retreat_step(&mut self) -> Step {
        let from = self.session.current_step;
        let Some(to) = from.previous() else {
            return from;
        };
        self.set_active_step(to);
        self.tracker.track(
            "payment_step_back",
            json!({ "from": from.number(), "to": to.number() }),
        );
        to
    }

    pub fn select_method(&mut self, method: PaymentMethod) {
        self.pulse();
        self.session.selected_method = Some(method);
        debug!(method = method.key(), "payment method selected");
        let _ = self.events.send(UiEvent::MethodSelected { method });
        self.tracker
            .track("payment_method_selected", json!({ "method": method.key() }));
    }

    /// Hands the payment to a UPI app and runs the simulated gateway:
    /// launch, processing, success animation, then the confirmation step.
    pub fn initiate_payment(&mut self, app: UpiApp) {
        self.set_phase(PaymentPhase::LaunchingApp);
        self.notify(format!("Opening {}...", app.display_name()), Severity::Info);
        self.tracker
            .track("upi_app_selected", json!({ "app": app.key() }));
        self.scheduler.schedule(
            ms(self.timings.upi_launch_ms),
            PaymentTask::BeginProcessing { app },
        );
    }

    pub fn complete_payment(&mut self) {
        self.notify("Payment completed successfully!", Severity::Success);
        self.tracker.track(
            "payment_completed",
            json!({
                "amount": self.session.profile.total_amount,
                "method": self.session.selected_method.map(PaymentMethod::key),
                "studentId": self.session.profile.student_id.as_str(),
            }),
        );
        self.scheduler
            .schedule(ms(self.timings.completion_ms), PaymentTask::Finish);
    }

    pub fn change_payment_method(&mut self) {
        self.open_modal(ParentModal::PaymentMethod);
        self.tracker
            .track("payment_method_change_modal_opened", json!({}));
    }

    pub fn choose_method_from_modal(&mut self, method: PaymentMethod) {
        self.select_method(method);
        self.close_payment_modal();
        self.tracker
            .track("payment_method_changed", json!({ "method": method.key() }));
    }

    pub fn close_payment_modal(&mut self) {
        self.close_modal(ParentModal::PaymentMethod);
    }

    pub fn show_help(&mut self) {
        self.open_modal(ParentModal::Help);
        self.tracker.track("help_modal_opened", json!({}));
    }

    pub fn close_help_modal(&mut self) {
        self.close_modal(ParentModal::Help);
    }

    /// Closes `modal` if it is the one showing, as a backdrop click does.
    pub fn close_modal(&mut self, modal: ParentModal) {
        if self.session.open_modal == Some(modal) {
            self.session.open_modal = None;
            let _ = self.events.send(UiEvent::ModalToggled {
                modal: ModalRef::Parent(modal),
                open: false,
            });
        }
    }

    /// Escape key.
    pub fn close_all_modals(&mut self) {
        if let Some(modal) = self.session.open_modal {
            self.close_modal(modal);
        }
    }

    pub fn go_back(&mut self) {
        if self.session.current_step > Step::Review {
            self.retreat_step();
        } else {
            self.notify("Navigating back...", Severity::Info);
            self.tracker.track(
                "back_button_clicked",
                json!({ "step": self.session.current_step.number() }),
            );
        }
    }

    pub fn set_active_nav(&mut self, item: NavItem) {
        self.session.active_nav = item;
        let _ = self.events.send(UiEvent::NavChanged { item });
        self.tracker
            .track("bottom_nav_clicked", json!({ "item": item.label() }));
    }

    pub fn show_upi_id(&mut self) {
        self.session.upi_id_visible = true;
        let _ = self.events.send(UiEvent::UpiIdRevealed);
        self.tracker.track("upi_qr_code_viewed", json!({}));
    }

    pub fn copy_upi_id(&mut self) -> Result<(), FlowError> {
        match self.clipboard.write_text(SCHOOL_UPI_ID) {
            Ok(()) => {
                self.notify("UPI ID copied to clipboard", Severity::Success);
                self.tracker.track("upi_id_copied", json!({}));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "copying the UPI ID failed");
                self.notify("Failed to copy UPI ID", Severity::Error);
                let err = FlowError::Clipboard(err.to_string());
                let _ = self.events.send(UiEvent::Failed(FlowFailure::from(&err)));
                Err(err)
            }
        }
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        self.swipe.start(x, y);
    }

    /// Feeds a touch move; a horizontal swipe past the threshold steps the
    /// flow back or forward through the same operations as the buttons.
    /// Swipes past the first or last step are not reported.
    pub fn touch_move(&mut self, x: f64, y: f64) -> Option<SwipeDirection> {
        let step = self.session.current_step;
        let direction = self.swipe.moved(x, y, |direction| match direction {
            SwipeDirection::Back => step.previous().is_some(),
            SwipeDirection::Forward => step.next().is_some(),
        })?;
        match direction {
            SwipeDirection::Back => {
                self.retreat_step();
            }
            SwipeDirection::Forward => {
                // Rejection already surfaced as a toast.
                let _ = self.advance_step();
            }
        }
        Some(direction)
    }

    pub fn touch_end(&mut self) {
        self.swipe.end();
    }

    fn handle_task(&mut self, task: PaymentTask) {
        match task {
            PaymentTask::Toast(task) => self.toasts.handle(&mut self.scheduler, task),
            PaymentTask::BeginProcessing { app } => {
                self.set_phase(PaymentPhase::Processing);
                self.scheduler.schedule(
                    ms(self.timings.processing_ms),
                    PaymentTask::ShowSuccess { app },
                );
            }
            PaymentTask::ShowSuccess { app } => {
                self.set_phase(PaymentPhase::Succeeded);
                self.set_success_animation(true);
                self.scheduler.schedule(
                    ms(self.timings.success_animation_ms),
                    PaymentTask::EndSuccessAnimation,
                );
                self.scheduler
                    .schedule(ms(self.timings.confirmation_ms), PaymentTask::Confirm { app });
            }
            PaymentTask::EndSuccessAnimation => self.set_success_animation(false),
            PaymentTask::Confirm { app } => {
                self.set_active_step(Step::Confirmation);
                let summary = self.synthesize_transaction(app);
                info!(
                    transaction = %summary.transaction_id,
                    amount = summary.amount,
                    "payment confirmed"
                );
                self.session.transactions.push(summary.clone());
                self.set_phase(PaymentPhase::Confirmed);
                let _ = self.events.send(UiEvent::TransactionRecorded { summary });
            }
            PaymentTask::Finish => {
                self.set_phase(PaymentPhase::Finished);
                info!(session = %self.session.id.0, "payment flow completed");
            }
        }
    }

    fn synthesize_transaction(&self, app: UpiApp) -> TransactionSummary {
        let paid_at = Utc::now();
        let suffix = rand::thread_rng().gen_range(0..10_000u16);
        let profile = &self.session.profile;
        TransactionSummary {
            transaction_id: transaction_id(paid_at, suffix),
            method: PaymentMethod::Upi,
            upi_app: Some(app),
            method_label: format!("UPI - {}", app.display_name()),
            amount: profile.total_amount,
            paid_at,
            student_label: format!("{} ({})", profile.student_name, profile.grade),
        }
    }

    fn set_active_step(&mut self, to: Step) {
        let from = self.session.current_step;
        self.session.current_step = to;
        debug!(from = from.number(), to = to.number(), "step changed");
        let _ = self.events.send(UiEvent::StepChanged { from, to });
    }

    fn set_phase(&mut self, phase: PaymentPhase) {
        self.session.phase = phase;
        let _ = self.events.send(UiEvent::PaymentPhaseChanged { phase });
    }

    fn set_success_animation(&mut self, active: bool) {
        self.session.success_animation = active;
        let _ = self.events.send(UiEvent::SuccessAnimation { active });
    }

    fn open_modal(&mut self, modal: ParentModal) {
        self.session.open_modal = Some(modal);
        let _ = self.events.send(UiEvent::ModalToggled {
            modal: ModalRef::Parent(modal),
            open: true,
        });
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        self.tracker.track(
            "notification_shown",
            json!({ "type": severity.key(), "message": message }),
        );
        self.toasts.notify(&mut self.scheduler, message, severity);
    }

    fn reject(&mut self, err: FlowError) -> FlowError {
        warn!(error = %err, "payment action rejected");
        self.notify(err.message().to_string(), err.severity());
        let _ = self.events.send(UiEvent::Failed(FlowFailure::from(&err)));
        err
    }

    fn pulse(&mut self) {
        self.haptics
            .vibrate(Duration::from_millis(self.timings.haptic_pulse_ms));
    }
}

impl<S> TimerDriven for PaymentFlow<S>
where
    S: Scheduler<PaymentTask>,
{
    fn now(&self) -> Duration {
        self.scheduler.now()
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    fn advance(&mut self, dt: Duration) {
        let target = self.scheduler.now().saturating_add(dt);
        while let Some(task) = self.scheduler.pop_due(target) {
            self.handle_task(task);
        }
        self.scheduler.settle(target);
    }
}

#[cfg(test)]
#[path = "tests/payment_tests.rs"]
mod tests;
