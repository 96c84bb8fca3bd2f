use super::*;
use crate::{analytics::MemoryAnalyticsSink, error::CapabilityError};
use parking_lot::Mutex;
use shared::{protocol::ToastPhase, sample};

fn flow() -> (PaymentFlow, MemoryAnalyticsSink) {
    let sink = MemoryAnalyticsSink::new();
    let flow = PaymentFlow::new(
        sample::student_profile(),
        FlowTimings::default(),
        Arc::new(sink.clone()),
    );
    (flow, sink)
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

/// Records what would be scheduled without ever firing anything.
#[derive(Default)]
struct RecordingScheduler {
    scheduled: Vec<(Duration, PaymentTask)>,
}

impl RecordingScheduler {
    fn flow_tasks(&self) -> Vec<&(Duration, PaymentTask)> {
        self.scheduled
            .iter()
            .filter(|(_, task)| !matches!(task, PaymentTask::Toast(_)))
            .collect()
    }
}

impl Scheduler<PaymentTask> for RecordingScheduler {
    fn now(&self) -> Duration {
        Duration::ZERO
    }

    fn schedule(&mut self, delay: Duration, task: PaymentTask) -> crate::scheduler::TimerId {
        self.scheduled.push((delay, task));
        crate::scheduler::TimerId(self.scheduled.len() as u64)
    }

    fn next_deadline(&self) -> Option<Duration> {
        None
    }

    fn pop_due(&mut self, _until: Duration) -> Option<PaymentTask> {
        None
    }

    fn settle(&mut self, _at: Duration) {}

    fn pending(&self) -> usize {
        self.scheduled.len()
    }
}

struct FakeClipboard {
    written: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError> {
        if self.fail {
            return Err(CapabilityError::new("clipboard", "permission denied"));
        }
        self.written.lock().push(text.to_string());
        Ok(())
    }
}

struct CountingHaptics(Arc<Mutex<Vec<Duration>>>);

impl Haptics for CountingHaptics {
    fn vibrate(&mut self, pulse: Duration) {
        self.0.lock().push(pulse);
    }
}

#[test]
fn advancing_without_a_method_is_rejected_with_one_warning() {
    let sink = MemoryAnalyticsSink::new();
    let mut flow = PaymentFlow::new_with_scheduler(
        sample::student_profile(),
        FlowTimings::default(),
        Arc::new(sink.clone()),
        RecordingScheduler::default(),
    );

    let err = flow.advance_step().expect_err("no method selected");

    assert_eq!(err, FlowError::validation("Please select a payment method"));
    assert_eq!(flow.session().current_step(), Step::Review);
    assert_eq!(flow.toasts().count(Severity::Warning), 1);
    assert_eq!(flow.toasts().active().len(), 1);
    assert!(flow.scheduler().flow_tasks().is_empty());
    assert_eq!(sink.count("payment_step_2_entered"), 0);
}

#[test]
fn steps_never_leave_the_three_step_range() {
    let (mut flow, _) = flow();

    assert_eq!(flow.retreat_step(), Step::Review);
    flow.select_method(PaymentMethod::Card);
    assert_eq!(flow.advance_step().expect("to pay"), Step::Pay);
    assert_eq!(flow.advance_step().expect("to confirmation"), Step::Confirmation);
    assert_eq!(flow.advance_step().expect("stays"), Step::Confirmation);
    assert_eq!(flow.session().current_step(), Step::Confirmation);

    assert_eq!(flow.retreat_step(), Step::Pay);
    assert_eq!(flow.retreat_step(), Step::Review);
    assert_eq!(flow.retreat_step(), Step::Review);
}

#[test]
fn selecting_a_method_updates_the_card_and_tracks_it() {
    let (mut flow, sink) = flow();
    let mut rx = flow.subscribe_events();

    flow.select_method(PaymentMethod::NetBanking);

    assert_eq!(flow.session().selected_method(), Some(PaymentMethod::NetBanking));
    assert_eq!(
        flow.selected_method_card().map(|card| card.title),
        Some("Net Banking")
    );
    assert_eq!(
        rx.try_recv().expect("event"),
        UiEvent::MethodSelected {
            method: PaymentMethod::NetBanking
        }
    );
    let event = sink.last("payment_method_selected").expect("tracked");
    assert_eq!(event.payload["method"], "netbanking");
}

#[test]
fn upi_payment_reaches_confirmation_after_all_delays() {
    let (mut flow, sink) = flow();
    flow.select_method(PaymentMethod::Upi);
    flow.advance_step().expect("to pay");

    flow.initiate_payment(UpiApp::GooglePay);
    assert_eq!(flow.session().phase(), PaymentPhase::LaunchingApp);
    assert_eq!(flow.toasts().active()[0].message, "Opening Google Pay...");

    flow.advance(secs(3));
    assert_eq!(flow.session().phase(), PaymentPhase::Processing);

    flow.advance(secs(5));
    assert_eq!(flow.session().phase(), PaymentPhase::Succeeded);
    assert!(flow.session().success_animation());
    assert_eq!(flow.session().current_step(), Step::Pay);
    assert!(flow.session().transaction().is_none());

    flow.advance(secs(2));
    assert_eq!(flow.session().current_step(), Step::Confirmation);
    assert_eq!(flow.session().phase(), PaymentPhase::Confirmed);
    assert_eq!(flow.session().transactions().len(), 1);

    let summary = flow.session().transaction().expect("summary");
    assert!(summary.transaction_id.as_str().starts_with("TXN"));
    assert_eq!(summary.method_label, "UPI - Google Pay");
    assert_eq!(summary.amount, 13466);
    assert_eq!(summary.student_label, "Arjun Sharma (Grade 10-A)");
    assert_eq!(sink.count("upi_app_selected"), 1);

    flow.advance(secs(1));
    assert!(!flow.session().success_animation());
}

#[test]
fn initiate_payment_schedules_the_fixed_launch_delay() {
    let mut flow = PaymentFlow::new_with_scheduler(
        sample::student_profile(),
        FlowTimings::default(),
        Arc::new(MemoryAnalyticsSink::new()),
        RecordingScheduler::default(),
    );

    flow.initiate_payment(UpiApp::PhonePe);

    let tasks = flow.scheduler().flow_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(
        *tasks[0],
        (
            Duration::from_millis(3000),
            PaymentTask::BeginProcessing {
                app: UpiApp::PhonePe
            }
        )
    );
}

#[test]
fn repeated_initiation_is_not_guarded() {
    let (mut flow, _) = flow();
    flow.initiate_payment(UpiApp::GooglePay);
    flow.initiate_payment(UpiApp::GooglePay);
    flow.advance(secs(10));
    assert_eq!(flow.session().transactions().len(), 2);
}

#[test]
fn complete_payment_finishes_after_delay() {
    let (mut flow, sink) = flow();
    flow.select_method(PaymentMethod::Upi);
    flow.complete_payment();

    assert_eq!(
        flow.toasts().active()[0].message,
        "Payment completed successfully!"
    );
    let event = sink.last("payment_completed").expect("tracked");
    assert_eq!(event.payload["amount"], 13466);
    assert_eq!(event.payload["method"], "upi");
    assert_eq!(event.payload["studentId"], "AS2024001");

    flow.advance(Duration::from_millis(1999));
    assert_ne!(flow.session().phase(), PaymentPhase::Finished);
    flow.advance(Duration::from_millis(1));
    assert_eq!(flow.session().phase(), PaymentPhase::Finished);
}

#[test]
fn copying_the_upi_id_reports_success() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let (flow, sink) = flow();
    let mut flow = flow.with_clipboard(Box::new(FakeClipboard {
        written: written.clone(),
        fail: false,
    }));

    flow.copy_upi_id().expect("copied");

    assert_eq!(*written.lock(), vec!["school@paytm".to_string()]);
    assert_eq!(flow.toasts().count(Severity::Success), 1);
    assert_eq!(sink.count("upi_id_copied"), 1);
}

#[test]
fn clipboard_failure_surfaces_an_error_toast() {
    let (flow, sink) = flow();
    let mut flow = flow.with_clipboard(Box::new(FakeClipboard {
        written: Arc::new(Mutex::new(Vec::new())),
        fail: true,
    }));

    let err = flow.copy_upi_id().expect_err("clipboard denied");

    assert!(matches!(err, FlowError::Clipboard(_)));
    assert_eq!(flow.toasts().count(Severity::Error), 1);
    assert_eq!(flow.toasts().active()[0].message, "Failed to copy UPI ID");
    assert_eq!(sink.count("upi_id_copied"), 0);
}

#[test]
fn default_clipboard_is_missing() {
    let (mut flow, _) = flow();
    assert!(flow.copy_upi_id().is_err());
}

#[test]
fn swipes_map_onto_step_navigation() {
    let (mut flow, _) = flow();

    flow.touch_start(100.0, 200.0);
    assert_eq!(flow.touch_move(200.0, 210.0), Some(SwipeDirection::Forward));
    assert_eq!(flow.session().current_step(), Step::Review);
    assert_eq!(flow.toasts().count(Severity::Warning), 1);
    flow.touch_end();

    flow.select_method(PaymentMethod::Upi);
    flow.touch_start(100.0, 200.0);
    flow.touch_move(200.0, 200.0);
    assert_eq!(flow.session().current_step(), Step::Pay);

    flow.touch_start(300.0, 200.0);
    assert_eq!(flow.touch_move(280.0, 400.0), None);
    assert_eq!(flow.touch_move(200.0, 200.0), Some(SwipeDirection::Back));
    assert_eq!(flow.session().current_step(), Step::Review);
}

#[test]
fn swipes_past_the_ends_do_not_use_up_the_touch() {
    let (mut flow, sink) = flow();
    flow.select_method(PaymentMethod::Upi);

    flow.touch_start(300.0, 200.0);
    assert_eq!(flow.touch_move(200.0, 200.0), None);
    assert_eq!(flow.session().current_step(), Step::Review);
    assert!(flow.toasts().active().is_empty());
    assert_eq!(sink.count("payment_step_back"), 0);

    assert_eq!(flow.touch_move(400.0, 200.0), Some(SwipeDirection::Forward));
    assert_eq!(flow.session().current_step(), Step::Pay);
    flow.touch_end();

    flow.advance_step().expect("to confirmation");
    flow.touch_start(100.0, 200.0);
    assert_eq!(flow.touch_move(200.0, 200.0), None);
    assert_eq!(flow.touch_move(0.0, 200.0), Some(SwipeDirection::Back));
    assert_eq!(flow.session().current_step(), Step::Pay);
}

#[test]
fn go_back_on_first_step_only_notifies() {
    let (mut flow, sink) = flow();
    flow.go_back();

    assert_eq!(flow.session().current_step(), Step::Review);
    assert_eq!(flow.toasts().active()[0].message, "Navigating back...");
    assert_eq!(
        sink.last("back_button_clicked").expect("tracked").payload["step"],
        1
    );

    flow.select_method(PaymentMethod::Upi);
    flow.advance_step().expect("to pay");
    flow.go_back();
    assert_eq!(flow.session().current_step(), Step::Review);
}

#[test]
fn method_modal_opens_and_closes_on_choice() {
    let (mut flow, sink) = flow();
    flow.change_payment_method();
    assert_eq!(flow.session().open_modal(), Some(ParentModal::PaymentMethod));

    flow.choose_method_from_modal(PaymentMethod::Card);
    assert_eq!(flow.session().open_modal(), None);
    assert_eq!(flow.session().selected_method(), Some(PaymentMethod::Card));
    assert_eq!(sink.count("payment_method_changed"), 1);
}

#[test]
fn escape_and_backdrop_close_modals() {
    let (mut flow, _) = flow();
    flow.show_help();
    flow.close_modal(ParentModal::PaymentMethod);
    assert_eq!(flow.session().open_modal(), Some(ParentModal::Help));

    flow.close_all_modals();
    assert_eq!(flow.session().open_modal(), None);
}

#[test]
fn upi_id_section_and_bottom_nav() {
    let (mut flow, sink) = flow();
    flow.show_upi_id();
    flow.set_active_nav(NavItem::History);

    assert!(flow.session().upi_id_visible());
    assert_eq!(flow.session().active_nav(), NavItem::History);
    assert_eq!(
        sink.last("bottom_nav_clicked").expect("tracked").payload["item"],
        "History"
    );
}

#[test]
fn notifications_fade_out_on_the_parent_schedule() {
    let (mut flow, _) = flow();
    flow.go_back();

    flow.advance(Duration::from_millis(100));
    assert_eq!(flow.toasts().active()[0].phase, ToastPhase::Visible);
    flow.advance(Duration::from_millis(2900));
    assert_eq!(flow.toasts().active()[0].phase, ToastPhase::Leaving);
    flow.advance(Duration::from_millis(300));
    assert!(flow.toasts().active().is_empty());
}

#[test]
fn method_selection_and_primary_actions_pulse_haptics() {
    let pulses = Arc::new(Mutex::new(Vec::new()));
    let (flow, _) = flow();
    let mut flow = flow.with_haptics(Box::new(CountingHaptics(pulses.clone())));

    flow.select_method(PaymentMethod::Upi);
    flow.advance_step().expect("to pay");

    assert_eq!(*pulses.lock(), vec![Duration::from_millis(50); 2]);
}

#[test]
fn rejected_advance_still_pulses() {
    let pulses = Arc::new(Mutex::new(Vec::new()));
    let (flow, _) = flow();
    let mut flow = flow.with_haptics(Box::new(CountingHaptics(pulses.clone())));

    assert!(flow.advance_step().is_err());

    assert_eq!(flow.session().current_step(), Step::Review);
    assert_eq!(*pulses.lock(), vec![Duration::from_millis(50)]);
}

#[test]
fn sessions_are_independent() {
    let (mut first, _) = flow();
    let (second, _) = flow();

    first.select_method(PaymentMethod::Upi);
    first.advance_step().expect("to pay");

    assert_ne!(first.session().id(), second.session().id());
    assert_eq!(second.session().current_step(), Step::Review);
    assert_eq!(second.session().selected_method(), None);
}

#[test]
fn step_changes_are_published() {
    let (mut flow, _) = flow();
    let mut rx = flow.subscribe_events();
    flow.select_method(PaymentMethod::Upi);
    flow.advance_step().expect("to pay");

    let mut steps = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let UiEvent::StepChanged { from, to } = event {
            steps.push((from, to));
        }
    }
    assert_eq!(steps, vec![(Step::Review, Step::Pay)]);
    assert_eq!(flow.progress().lines, [true, false]);
}
