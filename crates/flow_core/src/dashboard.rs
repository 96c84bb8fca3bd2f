//! Admin dashboard: tabbed analytics, the defaulter table with its selection,
//! reminder sending and the recent-activity feed.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use serde_json::json;
use shared::{
    domain::{ActivityKind, AdminModal, DashboardTab, SessionId, Severity, StudentId},
    error::FlowFailure,
    protocol::{Activity, DefaulterRow, ModalRef, RowReminderState, UiEvent},
    sample,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    activity::ActivityLog,
    analytics::{AnalyticsSink, Tracker},
    error::FlowError,
    notify::{ToastTask, ToastTiming, ToastTray},
    scheduler::{Scheduler, TimerDriven, TimerQueue},
    selection::{BulkAction, StudentSelection},
    settings::{ms, FlowTimings},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardTask {
    Toast(ToastTask),
    TabLoaded(DashboardTab),
    RemindersDelivered { count: usize },
    RowReminderDelivered(StudentId),
    RowReminderReset(StudentId),
    HideSuccessToast,
    RealtimeTick,
}

impl From<ToastTask> for DashboardTask {
    fn from(value: ToastTask) -> Self {
        Self::Toast(value)
    }
}

/// Contents of the reminder modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderForm {
    pub recipients: Vec<StudentId>,
    pub message: String,
    pub sending: bool,
}

#[derive(Debug, Clone)]
pub struct DashboardSession {
    id: SessionId,
    current_tab: DashboardTab,
    rows: Vec<DefaulterRow>,
    selection: StudentSelection,
    open_modal: Option<AdminModal>,
    reminder_form: ReminderForm,
    activity: ActivityLog,
    loading: HashMap<DashboardTab, usize>,
    row_reminders: BTreeMap<StudentId, RowReminderState>,
    success_toast_visible: bool,
}

impl DashboardSession {
    pub fn new(rows: Vec<DefaulterRow>) -> Self {
        let selection = StudentSelection::new(rows.iter().map(|row| row.student_id.clone()));
        Self {
            id: SessionId::new(),
            current_tab: DashboardTab::Dashboard,
            rows,
            selection,
            open_modal: None,
            reminder_form: ReminderForm::default(),
            activity: ActivityLog::new(),
            loading: HashMap::new(),
            row_reminders: BTreeMap::new(),
            success_toast_visible: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn current_tab(&self) -> DashboardTab {
        self.current_tab
    }

    pub fn rows(&self) -> &[DefaulterRow] {
        &self.rows
    }

    pub fn selection(&self) -> &StudentSelection {
        &self.selection
    }

    pub fn open_modal(&self) -> Option<AdminModal> {
        self.open_modal
    }

    pub fn is_modal_open(&self) -> bool {
        self.open_modal.is_some()
    }

    pub fn reminder_form(&self) -> &ReminderForm {
        &self.reminder_form
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn is_loading(&self, tab: DashboardTab) -> bool {
        self.loading.get(&tab).is_some_and(|in_flight| *in_flight > 0)
    }

    pub fn row_reminder(&self, id: &StudentId) -> RowReminderState {
        self.row_reminders.get(id).copied().unwrap_or_default()
    }

    pub fn success_toast_visible(&self) -> bool {
        self.success_toast_visible
    }
}

pub struct DashboardController<S = TimerQueue<DashboardTask>> {
    session: DashboardSession,
    scheduler: S,
    toasts: ToastTray,
    timings: FlowTimings,
    tracker: Tracker,
    realtime_started: bool,
    events: broadcast::Sender<UiEvent>,
}

impl DashboardController<TimerQueue<DashboardTask>> {
    pub fn new(
        rows: Vec<DefaulterRow>,
        timings: FlowTimings,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self::new_with_scheduler(rows, timings, analytics, TimerQueue::new())
    }
}

impl<S> DashboardController<S>
where
    S: Scheduler<DashboardTask>,
{
    pub fn new_with_scheduler(
        rows: Vec<DefaulterRow>,
        timings: FlowTimings,
        analytics: Arc<dyn AnalyticsSink>,
        scheduler: S,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session = DashboardSession::new(rows);
        let toast_timing = ToastTiming {
            fade_in: ms(timings.toast_fade_in_ms),
            display: ms(timings.admin_toast_ms),
            fade_out: ms(timings.toast_fade_out_ms),
        };

        Self {
            tracker: Tracker::new(session.id(), analytics),
            toasts: ToastTray::new(toast_timing, events.clone()),
            session,
            scheduler,
            timings,
            realtime_started: false,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    pub fn toasts(&self) -> &ToastTray {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastTray {
        &mut self.toasts
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Opens the dashboard tab, kicking off its first load.
    pub fn initialize(&mut self) {
        self.switch_tab(DashboardTab::Dashboard);
        info!(session = %self.session.id.0, "admin dashboard initialized");
    }

    /// Activates `tab` and starts its simulated load. Loads are never cached;
    /// switching back to a tab loads it again.
    pub fn switch_tab(&mut self, tab: DashboardTab) {
        self.session.current_tab = tab;
        let _ = self.events.send(UiEvent::TabActivated { tab });
        debug!(tab = tab.key(), "tab switched");

        *self.session.loading.entry(tab).or_default() += 1;
        let _ = self.events.send(UiEvent::TabLoading { tab, loading: true });

        let delay = self.load_delay(tab);
        if delay.is_zero() {
            self.finish_load(tab);
        } else {
            self.scheduler.schedule(delay, DashboardTask::TabLoaded(tab));
        }
        self.tracker.track("tab_switched", json!({ "tab": tab.key() }));
    }

    pub fn show_defaulters(&mut self) {
        self.switch_tab(DashboardTab::Defaulters);
    }

    /// Starts the 30 second refresh tick. Calling it again has no effect.
    pub fn start_realtime_updates(&mut self) {
        if self.realtime_started {
            return;
        }
        self.realtime_started = true;
        self.scheduler
            .schedule(self.realtime_interval(), DashboardTask::RealtimeTick);
    }

    pub fn toggle_select_all(&mut self, checked: bool) {
        self.session.selection.set_all(checked);
        self.publish_selection();
    }

    /// Updates one row checkbox. Unknown students are ignored and reported
    /// as `false`.
    pub fn toggle_student(&mut self, id: &StudentId, checked: bool) -> bool {
        if !self.session.selection.set(id, checked) {
            warn!(student = %id, "selection change for unknown student ignored");
            return false;
        }
        self.publish_selection();
        true
    }

    pub fn bulk_action(&self) -> BulkAction {
        self.session.selection.bulk_action()
    }

    /// Opens the reminder modal pre-filled with `recipients`.
    pub fn open_reminder_flow(&mut self, recipients: impl IntoIterator<Item = StudentId>) {
        self.session.reminder_form.recipients = recipients.into_iter().collect();
        debug!(
            recipients = self.session.reminder_form.recipients.len(),
            "reminder form populated"
        );
        self.open_reminder_modal();
    }

    pub fn open_reminder_modal(&mut self) {
        self.session.open_modal = Some(AdminModal::Reminder);
        let _ = self.events.send(UiEvent::ModalToggled {
            modal: ModalRef::Admin(AdminModal::Reminder),
            open: true,
        });
        self.tracker.track("reminder_modal_opened", json!({}));
    }

    /// Closes the reminder modal and resets its form.
    pub fn close_reminder_modal(&mut self) {
        self.session.reminder_form = ReminderForm::default();
        if self.session.open_modal.take().is_some() {
            let _ = self.events.send(UiEvent::ModalToggled {
                modal: ModalRef::Admin(AdminModal::Reminder),
                open: false,
            });
        }
    }

    pub fn close_modal(&mut self, modal: AdminModal) {
        if self.session.open_modal == Some(modal) {
            match modal {
                AdminModal::Reminder => self.close_reminder_modal(),
            }
        }
    }

    pub fn close_all_modals(&mut self) {
        if let Some(modal) = self.session.open_modal {
            self.close_modal(modal);
        }
    }

    /// Escape key: only acts while a modal is showing.
    pub fn on_escape(&mut self) -> bool {
        if !self.session.is_modal_open() {
            return false;
        }
        self.close_all_modals();
        true
    }

    pub fn set_form_recipient(&mut self, id: StudentId, checked: bool) {
        let recipients = &mut self.session.reminder_form.recipients;
        let present = recipients.contains(&id);
        if checked && !present {
            recipients.push(id);
        } else if !checked && present {
            recipients.retain(|existing| existing != &id);
        }
    }

    pub fn set_reminder_message(&mut self, message: impl Into<String>) {
        self.session.reminder_form.message = message.into();
    }

    pub fn submit_reminder_form(&mut self) -> Result<(), FlowError> {
        let recipients = self.session.reminder_form.recipients.clone();
        self.send_reminders(&recipients)
    }

    /// Sends a reminder to every recipient after the simulated network delay.
    /// An empty recipient list is rejected before anything is scheduled.
    pub fn send_reminders(&mut self, recipients: &[StudentId]) -> Result<(), FlowError> {
        if recipients.is_empty() {
            return Err(self.reject(FlowError::validation(
                "Please select at least one recipient",
            )));
        }

        let count = recipients.len();
        self.session.reminder_form.sending = true;
        let _ = self
            .events
            .send(UiEvent::ReminderSending { recipients: count });
        debug!(count, "sending reminders");
        self.scheduler.schedule(
            ms(self.timings.reminder_send_ms),
            DashboardTask::RemindersDelivered { count },
        );
        Ok(())
    }

    /// Bulk entry point above the defaulter table.
    pub fn send_bulk_reminders(&mut self) -> Result<(), FlowError> {
        if self.session.selection.is_empty() {
            return Err(self.reject(FlowError::validation(
                "Please select students to send reminders",
            )));
        }
        let selected = self.session.selection.selected();
        self.open_reminder_flow(selected);
        Ok(())
    }

    /// Per-row reminder button. A row that is already sending or showing
    /// "Sent" keeps its state.
    pub fn send_reminder(&mut self, id: &StudentId) -> Result<RowReminderState, FlowError> {
        if !self.session.rows.iter().any(|row| &row.student_id == id) {
            return Err(self.reject(FlowError::validation(format!("Unknown student: {id}"))));
        }
        let state = self.session.row_reminder(id);
        if state != RowReminderState::Idle {
            return Ok(state);
        }

        self.set_row_reminder(id.clone(), RowReminderState::Sending);
        self.scheduler.schedule(
            ms(self.timings.row_reminder_ms),
            DashboardTask::RowReminderDelivered(id.clone()),
        );
        Ok(RowReminderState::Sending)
    }

    pub fn view_details(&mut self, id: &StudentId) {
        self.notify(format!("Viewing details for student: {id}"), Severity::Info);
    }

    fn handle_task(&mut self, task: DashboardTask) {
        match task {
            DashboardTask::Toast(task) => self.toasts.handle(&mut self.scheduler, task),
            DashboardTask::TabLoaded(tab) => self.finish_load(tab),
            DashboardTask::RemindersDelivered { count } => self.deliver_reminders(count),
            DashboardTask::RowReminderDelivered(id) => {
                self.set_row_reminder(id.clone(), RowReminderState::Sent);
                self.scheduler.schedule(
                    ms(self.timings.row_reminder_reset_ms),
                    DashboardTask::RowReminderReset(id),
                );
                self.notify("Reminder sent successfully", Severity::Success);
            }
            DashboardTask::RowReminderReset(id) => {
                self.set_row_reminder(id, RowReminderState::Idle);
            }
            DashboardTask::HideSuccessToast => self.set_success_toast(false),
            DashboardTask::RealtimeTick => {
                if self.session.current_tab == DashboardTab::Dashboard {
                    debug!("real-time metrics refresh");
                    let _ = self.events.send(UiEvent::MetricsRefreshed);
                }
                self.scheduler
                    .schedule(self.realtime_interval(), DashboardTask::RealtimeTick);
            }
        }
    }

    fn deliver_reminders(&mut self, count: usize) {
        self.close_reminder_modal();
        self.set_success_toast(true);
        self.scheduler.schedule(
            ms(self.timings.success_toast_ms),
            DashboardTask::HideSuccessToast,
        );
        self.add_activity(Activity::new(
            ActivityKind::Success,
            "Reminders Sent",
            format!("{count} reminders sent successfully"),
            "Just now",
        ));
        self.tracker.track("reminders_sent", json!({ "count": count }));
        info!(count, "reminders delivered");
    }

    fn finish_load(&mut self, tab: DashboardTab) {
        if tab == DashboardTab::Dashboard {
            self.session.activity.replace(sample::recent_activity());
            let _ = self.events.send(UiEvent::ActivityReloaded {
                entries: self.session.activity.to_vec(),
            });
            let _ = self.events.send(UiEvent::MetricsRefreshed);
        }

        if let Some(in_flight) = self.session.loading.get_mut(&tab) {
            *in_flight = in_flight.saturating_sub(1);
            if *in_flight == 0 {
                self.session.loading.remove(&tab);
                let _ = self.events.send(UiEvent::TabLoading { tab, loading: false });
            }
        }
        debug!(tab = tab.key(), "tab loaded");
    }

    fn load_delay(&self, tab: DashboardTab) -> Duration {
        let delay = match tab {
            DashboardTab::Dashboard => self.timings.dashboard_load_ms,
            DashboardTab::Defaulters => self.timings.defaulters_load_ms,
            DashboardTab::Parents => self.timings.parents_load_ms,
            DashboardTab::Settings => self.timings.settings_load_ms,
        };
        ms(delay)
    }

    /// A zero interval would reschedule the tick at the current instant forever.
    fn realtime_interval(&self) -> Duration {
        ms(self.timings.realtime_refresh_ms.max(1))
    }

    fn add_activity(&mut self, activity: Activity) {
        if let Some(evicted) = self.session.activity.push(activity.clone()) {
            debug!(title = %evicted.title, "activity evicted");
        }
        let _ = self.events.send(UiEvent::ActivityAdded { activity });
    }

    fn publish_selection(&mut self) {
        let selection = &self.session.selection;
        let _ = self.events.send(UiEvent::SelectionChanged {
            selected: selection.len(),
            total: selection.total(),
            select_all: selection.select_all_state(),
        });
    }

    fn set_row_reminder(&mut self, id: StudentId, state: RowReminderState) {
        if state == RowReminderState::Idle {
            self.session.row_reminders.remove(&id);
        } else {
            self.session.row_reminders.insert(id.clone(), state);
        }
        let _ = self.events.send(UiEvent::RowReminderChanged {
            student_id: id,
            state,
        });
    }

    fn set_success_toast(&mut self, active: bool) {
        self.session.success_toast_visible = active;
        let _ = self.events.send(UiEvent::SuccessToast { active });
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.toasts.notify(&mut self.scheduler, message, severity);
    }

    fn reject(&mut self, err: FlowError) -> FlowError {
        warn!(error = %err, "dashboard action rejected");
        self.notify(err.message().to_string(), err.severity());
        let _ = self.events.send(UiEvent::Failed(FlowFailure::from(&err)));
        err
    }
}

impl<S> TimerDriven for DashboardController<S>
where
    S: Scheduler<DashboardTask>,
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
#[path = "tests/dashboard_tests.rs"]
mod tests;
