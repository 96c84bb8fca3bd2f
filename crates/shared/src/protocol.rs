use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{
        ActivityKind, AdminModal, DashboardTab, NavItem, ParentModal, PaymentMethod,
        SelectAllState, SessionId, Severity, Step, StudentId, ToastId, TransactionId, UpiApp,
    },
    error::FlowFailure,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeItem {
    pub name: String,
    pub period: String,
    pub amount: u64,
}

impl FeeItem {
    pub fn is_late_fee(&self) -> bool {
        self.name == "Late Fee"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub total_amount: u64,
    pub fees: Vec<FeeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaulterRow {
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub parent_name: String,
    pub amount_due: u64,
    pub days_overdue: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub transaction_id: TransactionId,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_app: Option<UpiApp>,
    pub method_label: String,
    pub amount: u64,
    pub paid_at: DateTime<Utc>,
    pub student_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub time: String,
}

impl Activity {
    pub fn new(
        kind: ActivityKind,
        title: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            time: time.into(),
        }
    }
}

/// One analytics record: an event name plus a flat attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    pub session_id: SessionId,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastPhase {
    Entering,
    Visible,
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub phase: ToastPhase,
}

/// Where the parent-side payment currently is, independent of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPhase {
    #[default]
    Idle,
    LaunchingApp,
    Processing,
    Succeeded,
    Confirmed,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowReminderState {
    #[default]
    Idle,
    Sending,
    Sent,
}

/// Everything a renderer needs to keep its view in sync with a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UiEvent {
    StepChanged {
        from: Step,
        to: Step,
    },
    MethodSelected {
        method: PaymentMethod,
    },
    ModalToggled {
        modal: ModalRef,
        open: bool,
    },
    NavChanged {
        item: NavItem,
    },
    UpiIdRevealed,
    PaymentPhaseChanged {
        phase: PaymentPhase,
    },
    SuccessAnimation {
        active: bool,
    },
    TransactionRecorded {
        summary: TransactionSummary,
    },
    TabActivated {
        tab: DashboardTab,
    },
    TabLoading {
        tab: DashboardTab,
        loading: bool,
    },
    SelectionChanged {
        selected: usize,
        total: usize,
        select_all: SelectAllState,
    },
    RowReminderChanged {
        student_id: StudentId,
        state: RowReminderState,
    },
    ReminderSending {
        recipients: usize,
    },
    ActivityAdded {
        activity: Activity,
    },
    ActivityReloaded {
        entries: Vec<Activity>,
    },
    MetricsRefreshed,
    SuccessToast {
        active: bool,
    },
    ToastChanged {
        toast: Toast,
    },
    ToastRemoved {
        id: ToastId,
    },
    Failed(FlowFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "modal", rename_all = "snake_case")]
pub enum ModalRef {
    Parent(ParentModal),
    Admin(AdminModal),
}
