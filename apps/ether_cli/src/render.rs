use shared::{
    format::{format_inr, format_paid_at},
    protocol::{ModalRef, ToastPhase, UiEvent},
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

/// Prints every event until the controller (and its sender) is dropped.
pub async fn print_events(mut rx: broadcast::Receiver<UiEvent>, output: Output) {
    loop {
        match rx.recv().await {
            Ok(event) => match output {
                Output::Json => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!(error = %err, "failed to encode event"),
                },
                Output::Text => {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                }
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "event renderer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// One human-readable line per event; toast phase changes other than the
/// first appearance are not worth a line.
pub fn describe(event: &UiEvent) -> Option<String> {
    let line = match event {
        UiEvent::StepChanged { from, to } => {
            format!("step {} -> {}", from.number(), to.number())
        }
        UiEvent::MethodSelected { method } => format!("method: {}", method.label()),
        UiEvent::ModalToggled { modal, open } => {
            let name = match modal {
                ModalRef::Parent(modal) => format!("{modal:?}"),
                ModalRef::Admin(modal) => format!("{modal:?}"),
            };
            format!("modal {name} {}", if *open { "opened" } else { "closed" })
        }
        UiEvent::NavChanged { item } => format!("nav: {}", item.label()),
        UiEvent::UpiIdRevealed => "UPI ID shown".to_string(),
        UiEvent::PaymentPhaseChanged { phase } => format!("payment: {phase:?}"),
        UiEvent::SuccessAnimation { active } => {
            if *active {
                "success animation".to_string()
            } else {
                return None;
            }
        }
        UiEvent::TransactionRecorded { summary } => format!(
            "paid {} via {} | {} | {} | {}",
            format_inr(summary.amount),
            summary.method_label,
            summary.transaction_id,
            format_paid_at(summary.paid_at),
            summary.student_label,
        ),
        UiEvent::TabActivated { tab } => format!("tab: {tab}"),
        UiEvent::TabLoading { tab, loading } => {
            format!("{tab} {}", if *loading { "loading..." } else { "loaded" })
        }
        UiEvent::SelectionChanged {
            selected,
            total,
            select_all,
        } => format!("selected {selected}/{total} ({select_all:?})"),
        UiEvent::RowReminderChanged { student_id, state } => {
            format!("reminder {student_id}: {state:?}")
        }
        UiEvent::ReminderSending { recipients } => {
            format!("sending reminders to {recipients} recipients...")
        }
        UiEvent::ActivityAdded { activity } => format!(
            "[{}] {}: {} ({})",
            activity.kind.icon(),
            activity.title,
            activity.description,
            activity.time
        ),
        UiEvent::ActivityReloaded { entries } => {
            format!("recent activity: {} entries", entries.len())
        }
        UiEvent::MetricsRefreshed => "metrics refreshed".to_string(),
        UiEvent::SuccessToast { active } => {
            if *active {
                "Reminders sent successfully".to_string()
            } else {
                return None;
            }
        }
        UiEvent::ToastChanged { toast } => {
            if toast.phase != ToastPhase::Entering {
                return None;
            }
            format!("[{}] {}", toast.severity.icon(), toast.message)
        }
        UiEvent::ToastRemoved { .. } => return None,
        UiEvent::Failed(failure) => format!("error: {}", failure.message),
    };
    Some(line)
}
