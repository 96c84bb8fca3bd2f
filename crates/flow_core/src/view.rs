//! Pure projections from session state to what the parent screens display.

use shared::{
    domain::{PaymentMethod, ProgressState, Step},
    format::{format_inr, initials},
    protocol::StudentProfile,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentHeader {
    pub initials: String,
    pub name: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeRow {
    pub name: String,
    pub period: String,
    pub amount: String,
    pub late: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCard {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressIndicator {
    pub steps: [ProgressState; 3],
    /// Connector lines between steps; a line is lit once the step before it
    /// is completed.
    pub lines: [bool; 2],
}

pub fn student_header(profile: &StudentProfile) -> StudentHeader {
    StudentHeader {
        initials: initials(&profile.student_name),
        name: profile.student_name.clone(),
        details: format!("{} • Student ID: {}", profile.grade, profile.student_id),
    }
}

pub fn fee_rows(profile: &StudentProfile) -> Vec<FeeRow> {
    profile
        .fees
        .iter()
        .map(|fee| FeeRow {
            name: fee.name.clone(),
            period: fee.period.clone(),
            amount: format_inr(fee.amount),
            late: fee.is_late_fee(),
        })
        .collect()
}

pub fn total_label(profile: &StudentProfile) -> String {
    format_inr(profile.total_amount)
}

pub fn method_card(method: PaymentMethod) -> MethodCard {
    MethodCard {
        icon: method.icon(),
        title: method.label(),
        description: method.description(),
    }
}

pub fn progress_indicator(current: Step) -> ProgressIndicator {
    let steps = Step::ALL.map(|step| {
        if step < current {
            ProgressState::Completed
        } else if step == current {
            ProgressState::Active
        } else {
            ProgressState::Pending
        }
    });
    let lines = [1u8, 2].map(|line| line < current.number());
    ProgressIndicator { steps, lines }
}
