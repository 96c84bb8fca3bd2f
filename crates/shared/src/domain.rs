use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ParseError;

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id_newtype!(StudentId);
string_id_newtype!(TransactionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(pub u64);

/// Position in the three-step parent payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Review,
    Pay,
    Confirmation,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Review, Step::Pay, Step::Confirmation];

    pub fn number(self) -> u8 {
        match self {
            Step::Review => 1,
            Step::Pay => 2,
            Step::Confirmation => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Step::Review),
            2 => Some(Step::Pay),
            3 => Some(Step::Confirmation),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    Card,
    NetBanking,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Upi,
        PaymentMethod::Card,
        PaymentMethod::NetBanking,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::NetBanking => "netbanking",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI Payment",
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::NetBanking => "Net Banking",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "Pay using UPI apps",
            PaymentMethod::Card => "Visa, Mastercard, RuPay",
            PaymentMethod::NetBanking => "Direct bank transfer",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "lucide-smartphone",
            PaymentMethod::Card => "lucide-credit-card",
            PaymentMethod::NetBanking => "lucide-building-2",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            "netbanking" | "net_banking" => Ok(PaymentMethod::NetBanking),
            _ => Err(ParseError::unknown("payment method", s)),
        }
    }
}

/// UPI app the parent hands the payment off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpiApp {
    GooglePay,
    PhonePe,
    Paytm,
    Bhim,
}

impl UpiApp {
    pub fn key(self) -> &'static str {
        match self {
            UpiApp::GooglePay => "gpay",
            UpiApp::PhonePe => "phonepe",
            UpiApp::Paytm => "paytm",
            UpiApp::Bhim => "bhim",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UpiApp::GooglePay => "Google Pay",
            UpiApp::PhonePe => "PhonePe",
            UpiApp::Paytm => "Paytm",
            UpiApp::Bhim => "BHIM",
        }
    }
}

impl fmt::Display for UpiApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UpiApp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpay" | "googlepay" | "google_pay" => Ok(UpiApp::GooglePay),
            "phonepe" => Ok(UpiApp::PhonePe),
            "paytm" => Ok(UpiApp::Paytm),
            "bhim" => Ok(UpiApp::Bhim),
            _ => Err(ParseError::unknown("upi app", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "check-circle",
            Severity::Warning => "alert-triangle",
            Severity::Error => "x-circle",
            Severity::Info => "info",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Success,
    Warning,
    Error,
    Info,
}

impl ActivityKind {
    pub fn icon(self) -> &'static str {
        match self {
            ActivityKind::Success => "check-circle",
            ActivityKind::Warning => "clock",
            ActivityKind::Error => "alert-triangle",
            ActivityKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    Dashboard,
    Defaulters,
    Parents,
    Settings,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 4] = [
        DashboardTab::Dashboard,
        DashboardTab::Defaulters,
        DashboardTab::Parents,
        DashboardTab::Settings,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DashboardTab::Dashboard => "dashboard",
            DashboardTab::Defaulters => "defaulters",
            DashboardTab::Parents => "parents",
            DashboardTab::Settings => "settings",
        }
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DashboardTab {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(DashboardTab::Dashboard),
            "defaulters" => Ok(DashboardTab::Defaulters),
            "parents" => Ok(DashboardTab::Parents),
            "settings" => Ok(DashboardTab::Settings),
            _ => Err(ParseError::unknown("dashboard tab", s)),
        }
    }
}

/// Bottom navigation entries of the parent app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NavItem {
    Home,
    #[default]
    Payments,
    History,
    Profile,
}

impl NavItem {
    pub fn label(self) -> &'static str {
        match self {
            NavItem::Home => "Home",
            NavItem::Payments => "Payments",
            NavItem::History => "History",
            NavItem::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentModal {
    PaymentMethod,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminModal {
    Reminder,
}

/// Tri-state of the "select all" checkbox above the defaulter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectAllState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl SelectAllState {
    pub fn from_counts(selected: usize, total: usize) -> Self {
        if selected == 0 {
            SelectAllState::Unchecked
        } else if selected < total {
            SelectAllState::Indeterminate
        } else {
            SelectAllState::Checked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    Completed,
    Active,
    Pending,
}
