pub mod activity;
pub mod analytics;
pub mod capabilities;
pub mod dashboard;
pub mod error;
pub mod notify;
pub mod payment;
pub mod scheduler;
pub mod selection;
pub mod settings;
pub mod swipe;
pub mod view;

pub use analytics::{AnalyticsSink, MemoryAnalyticsSink, TracingAnalyticsSink};
pub use capabilities::{Clipboard, Haptics};
pub use dashboard::{DashboardController, DashboardSession, DashboardTask, ReminderForm};
pub use error::{CapabilityError, FlowError};
pub use payment::{PaymentFlow, PaymentSession, PaymentTask};
pub use scheduler::{drive_for, Pace, Scheduler, TimerDriven, TimerQueue};
pub use settings::FlowTimings;
