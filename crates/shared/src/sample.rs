//! Static sample data standing in for the school's backend.

use crate::{
    domain::{ActivityKind, StudentId},
    protocol::{Activity, DefaulterRow, FeeItem, StudentProfile},
};

pub const SCHOOL_UPI_ID: &str = "school@paytm";

pub fn student_profile() -> StudentProfile {
    let fees = vec![
        fee("Tuition Fee", "April 2024", 8500),
        fee("Library Fee", "Annual", 2000),
        fee("Sports Fee", "Quarterly", 1500),
        fee("Transport Fee", "Monthly", 1200),
        fee("Late Fee", "Overdue 15 days", 266),
    ];

    StudentProfile {
        student_id: StudentId::from("AS2024001"),
        student_name: "Arjun Sharma".into(),
        grade: "Grade 10-A".into(),
        total_amount: 13466,
        fees,
    }
}

fn fee(name: &str, period: &str, amount: u64) -> FeeItem {
    FeeItem {
        name: name.into(),
        period: period.into(),
        amount,
    }
}

pub fn defaulters() -> Vec<DefaulterRow> {
    vec![
        defaulter("student1", "Rahul Verma", "Grade 10-A", "Suresh Verma", 15000, 45),
        defaulter("student2", "Priya Sharma", "Grade 8-B", "Anil Sharma", 8200, 30),
        defaulter("student3", "Karan Mehta", "Grade 9-C", "Neha Mehta", 12500, 21),
        defaulter("student4", "Sneha Iyer", "Grade 7-A", "Lakshmi Iyer", 6400, 12),
    ]
}

fn defaulter(
    id: &str,
    name: &str,
    grade: &str,
    parent: &str,
    amount_due: u64,
    days_overdue: u32,
) -> DefaulterRow {
    DefaulterRow {
        student_id: StudentId::from(id),
        student_name: name.into(),
        grade: grade.into(),
        parent_name: parent.into(),
        amount_due,
        days_overdue,
    }
}

/// Recent activity shown whenever the dashboard tab finishes loading.
pub fn recent_activity() -> Vec<Activity> {
    vec![
        Activity::new(
            ActivityKind::Success,
            "Payment Received",
            "₹12,500 from Rajesh Kumar (Grade 10-A)",
            "2 minutes ago",
        ),
        Activity::new(
            ActivityKind::Warning,
            "Reminder Sent",
            "Fee reminder sent to 15 parents",
            "1 hour ago",
        ),
        Activity::new(
            ActivityKind::Error,
            "Payment Failed",
            "₹8,200 payment failed for Priya Sharma (Grade 8-B)",
            "3 hours ago",
        ),
        Activity::new(
            ActivityKind::Info,
            "New Student Enrolled",
            "Amit Patel enrolled in Grade 9-A",
            "5 hours ago",
        ),
    ]
}
