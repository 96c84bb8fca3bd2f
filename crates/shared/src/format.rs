//! Display helpers shared by every renderer.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::domain::TransactionId;

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Formats rupees with Indian digit grouping, e.g. `₹1,00,000`.
pub fn format_inr(amount: u64) -> String {
    format!("₹{}", group_indian(amount))
}

fn group_indian(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), last_three)
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
}

/// Renders a payment timestamp the way the confirmation screen shows it:
/// `16 Oct 2026, 03:42 pm` in Indian Standard Time.
pub fn format_paid_at(at: DateTime<Utc>) -> String {
    let ist = FixedOffset::east_opt(IST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&ist)
        .format("%d %b %Y, %I:%M %P")
        .to_string()
}

/// `TXN` + unix milliseconds + a numeric suffix below 10000.
///
/// Not unique in any cryptographic sense; collisions need two payments in the
/// same millisecond drawing the same suffix.
pub fn transaction_id(at: DateTime<Utc>, suffix: u16) -> TransactionId {
    TransactionId(format!("TXN{}{}", at.timestamp_millis(), suffix % 10_000))
}
