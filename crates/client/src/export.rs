//! CSV export for the admin dashboards.

use std::fmt::Write;

use bread_core::{Lead, StrategyCallBooking};

const LEADS_HEADER: &str = "Email,Phone,Username,Created At";
const BOOKINGS_HEADER: &str =
    "Name,Email,Phone,Company,Preferred Date,Time Slot,Timezone,Status,Notes,Created At";

/// Leads as CSV, one row per lead after a header line.
#[must_use]
pub fn leads_csv(leads: &[Lead]) -> String {
    let mut csv = format!("{LEADS_HEADER}\n");
    for lead in leads {
        let _ = writeln!(
            csv,
            "{},{},{},{}",
            field(lead.email.as_str()),
            field(lead.phone.as_deref().unwrap_or_default()),
            field(lead.username.as_deref().unwrap_or_default()),
            lead.created_at.to_rfc3339(),
        );
    }
    csv
}

/// Bookings as CSV, one row per booking after a header line.
#[must_use]
pub fn bookings_csv(bookings: &[StrategyCallBooking]) -> String {
    let mut csv = format!("{BOOKINGS_HEADER}\n");
    for booking in bookings {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{}",
            field(&booking.name),
            field(booking.email.as_str()),
            field(booking.phone.as_deref().unwrap_or_default()),
            field(booking.company.as_deref().unwrap_or_default()),
            booking.preferred_date.format("%Y-%m-%d"),
            field(&booking.time_slot),
            field(&booking.timezone),
            booking.status,
            field(booking.notes.as_deref().unwrap_or_default()),
            booking.created_at.to_rfc3339(),
        );
    }
    csv
}

/// Quote a field if it contains a comma, quote or line break.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
