use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Countdown label shown next to a running attempt, `MM:SS`. Limits above
/// an hour keep counting minutes rather than rolling into hours.
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn export_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d-%H%M%S").to_string()
}
