use chrono::{DateTime, Duration, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `now - days`, or `None` when the result leaves chrono's range.
pub fn days_before(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|d| now.checked_sub_signed(d))
}
