// In crates/engine/src/scheduler.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, TimeZone};
use std::time::Duration;

/// Parses a wall-clock time such as `"12:30"`.
pub fn parse_daily_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("invalid daily time {:?}, expected HH:MM", value))
}

/// Time left until the next `at`, strictly after `now`.
///
/// Days where `at` does not exist locally (DST gaps) are skipped.
pub fn until_next<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Duration {
    let tz = now.timezone();
    let today = now.date_naive();
    for offset in 0..3 {
        let day = today + ChronoDuration::days(offset);
        let Some(candidate) = tz.from_local_datetime(&day.and_time(at)).earliest() else {
            continue;
        };
        if candidate > *now {
            return (candidate - now.clone()).to_std().unwrap_or_default();
        }
    }
    Duration::from_secs(24 * 60 * 60)
}

/// [`until_next`] in the machine's local timezone.
pub fn until_next_local(at: NaiveTime) -> Duration {
    until_next(&Local::now(), at)
}
