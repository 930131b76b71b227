//! Natural-language rendering of elapsed time ("a month", "1 year, 7 months")

use chrono::TimeDelta;

/// Describe an elapsed duration the way a person would say it.
/// The sign of `delta` is ignored.
pub fn natural_delta(delta: TimeDelta) -> String {
    let seconds = delta.num_seconds().unsigned_abs();
    let total_days = delta.num_days().unsigned_abs();
    let years = total_days / 365;
    let days = total_days % 365;
    // 30.5 days per month, in integer arithmetic
    let months = days * 2 / 61;

    match years {
        0 if days == 0 => match seconds {
            0 => "a moment".to_string(),
            1 => "a second".to_string(),
            2..60 => format!("{seconds} seconds"),
            60..120 => "a minute".to_string(),
            120..3600 => format!("{} minutes", seconds / 60),
            3600..7200 => "an hour".to_string(),
            _ => format!("{} hours", seconds / 3600),
        },
        0 if days == 1 => "a day".to_string(),
        0 => match months {
            0 => format!("{days} days"),
            1 => "a month".to_string(),
            _ => format!("{months} months"),
        },
        1 => match (months, days) {
            (0, 0) => "a year".to_string(),
            (0, 1) => "1 year, 1 day".to_string(),
            (0, _) => format!("1 year, {days} days"),
            (1, _) => "1 year, 1 month".to_string(),
            _ => format!("1 year, {months} months"),
        },
        _ => format!("{years} years"),
    }
}
