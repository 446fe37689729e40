//! Derived display fields: relative time, difficulty bucket, solve time.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Render `at` relative to `now` using whole-unit floor division.
/// Timestamps in the future (clock skew) render as "just now".
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);

    if secs < MINUTE {
        "just now".to_string()
    } else if secs < HOUR {
        format!("{}m ago", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else if secs < WEEK {
        format!("{}d ago", secs / DAY)
    } else if secs < 4 * WEEK {
        format!("{}w ago", secs / WEEK)
    } else {
        "over a month ago".to_string()
    }
}

/// Bucket a 1-5 rating into a difficulty label.
pub fn difficulty_bucket(rating: Option<i32>) -> &'static str {
    match rating {
        None | Some(0) => "Unknown",
        Some(r) if r <= 2 => "Easy",
        Some(r) if r <= 4 => "Medium",
        Some(_) => "Hard",
    }
}

/// Format a solve duration as "{h}h {m}m", "{m}m" or "< 1m".
pub fn format_solve_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        "< 1m".to_string()
    }
}

/// Solve time in whole hours, rounded to nearest. Absent means 0.
pub fn solve_hours(seconds: Option<i64>) -> i64 {
    match seconds {
        Some(s) if s > 0 => (s as f64 / HOUR as f64).round() as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ago(secs: i64) -> String {
        let now = Utc::now();
        relative_time(now - Duration::seconds(secs), now)
    }

    #[test]
    fn test_relative_time_boundaries() {
        assert_eq!(ago(30), "just now");
        assert_eq!(ago(59), "just now");
        assert_eq!(ago(60), "1m ago");
        assert_eq!(ago(90), "1m ago");
        assert_eq!(ago(3599), "59m ago");
        assert_eq!(ago(3700), "1h ago");
        assert_eq!(ago(DAY - 1), "23h ago");
        assert_eq!(ago(DAY), "1d ago");
        assert_eq!(ago(6 * DAY), "6d ago");
        assert_eq!(ago(8 * DAY), "1w ago");
        assert_eq!(ago(27 * DAY), "3w ago");
        assert_eq!(ago(28 * DAY), "over a month ago");
        assert_eq!(ago(40 * DAY), "over a month ago");
    }

    #[test]
    fn test_relative_time_future_is_just_now() {
        assert_eq!(ago(-120), "just now");
    }

    #[test]
    fn test_difficulty_bucket_boundaries() {
        assert_eq!(difficulty_bucket(None), "Unknown");
        assert_eq!(difficulty_bucket(Some(0)), "Unknown");
        assert_eq!(difficulty_bucket(Some(1)), "Easy");
        assert_eq!(difficulty_bucket(Some(2)), "Easy");
        assert_eq!(difficulty_bucket(Some(3)), "Medium");
        assert_eq!(difficulty_bucket(Some(4)), "Medium");
        assert_eq!(difficulty_bucket(Some(5)), "Hard");
    }

    #[test]
    fn test_format_solve_time() {
        assert_eq!(format_solve_time(0), "< 1m");
        assert_eq!(format_solve_time(59), "< 1m");
        assert_eq!(format_solve_time(125), "2m");
        assert_eq!(format_solve_time(3600), "1h 0m");
        assert_eq!(format_solve_time(3725), "1h 2m");
    }

    #[test]
    fn test_solve_hours_rounds() {
        assert_eq!(solve_hours(None), 0);
        assert_eq!(solve_hours(Some(1799)), 0);
        assert_eq!(solve_hours(Some(1800)), 1);
        assert_eq!(solve_hours(Some(3 * 3600 + 2000)), 4);
    }
}
