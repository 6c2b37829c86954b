//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Number of milliseconds in a second
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a period in seconds into whole milliseconds, rounding to the
/// nearest millisecond.
pub fn seconds_to_millis(period_s: f64) -> i64 {
    (period_s * MILLIS_PER_SECOND).round() as i64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seconds_to_millis() {
        assert_eq!(seconds_to_millis(0.05), 50);
        assert_eq!(seconds_to_millis(0.0104), 10);
        assert_eq!(seconds_to_millis(0.0), 0);
    }

    #[test]
    fn test_duration_to_seconds() {
        let d = chrono::Duration::milliseconds(1500);
        assert_eq!(duration_to_seconds(d), Some(1.5));
    }
}
