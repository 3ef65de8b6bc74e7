//! Time display formatting

/// Format a position in seconds as `HH:MM:SS`.
///
/// Negative and non-finite inputs render as `00:00:00`. The hour field wraps
/// at 24 hours, so values of a day or more fold back around; single audio
/// files never get close to that boundary.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00:00".to_string();
    }

    let total = seconds as u64;
    let hours = (total / 3600) % 24;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_all_zeros() {
        assert_eq!(format_time(0.0), "00:00:00");
    }

    #[test]
    fn hour_minute_second_split() {
        assert_eq!(format_time(3661.0), "01:01:01");
    }

    #[test]
    fn sub_minute() {
        assert_eq!(format_time(59.0), "00:00:59");
        assert_eq!(format_time(59.9), "00:00:59");
    }

    #[test]
    fn last_second_before_an_hour() {
        assert_eq!(format_time(3599.0), "00:59:59");
    }

    #[test]
    fn wraps_after_a_day() {
        assert_eq!(format_time(86401.0), "00:00:01");
    }

    #[test]
    fn garbage_inputs_render_as_zero() {
        assert_eq!(format_time(-5.0), "00:00:00");
        assert_eq!(format_time(f64::NAN), "00:00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00:00");
    }
}
