/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
///
/// Zero renders as `"00:00"`; the hours field is not capped.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "00:00".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(5), "00:05");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "01:00:00");
        assert_eq!(format_duration(3661), "01:01:01");
    }

    #[test]
    fn test_hours_grow_unbounded() {
        assert_eq!(format_duration(100 * 3600 + 1), "100:00:01");
    }
}
