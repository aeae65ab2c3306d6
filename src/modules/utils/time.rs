use chrono::{DateTime, Local, TimeZone, Utc};

/// Current Unix timestamp in seconds
pub fn get_current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Format a Unix timestamp (seconds) in the local time zone
pub fn utc_to_local(timestamp: i64) -> Option<String> {
    let utc_time = Utc.timestamp_opt(timestamp, 0).single()?;
    let local_time: DateTime<Local> = DateTime::from(utc_time);
    Some(local_time.format("%Y-%m-%d %H:%M:%S %Z").to_string())
}

/// Format a remaining duration in seconds to a human readable string
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "expired".to_string();
    }
    if seconds < 60 {
        format!("{} seconds", seconds)
    } else if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours", seconds / 3600)
    } else {
        format!("{} days", seconds / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp() {
        let timestamp = get_current_timestamp();
        // Later than 2021-01-01
        assert!(timestamp > 1_609_459_200);
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(30), "30 seconds");
        assert_eq!(format_duration(90), "1 minutes");
        assert_eq!(format_duration(3600), "1 hours");
        assert_eq!(format_duration(86400), "1 days");
        assert_eq!(format_duration(-5), "expired");
    }

    #[test]
    fn test_utc_to_local() {
        let local_time = utc_to_local(get_current_timestamp()).unwrap();
        assert!(local_time.contains(':'));
        assert!(local_time.len() > 15);

        assert!(utc_to_local(i64::MAX).is_none());
    }
}
