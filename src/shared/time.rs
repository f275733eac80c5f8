use chrono::{DateTime, NaiveDateTime, Utc};

pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const FILE_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 timestamp used in frontmatter and log lines.
pub fn iso_ts(dt: DateTime<Utc>) -> String {
    dt.format(ISO_FORMAT).to_string()
}

/// Compact timestamp used in generated filenames.
pub fn file_ts(dt: DateTime<Utc>) -> String {
    dt.format(FILE_FORMAT).to_string()
}

pub fn today_str(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Parses a frontmatter timestamp. Accepts the trailing-Z form this crate
/// writes as well as an explicit UTC offset.
pub fn parse_iso_ts(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso_round_trip() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let rendered = iso_ts(dt);
        assert_eq!(rendered, "2026-03-14T09:26:53Z");
        assert_eq!(parse_iso_ts(&rendered), Some(dt));
    }

    #[test]
    fn file_ts_is_filename_safe() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(file_ts(dt), "20260314_092653");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_iso_ts("not-a-timestamp"), None);
        assert_eq!(parse_iso_ts(""), None);
    }
}
