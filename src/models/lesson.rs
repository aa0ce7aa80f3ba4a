// Allow dead code: wire structs carry fields for completeness
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::format::format_span;

/// Joined display-name embed, e.g. the `stores(name)` leg of a
/// lesson-history select.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Wire row for the `lessons` collection. Date keys arrive snake_case
/// from the data store but camelCase from the home API; aliases absorb
/// both so normalization happens in one place.
#[derive(Debug, Clone, Deserialize)]
pub struct LessonRow {
    pub id: String,
    #[serde(alias = "startDate")]
    pub start_date: String,
    #[serde(alias = "endDate")]
    pub end_date: String,
    #[serde(default, alias = "storeId")]
    pub store_id: Option<String>,
    #[serde(default, alias = "userId", alias = "trainerId")]
    pub user_id: Option<String>,
    #[serde(default, alias = "customerId")]
    pub customer_id: Option<String>,
    // Foreign joins carrying display names
    #[serde(default)]
    pub stores: Option<NameRef>,
    #[serde(default)]
    pub users: Option<NameRef>,
    #[serde(default)]
    pub customers: Option<NameRef>,
}

impl LessonRow {
    /// Normalize into the canonical shape. Rows whose timestamps cannot
    /// be parsed are dropped (with a warning) rather than poisoning the
    /// whole list.
    pub fn into_lesson(self) -> Option<Lesson> {
        let start_date = match parse_timestamp(&self.start_date) {
            Some(dt) => dt,
            None => {
                warn!(id = %self.id, value = %self.start_date, "Unparseable lesson start");
                return None;
            }
        };
        let end_date = match parse_timestamp(&self.end_date) {
            Some(dt) => dt,
            None => {
                warn!(id = %self.id, value = %self.end_date, "Unparseable lesson end");
                return None;
            }
        };

        let resolve = |name_ref: Option<NameRef>| {
            name_ref
                .and_then(|r| r.name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "-".to_string())
        };

        Some(Lesson {
            id: self.id,
            start_date,
            end_date,
            store_id: self.store_id,
            trainer_id: self.user_id,
            customer_id: self.customer_id,
            store_name: resolve(self.stores),
            trainer_name: resolve(self.users),
            customer_name: resolve(self.customers),
        })
    }
}

/// A scheduled or completed session, annotated with resolved display
/// names. Lessons are created by the scheduling subsystem; this
/// application only reads and classifies them.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub store_id: Option<String>,
    pub trainer_id: Option<String>,
    pub customer_id: Option<String>,
    pub store_name: String,
    pub trainer_name: String,
    pub customer_name: String,
}

impl Lesson {
    /// A lesson belongs to completed history once its end time has
    /// passed, regardless of when it started.
    pub fn is_completed(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed(now)
    }

    /// "YYYY/MM/DD HH:MM~HH:MM" for table rows.
    pub fn formatted_span(&self) -> String {
        format_span(&self.start_date, &self.end_date)
    }
}

/// Parse the timestamp shapes the remote services actually emit:
/// RFC 3339 with offset, bare "YYYY-MM-DDTHH:MM:SS", its
/// space-separated twin, and date-only values (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lesson(start: DateTime<Utc>, end: DateTime<Utc>) -> Lesson {
        Lesson {
            id: "l1".to_string(),
            start_date: start,
            end_date: end,
            store_id: Some("S1".to_string()),
            trainer_id: None,
            customer_id: Some("c1".to_string()),
            store_name: "Shibuya".to_string(),
            trainer_name: "Sato".to_string(),
            customer_name: "Yamada".to_string(),
        }
    }

    #[test]
    fn test_completed_keys_on_end_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let past = lesson(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap(),
        );
        assert!(past.is_completed(now));

        // Started already but still running: not history yet
        let in_progress = lesson(
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        );
        assert!(!in_progress.is_completed(now));
        assert!(in_progress.is_upcoming(now));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 3, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-03T10:30:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-03T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-03 10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-03"),
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("tomorrow"), None);
    }

    #[test]
    fn test_parse_timestamp_normalizes_offsets() {
        assert_eq!(
            parse_timestamp("2024-01-03T19:30:00+09:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_row_normalization_accepts_both_naming_conventions() {
        let snake: LessonRow = serde_json::from_str(
            r#"{"id":"l1","start_date":"2024-01-03T10:00:00","end_date":"2024-01-03T11:00:00",
                "store_id":"S1","stores":{"name":"Shibuya"},"users":{"name":"Sato"},
                "customers":{"name":"Yamada"}}"#,
        )
        .unwrap();
        let camel: LessonRow = serde_json::from_str(
            r#"{"id":"l2","startDate":"2024-01-03T10:00:00","endDate":"2024-01-03T11:00:00"}"#,
        )
        .unwrap();

        let snake = snake.into_lesson().unwrap();
        assert_eq!(snake.store_name, "Shibuya");
        assert_eq!(snake.trainer_name, "Sato");
        assert_eq!(snake.customer_name, "Yamada");

        let camel = camel.into_lesson().unwrap();
        assert_eq!(camel.store_name, "-");
        assert_eq!(
            camel.start_date,
            Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_row_with_bad_dates_is_dropped() {
        let row: LessonRow = serde_json::from_str(
            r#"{"id":"l3","start_date":"??","end_date":"2024-01-03T11:00:00"}"#,
        )
        .unwrap();
        assert!(row.into_lesson().is_none());
    }
}
