use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Compute a whole-year age as of `today`.
/// The year ticks over on the month/day anniversary rather than on the
/// ordinal day, so ages stay correct across leap years.
pub fn age_on(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }
    age
}

/// Age as of the current date.
pub fn age_today(birthday: NaiveDate) -> i32 {
    age_on(birthday, Utc::now().date_naive())
}

/// Format a timestamp as "YYYY/MM/DD".
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y/%m/%d").to_string()
}

/// Format a calendar date as "YYYY/MM/DD".
pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Format a start/end pair as "YYYY/MM/DD HH:MM~HH:MM".
/// The end portion drops the date; lessons never span midnight.
pub fn format_span(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    format!(
        "{} {}~{}",
        start.format("%Y/%m/%d"),
        start.format("%H:%M"),
        end.format("%H:%M")
    )
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match.
/// Lowercasing is a no-op for kana, so the same helper serves both
/// name and phonetic-name searches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_age_on_before_and_after_anniversary() {
        let birthday = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let on_the_day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(age_on(birthday, day_before), 33);
        assert_eq!(age_on(birthday, on_the_day), 34);
    }

    #[test]
    fn test_age_on_leap_day_birthday() {
        let birthday = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
        // In a non-leap year the anniversary has not passed on Feb 28
        assert_eq!(
            age_on(birthday, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()),
            22
        );
        assert_eq!(
            age_on(birthday, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()),
            23
        );
    }

    #[test]
    fn test_format_span() {
        let start = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 3, 11, 30, 0).unwrap();
        assert_eq!(format_span(&start, &end), "2024/01/03 10:00~11:30");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Yamada Taro", "taro"));
        assert!(contains_ignore_case("ヤマダタロウ", "マダ"));
        assert!(!contains_ignore_case("Yamada", "sato"));
    }
}
