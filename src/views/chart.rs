//! Weekly/monthly lesson-count bucketing for the home and history charts.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::Lesson;

/// Bar charts never scale below this many rows, so a quiet week still
/// renders with sensible proportions.
pub const MIN_CHART_SCALE: usize = 5;

/// Bucketing granularity, also the `chartType` wire value for the
/// home API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartGranularity {
    Week,
    Month,
}

impl ChartGranularity {
    pub fn as_param(&self) -> &'static str {
        match self {
            ChartGranularity::Week => "week",
            ChartGranularity::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartGranularity::Week => "Weekly",
            ChartGranularity::Month => "Monthly",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            ChartGranularity::Week => ChartGranularity::Month,
            ChartGranularity::Month => ChartGranularity::Week,
        }
    }
}

/// One aggregation bucket: a display label and how many lessons started
/// in that period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBucket {
    pub label: String,
    pub count: usize,
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    // First of the month always exists
    date.with_day(1).unwrap_or(date)
}

fn bucket_label(granularity: ChartGranularity, start: NaiveDate) -> String {
    match granularity {
        ChartGranularity::Week => format!("{}/{}~", start.month(), start.day()),
        ChartGranularity::Month => format!("{}/{:02}", start.year(), start.month()),
    }
}

/// Group lessons by the period containing their start date and return
/// `{label, count}` pairs in chronological order.
pub fn bucket_lessons(lessons: &[Lesson], granularity: ChartGranularity) -> Vec<ChartBucket> {
    // BTreeMap keyed on the period start keeps output chronological
    // even when labels alone would sort wrong (12/30~ vs 1/6~).
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for lesson in lessons {
        let date = lesson.start_date.date_naive();
        let key = match granularity {
            ChartGranularity::Week => week_start(date),
            ChartGranularity::Month => month_start(date),
        };
        *counts.entry(key).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(start, count)| ChartBucket {
            label: bucket_label(granularity, start),
            count,
        })
        .collect()
}

/// Vertical scale for rendering: the largest bucket, floored at
/// `MIN_CHART_SCALE`. An empty bucket set still implies a scale of 5.
pub fn chart_scale(buckets: &[ChartBucket]) -> usize {
    buckets
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(MIN_CHART_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lesson_on(y: i32, m: u32, d: u32) -> Lesson {
        let start = Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap();
        Lesson {
            id: format!("{}-{}-{}", y, m, d),
            start_date: start,
            end_date: start + Duration::hours(1),
            store_id: None,
            trainer_id: None,
            customer_id: None,
            store_name: "-".to_string(),
            trainer_name: "-".to_string(),
            customer_name: "-".to_string(),
        }
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-03 is a Wednesday
        assert_eq!(
            week_start(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        // Monday maps to itself
        assert_eq!(
            week_start(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
    }

    #[test]
    fn test_week_buckets() {
        let lessons = vec![
            lesson_on(2024, 1, 1),
            lesson_on(2024, 1, 3),
            lesson_on(2024, 1, 8),
        ];
        let buckets = bucket_lessons(&lessons, ChartGranularity::Week);
        assert_eq!(
            buckets,
            vec![
                ChartBucket { label: "1/1~".to_string(), count: 2 },
                ChartBucket { label: "1/8~".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_month_buckets() {
        let lessons = vec![
            lesson_on(2024, 1, 1),
            lesson_on(2024, 1, 3),
            lesson_on(2024, 1, 8),
        ];
        let buckets = bucket_lessons(&lessons, ChartGranularity::Month);
        assert_eq!(
            buckets,
            vec![ChartBucket { label: "2024/01".to_string(), count: 3 }]
        );
    }

    #[test]
    fn test_buckets_stay_chronological_across_year_boundary() {
        let lessons = vec![lesson_on(2024, 1, 2), lesson_on(2023, 12, 28)];
        let weekly = bucket_lessons(&lessons, ChartGranularity::Week);
        assert_eq!(weekly[0].label, "12/25~");
        assert_eq!(weekly[1].label, "1/1~");

        let monthly = bucket_lessons(&lessons, ChartGranularity::Month);
        assert_eq!(monthly[0].label, "2023/12");
        assert_eq!(monthly[1].label, "2024/01");
    }

    #[test]
    fn test_chart_scale_floor() {
        assert_eq!(chart_scale(&[]), 5);
        let small = vec![ChartBucket { label: "1/1~".to_string(), count: 2 }];
        assert_eq!(chart_scale(&small), 5);
        let big = vec![
            ChartBucket { label: "1/1~".to_string(), count: 9 },
            ChartBucket { label: "1/8~".to_string(), count: 4 },
        ];
        assert_eq!(chart_scale(&big), 9);
    }
}
