//! Wire types for the dashboard home API.
//!
//! `GET /admin/home` and `GET /manager/home/{store_id}` return the same
//! shape: recent lessons, a total count, pre-bucketed chart data, and
//! upcoming lessons. The wire uses camelCase keys and a customer variant
//! keyed on `birthdate`/`age`/`active`; both are translated to the
//! canonical models at this boundary and never leak further in.

// Allow dead code: wire structs carry fields for completeness
#![allow(dead_code)]

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::models::customer::Gender;
use crate::models::lesson::parse_timestamp;
use crate::models::{Customer, Lesson};
use crate::views::chart::ChartGranularity;

/// Query for the home endpoints. `page` is zero-based on the wire.
#[derive(Debug, Clone, Copy)]
pub struct HomeQuery {
    pub chart_type: ChartGranularity,
    pub page: usize,
    pub size: usize,
}

impl HomeQuery {
    pub fn to_params(self) -> Vec<(String, String)> {
        vec![
            ("chartType".to_string(), self.chart_type.as_param().to_string()),
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    #[serde(default)]
    pub recent_lessons: Vec<HomeLesson>,
    #[serde(default)]
    pub total_lesson_count: i64,
    pub chart_data: HomeChartData,
    #[serde(default)]
    pub upcoming_lessons: Vec<HomeLesson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeChartData {
    #[serde(default)]
    pub series: Vec<HomePoint>,
    #[serde(default)]
    pub max_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomePoint {
    pub period: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeLesson {
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub trainer_name: Option<String>,
    #[serde(default)]
    pub customer: Option<HomeCustomer>,
}

impl HomeLesson {
    pub fn into_lesson(self) -> Option<Lesson> {
        let start_date = parse_timestamp(&self.start_date);
        let end_date = parse_timestamp(&self.end_date);
        let (start_date, end_date) = match (start_date, end_date) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                warn!(id = %self.id, "Unparseable timestamps on home lesson");
                return None;
            }
        };

        let fallback = |value: Option<String>| {
            value.filter(|v| !v.is_empty()).unwrap_or_else(|| "-".to_string())
        };

        Some(Lesson {
            id: self.id,
            start_date,
            end_date,
            store_id: self.store_id,
            trainer_id: None,
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
            store_name: fallback(self.store_name),
            trainer_name: fallback(self.trainer_name),
            customer_name: fallback(self.customer.map(|c| c.name)),
        })
    }
}

/// The home API's customer shape: `birthdate` + derived `age` + `active`.
/// Translated into the canonical `birthday`/`is_active` form here; the
/// wire `age` is discarded because it goes stale the day after it is
/// computed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeCustomer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kana: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl HomeCustomer {
    pub fn into_customer(self) -> Customer {
        let birthday = self
            .birthdate
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok());

        Customer {
            id: self.id,
            name: self.name,
            kana: self.kana,
            gender: self
                .gender
                .as_deref()
                .map(Gender::from_wire)
                .unwrap_or(Gender::Other),
            birthday,
            email: None,
            phone: None,
            address: None,
            medical: None,
            taboo: None,
            height: None,
            memo: None,
            first_posture_group_id: None,
            is_active: self.active,
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "recentLessons": [{
            "id": "l1",
            "startDate": "2024-02-26T10:00:00",
            "endDate": "2024-02-26T11:00:00",
            "storeName": "Shibuya",
            "trainerName": "Sato",
            "customer": {"id": "c1", "name": "Yamada", "kana": "ヤマダ",
                         "birthdate": "1990-06-15", "age": 33, "active": true}
        }],
        "totalLessonCount": 42,
        "chartData": {
            "series": [{"period": "2/19~", "count": 3}, {"period": "2/26~", "count": 5}],
            "maxCount": 5
        },
        "upcomingLessons": []
    }"#;

    #[test]
    fn test_deserialize_home_response() {
        let response: HomeResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(response.total_lesson_count, 42);
        assert_eq!(response.chart_data.series.len(), 2);
        assert_eq!(response.chart_data.max_count, 5);
        assert_eq!(response.recent_lessons.len(), 1);
        assert!(response.upcoming_lessons.is_empty());
    }

    #[test]
    fn test_home_lesson_translation() {
        let response: HomeResponse = serde_json::from_str(FIXTURE).unwrap();
        let lesson = response.recent_lessons[0].clone().into_lesson().unwrap();
        assert_eq!(lesson.customer_name, "Yamada");
        assert_eq!(lesson.store_name, "Shibuya");
        assert_eq!(lesson.customer_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_home_customer_drops_stale_age() {
        let response: HomeResponse = serde_json::from_str(FIXTURE).unwrap();
        let wire = response.recent_lessons[0].customer.clone().unwrap();
        assert_eq!(wire.age, Some(33));
        let customer = wire.into_customer();
        // Canonical form stores the birthday; age is derived on demand
        assert_eq!(
            customer.birthday,
            Some(NaiveDate::from_ymd_opt(1990, 6, 15).unwrap())
        );
        assert!(customer.is_active);
    }

    #[test]
    fn test_home_query_params() {
        let query = HomeQuery {
            chart_type: ChartGranularity::Week,
            page: 0,
            size: 5,
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("chartType".to_string(), "week".to_string()),
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "5".to_string()),
            ]
        );
    }
}
