//! Lesson-history query building and row normalization.
//!
//! "History" on the query side means lessons that have already started:
//! `start_date < now`, newest first, joined with store/trainer/customer
//! display names. Role scoping is part of the query itself - a manager's
//! request never leaves the client unscoped.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::api::query::{SortOrder, TableQuery};
use crate::models::{Lesson, LessonRow, Principal, Role};

/// Columns for a history select, including the foreign name joins.
const HISTORY_SELECT: &str =
    "id,start_date,end_date,store_id,user_id,customer_id,stores(name),users(name),customers(name)";

/// Row cap for the trainer's locally derived home view.
const TRAINER_HOME_LIMIT: usize = 200;

/// Store selection on the history screen. Only admins may pick `All`;
/// managers are pinned to their own stores regardless of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFilter {
    All,
    Store(String),
}

/// Build the history query for a principal.
///
/// - manager: restricted to their own store id(s), `eq` for one and
///   `in` for several; a manager with no assignment matches nothing
/// - admin: restricted to the selected store unless `All`
/// - trainer (and anything else): unfiltered, scoping is the backend's
pub fn history_query(
    principal: &Principal,
    filter: &StoreFilter,
    now: DateTime<Utc>,
) -> TableQuery {
    let mut query = TableQuery::table("lessons")
        .select(HISTORY_SELECT)
        .lt("start_date", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
        .order("start_date", SortOrder::Descending);

    match principal.role {
        Role::Manager => {
            query = match principal.store_ids.as_slice() {
                [] => {
                    warn!(user_id = %principal.user_id, "Manager has no store assignment");
                    query.in_list("store_id", &[])
                }
                [only] => query.eq("store_id", only),
                many => query.in_list("store_id", many),
            };
        }
        Role::Admin => {
            if let StoreFilter::Store(id) = filter {
                query = query.eq("store_id", id);
            }
        }
        Role::Trainer => {}
    }

    query
}

/// Query backing the trainer's home view: their recent and upcoming
/// lessons in one fetch, split locally by end date.
pub fn trainer_home_query(principal: &Principal) -> TableQuery {
    TableQuery::table("lessons")
        .select(HISTORY_SELECT)
        .eq("user_id", &principal.user_id)
        .order("start_date", SortOrder::Descending)
        .limit(TRAINER_HOME_LIMIT)
}

/// Translate wire rows into the canonical shape, dropping rows that
/// fail to parse.
pub fn normalize_rows(rows: Vec<LessonRow>) -> Vec<Lesson> {
    let total = rows.len();
    let lessons: Vec<Lesson> = rows.into_iter().filter_map(LessonRow::into_lesson).collect();
    if lessons.len() < total {
        warn!(dropped = total - lessons.len(), "Dropped unparseable lesson rows");
    }
    lessons
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn principal(role: Role, store_ids: &[&str]) -> Principal {
        Principal {
            user_id: "u1".to_string(),
            name: "Sato".to_string(),
            role,
            store_ids: store_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn store_param(query: TableQuery) -> Option<String> {
        query
            .into_params()
            .into_iter()
            .find(|(key, _)| key == "store_id")
            .map(|(_, value)| value)
    }

    #[test]
    fn test_manager_single_store_uses_eq() {
        let query = history_query(&principal(Role::Manager, &["S1"]), &StoreFilter::All, now());
        assert_eq!(store_param(query), Some("eq.S1".to_string()));
    }

    #[test]
    fn test_manager_multi_store_uses_in() {
        let query = history_query(
            &principal(Role::Manager, &["S1", "S2"]),
            &StoreFilter::All,
            now(),
        );
        assert_eq!(store_param(query), Some("in.(S1,S2)".to_string()));
    }

    #[test]
    fn test_manager_is_never_unscoped() {
        // Even when the UI filter says another store, a manager only
        // ever queries their own rows.
        let query = history_query(
            &principal(Role::Manager, &["S1"]),
            &StoreFilter::Store("S9".to_string()),
            now(),
        );
        assert_eq!(store_param(query), Some("eq.S1".to_string()));

        let unassigned = history_query(&principal(Role::Manager, &[]), &StoreFilter::All, now());
        assert_eq!(store_param(unassigned), Some("in.()".to_string()));
    }

    #[test]
    fn test_admin_all_is_unfiltered() {
        let query = history_query(&principal(Role::Admin, &[]), &StoreFilter::All, now());
        assert_eq!(store_param(query), None);
    }

    #[test]
    fn test_admin_selected_store_uses_eq() {
        let query = history_query(
            &principal(Role::Admin, &[]),
            &StoreFilter::Store("S2".to_string()),
            now(),
        );
        assert_eq!(store_param(query), Some("eq.S2".to_string()));
    }

    #[test]
    fn test_trainer_store_scope_is_left_to_backend() {
        let query = history_query(
            &principal(Role::Trainer, &["S1"]),
            &StoreFilter::Store("S2".to_string()),
            now(),
        );
        assert_eq!(store_param(query), None);
    }

    #[test]
    fn test_history_filters_and_ordering() {
        let params = history_query(&principal(Role::Admin, &[]), &StoreFilter::All, now())
            .into_params();
        assert!(params
            .iter()
            .any(|(k, v)| k == "start_date" && v == "lt.2024-03-01T12:00:00Z"));
        assert!(params
            .iter()
            .any(|(k, v)| k == "order" && v == "start_date.desc"));
        assert!(params
            .iter()
            .any(|(k, v)| k == "select" && v.contains("stores(name)")));
    }

    #[test]
    fn test_normalize_drops_bad_rows() {
        let rows: Vec<LessonRow> = serde_json::from_str(
            r#"[
                {"id":"ok","start_date":"2024-01-03T10:00:00","end_date":"2024-01-03T11:00:00"},
                {"id":"bad","start_date":"??","end_date":"2024-01-03T11:00:00"}
            ]"#,
        )
        .unwrap();
        let lessons = normalize_rows(rows);
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].id, "ok");
    }
}
