//! Lesson-detail route resolution.
//!
//! The destination for a lesson row depends on who is looking and from
//! where: {admin, manager, trainer} x {home, history}. A lookup table
//! with placeholder substitution replaces nested role/origin branching;
//! the resolved path doubles as the breadcrumb on the detail pane.

use crate::models::Role;

/// Which screen the activation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Home,
    History,
}

const CUSTOMER_ID: &str = "{customerId}";
const LESSON_ID: &str = "{lessonId}";

/// All six role/origin route templates.
const LESSON_DETAIL_ROUTES: [(Role, Origin, &str); 6] = [
    (Role::Admin, Origin::Home, "/admin/customers/{customerId}/lessons/{lessonId}"),
    (Role::Admin, Origin::History, "/admin/lesson-history/{customerId}/lessons/{lessonId}"),
    (Role::Manager, Origin::Home, "/manager/customers/{customerId}/lessons/{lessonId}"),
    (Role::Manager, Origin::History, "/manager/lesson-history/{customerId}/lessons/{lessonId}"),
    (Role::Trainer, Origin::Home, "/trainer/customers/{customerId}/lessons/{lessonId}"),
    (Role::Trainer, Origin::History, "/trainer/lesson-history/{customerId}/lessons/{lessonId}"),
];

/// Resolve the detail path for a lesson row.
pub fn lesson_detail_path(
    role: Role,
    origin: Origin,
    customer_id: &str,
    lesson_id: &str,
) -> String {
    let template = LESSON_DETAIL_ROUTES
        .iter()
        .find(|(r, o, _)| *r == role && *o == origin)
        .map(|(_, _, template)| *template)
        // The table covers the full (role, origin) domain
        .unwrap_or("/");

    template
        .replace(CUSTOMER_ID, customer_id)
        .replace(LESSON_ID, lesson_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        assert_eq!(
            lesson_detail_path(Role::Admin, Origin::Home, "c1", "l9"),
            "/admin/customers/c1/lessons/l9"
        );
        assert_eq!(
            lesson_detail_path(Role::Trainer, Origin::History, "c2", "l3"),
            "/trainer/lesson-history/c2/lessons/l3"
        );
    }

    #[test]
    fn test_all_six_routes_are_distinct() {
        let mut paths = Vec::new();
        for role in [Role::Admin, Role::Manager, Role::Trainer] {
            for origin in [Origin::Home, Origin::History] {
                paths.push(lesson_detail_path(role, origin, "c1", "l1"));
            }
        }
        let mut deduped = paths.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(paths.len(), 6);
        assert_eq!(deduped.len(), 6);
        assert!(paths.iter().all(|p| !p.contains('{')));
    }
}
