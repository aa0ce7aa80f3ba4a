// Allow dead code: role helpers mirror the full wire vocabulary
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Role of the signed-in principal. Determines the home screen variant
/// and how lesson-history queries are scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Trainer,
}

impl Role {
    /// Parse the wire value from the users table.
    /// Unknown roles fall back to `Trainer`, the least-privileged variant;
    /// trainers receive unfiltered queries and rely on backend scoping.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "trainer" => Role::Trainer,
            other => {
                warn!(role = other, "Unknown role, treating as trainer");
                Role::Trainer
            }
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Trainer => "trainer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Manager => write!(f, "Manager"),
            Role::Trainer => write!(f, "Trainer"),
        }
    }
}

/// Wire row from the users table. Managers and trainers may carry a
/// single `store_id`, a `store_ids` list, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub store_ids: Option<Vec<String>>,
}

impl ProfileRow {
    /// Collapse the two store-assignment shapes into one id list,
    /// de-duplicated and in wire order.
    pub fn to_principal(&self) -> Principal {
        let mut store_ids: Vec<String> = Vec::new();
        if let Some(ref id) = self.store_id {
            if !id.is_empty() {
                store_ids.push(id.clone());
            }
        }
        if let Some(ref ids) = self.store_ids {
            for id in ids {
                if !id.is_empty() && !store_ids.contains(id) {
                    store_ids.push(id.clone());
                }
            }
        }

        Principal {
            user_id: self.id.clone(),
            name: self.name.clone().unwrap_or_default(),
            role: Role::from_wire(&self.role),
            store_ids,
        }
    }
}

/// The session principal: who is signed in and which stores they cover.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub store_ids: Vec<String>,
}

impl Principal {
    /// The principal's single store, when they have exactly one.
    pub fn single_store(&self) -> Option<&str> {
        match self.store_ids.as_slice() {
            [id] => Some(id),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(unnamed)"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_wire() {
        assert_eq!(Role::from_wire("admin"), Role::Admin);
        assert_eq!(Role::from_wire("manager"), Role::Manager);
        assert_eq!(Role::from_wire("trainer"), Role::Trainer);
        assert_eq!(Role::from_wire("receptionist"), Role::Trainer);
    }

    #[test]
    fn test_profile_single_store() {
        let row = ProfileRow {
            id: "u1".to_string(),
            name: Some("Sato".to_string()),
            role: "manager".to_string(),
            store_id: Some("S1".to_string()),
            store_ids: None,
        };
        let principal = row.to_principal();
        assert_eq!(principal.role, Role::Manager);
        assert_eq!(principal.store_ids, vec!["S1".to_string()]);
        assert_eq!(principal.single_store(), Some("S1"));
    }

    #[test]
    fn test_profile_merges_store_shapes() {
        let row = ProfileRow {
            id: "u2".to_string(),
            name: None,
            role: "manager".to_string(),
            store_id: Some("S1".to_string()),
            store_ids: Some(vec!["S1".to_string(), "S2".to_string()]),
        };
        let principal = row.to_principal();
        assert_eq!(principal.store_ids, vec!["S1".to_string(), "S2".to_string()]);
        assert_eq!(principal.single_store(), None);
    }
}
