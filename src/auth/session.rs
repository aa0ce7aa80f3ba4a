// Allow dead code: infrastructure methods for session lifecycle
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Principal, Role};

/// Session file name in the state directory
const SESSION_FILE: &str = "session.json";

/// Access tokens from the data store expire after about an hour;
/// anything past this forces a fresh login.
const SESSION_EXPIRY_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub store_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        let expiry = self.created_at + Duration::minutes(SESSION_EXPIRY_MINUTES);
        Utc::now() > expiry
    }

    /// The principal this session authenticates.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            role: Role::from_wire(&self.role),
            store_ids: self.store_ids.clone(),
        }
    }
}

pub struct Session {
    state_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            state_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns true when a non-expired session
    /// was restored.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.access_token.as_str())
    }

    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_data(created_at: DateTime<Utc>) -> SessionData {
        SessionData {
            access_token: "tok".to_string(),
            user_id: "u1".to_string(),
            email: "m@example.com".to_string(),
            name: "Sato".to_string(),
            role: "manager".to_string(),
            store_ids: vec!["S1".to_string()],
            created_at,
        }
    }

    #[test]
    fn test_expiry() {
        assert!(!session_data(Utc::now()).is_expired());
        assert!(session_data(Utc::now() - Duration::minutes(61)).is_expired());
    }

    #[test]
    fn test_principal_from_session() {
        let principal = session_data(Utc::now()).principal();
        assert_eq!(principal.role, Role::Manager);
        assert_eq!(principal.single_store(), Some("S1"));
    }
}
