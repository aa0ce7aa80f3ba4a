//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: token-based session management with expiry
//! - `CredentialStore`: OS-level credential storage via keyring
//!
//! Sessions are persisted to disk so a restart inside the expiry window
//! skips the login screen.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
