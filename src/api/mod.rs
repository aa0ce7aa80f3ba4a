//! Clients for the remote services.
//!
//! Two surfaces are consumed:
//!
//! - the remote data store (table-style queries over `customers`,
//!   `lessons`, `stores`, `users`, plus the password auth endpoint)
//! - the dashboard home API (`/admin/home`, `/manager/home/{store_id}`)
//!
//! Both are reached through `ApiClient`, authenticated with a bearer
//! token obtained at sign-in.

pub mod client;
pub mod error;
pub mod home;
pub mod query;

pub use client::ApiClient;
pub use error::ApiError;
pub use query::TableQuery;
