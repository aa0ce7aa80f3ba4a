//! Data models for studio entities.
//!
//! This module contains the data structures used to represent
//! studio data including:
//!
//! - `Customer`: member records with care and contact fields
//! - `Lesson`: scheduled/completed training sessions with resolved names
//! - `Store`: studio locations
//! - `Role`, `Principal`: the signed-in user and their store scope

pub mod customer;
pub mod lesson;
pub mod store;
pub mod user;

pub use customer::{Customer, CustomerInput, CustomerPayload, CustomerRecord, Gender};
pub use lesson::{Lesson, LessonRow, NameRef};
pub use store::Store;
pub use user::{Principal, ProfileRow, Role};
