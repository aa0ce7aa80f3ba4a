//! In-memory caching for reference data.
//!
//! The only cached collection is the store directory: store locations
//! change rarely, every screen needs them for name resolution and filter
//! menus, and several views mount at once. `StoreDirectory` keeps one
//! process-wide entry with a 5-minute freshness window and coalesces
//! concurrent fetches onto a single remote request.
//!
//! Nothing else is cached; per the product's scope there is no offline
//! support and no persisted copy of fetched data.

pub mod stores;

pub use stores::{CacheEntry, StoreDirectory, StoreSource};
