use serde::{Deserialize, Serialize};

/// A physical studio location. Immutable from this application's
/// perspective; the list changes rarely and is served from the
/// store directory cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
}
