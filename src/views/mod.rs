//! Derived views over fetched data.
//!
//! Pure computations consumed by the UI layer:
//!
//! - `pagination`: fixed-size page math and the `Pager` cursor
//! - `chart`: weekly/monthly lesson-count bucketing
//! - `routes`: role/origin-keyed lesson-detail path resolution

pub mod chart;
pub mod pagination;
pub mod routes;

pub use chart::{bucket_lessons, chart_scale, ChartBucket, ChartGranularity};
pub use pagination::{page_slice, total_pages, Pager, PAGE_SIZE};
pub use routes::{lesson_detail_path, Origin};
