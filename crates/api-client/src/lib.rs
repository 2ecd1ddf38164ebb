//! REST transport for the muster sync core.
//!
//! [`ApiClient`] talks to the yard operations API over HTTPS with bearer
//! auth; [`fetchers`] adapts it onto the fetch ports the core engines
//! consume, so the core never sees HTTP.

pub mod client;
pub mod error;
pub mod fetchers;
pub mod types;

// Re-export for convenience
pub use client::ApiClient;
pub use error::{ApiError, RetryClass};
pub use fetchers::{resource_fetchers, RestAggregateFetcher, RestPageFetcher};
pub use types::{PageMeta, PagedResponse};
