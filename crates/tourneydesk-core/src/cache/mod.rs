//! Client-side query cache.
//!
//! This module provides the `QueryCache`, an in-memory cache of backend
//! reads keyed by logical resource name. Entries become stale after a
//! configurable window (5 minutes by default) or when invalidated by a
//! mutation of a related entity kind.
//!
//! The cache is an explicit object: create it at startup, hand clones to the
//! components that read through it, and `clear` it on shutdown.

pub mod manager;
pub mod stats;

pub use manager::{CachedData, QueryCache, QueryKey, QueryOptions};
pub use stats::{CacheStats, CacheStatsSnapshot};
