//! # costlru
//!
//! In-process LRU cache bounded by total cost and by entry count.
//!
//! ## Architecture
//! - **OrderedList**: arena-backed doubly-linked list, O(1) append/remove/pop
//! - **LruCache**: AHash table of key -> list handle, purges from the head
//! - **Cache**: one mutex around an `LruCache`, plus hit/miss statistics
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use costlru::{Cache, CacheConfig};
//!
//! let config = CacheConfig::new(1024, 120);
//! let cache = Arc::new(Cache::with_cost_provider(config, |v: &Vec<u8>| v.len()));
//!
//! cache.set("avatar", vec![0u8; 600]);
//! cache.set("banner", vec![0u8; 600]); // evicts "avatar"
//!
//! assert!(cache.get("avatar").is_none());
//! assert_eq!(cache.total_cost(), 600);
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod cost;
mod error;
mod list;
mod lru;
mod stats;

pub use cache::Cache;
pub use config::CacheConfig;
pub use cost::{CostProvider, ShallowSize, UnitCost};
pub use error::{Error, Result};
pub use list::{Handle, OrderedList};
pub use lru::{Entry, EntryMetadata, LruCache};
pub use stats::{CacheStats, StatsSnapshot};
