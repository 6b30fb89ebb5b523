//! # gatecache
//!
//! Cache façade and eviction strategies over gatestore backends.
//!
//! ## Architecture
//! - **Cache**: ergonomic entry point, write-through [`CacheResult`] handles
//! - **Strategy**: eviction policy; [`LruStrategy`] keeps a logical clock in
//!   each entry's options slot
//! - **Gate**: any [`gatestore::StorageGate`] (directory, memory, null)
//!
//! ```no_run
//! use gatecache::{Cache, MemoryCache};
//!
//! let mut cache: MemoryCache<String, i32> = Cache::in_memory(128);
//! cache.lookup("one".to_string()).assign(1);
//! assert_eq!(cache.get(&"one".to_string()), Some(1));
//! ```

#![warn(missing_docs)]

mod cache;
mod lru;
mod result;
mod shared;
mod stats;
mod strategy;

pub use cache::{Cache, DirectoryCache, MemoryCache};
pub use lru::{LruStrategy, DEFAULT_MAX_SIZE};
pub use result::CacheResult;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use strategy::CacheStrategy;
