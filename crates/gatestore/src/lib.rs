//! # gatestore
//!
//! Storage gates: pluggable backends persisting `(key, value, options)`
//! bundles for the gatecache strategies.
//!
//! ## Gates
//! - **DirectoryGate**: one text file per entry, namespaced by cache name
//! - **MemoryGate**: hash map layer in front of another gate, pointer capable
//! - **NullGate**: stores nothing
//!
//! Gates never fail loudly. I/O and parse problems are reported to a
//! [`Logger`] and look like a cache miss to the caller.

#![warn(missing_docs)]

mod directory;
mod error;
pub mod format;
mod gate;
mod lexical;
mod log;
mod memory;
mod null;

pub use directory::{
    DirectoryGate, DirectoryGateConfig, DirectoryIter, GateOptions, DEFAULT_EXTENSION,
    LOG_CATEGORY,
};
pub use error::{Error, Result};
pub use gate::{Bundle, GateBundle, PointerAccess, StorageGate};
pub use lexical::{cast, Lexical};
pub use log::{Level, Logger, TracingLogger};
pub use memory::{MemoryGate, VolatileGate};
pub use null::NullGate;
