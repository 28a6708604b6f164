//! # Retort Storage
//!
//! Persistence layer for Retort: the hierarchical binary container format
//! and the type-adaptive archive store that encodes leaf values into it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                retort-storage                   │
//! ├─────────────────────────────────────────────────┤
//! │  • container - Group/dataset tree + file format │
//! │  • store     - Value classification & encoding  │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod container;
pub mod store;

// Re-export commonly used types
pub use container::{Container, Entry, Group, Payload, PayloadKind, PutOutcome};
pub use store::{ArchiveStore, LoadKind, StoreFailure, StoreReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
