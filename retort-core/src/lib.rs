//! # Retort Core
//!
//! Fundamental building blocks for Retort, the synthesis-record archiver:
//! - The leaf value model and the `Storable` record interface
//! - Hierarchical path arithmetic
//! - The pure graph → path/value flattener
//! - Error types, configuration, metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  retort-core                    │
//! ├─────────────────────────────────────────────────┤
//! │  • value    - Leaf value sum type               │
//! │  • record   - Storable trait + traversal nodes  │
//! │  • path     - Slash-delimited addresses         │
//! │  • flatten  - Graph → ordered path/value map    │
//! │  • error    - Error handling                    │
//! │  • config   - Layout & store configuration      │
//! │  • metrics  - Store activity counters           │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod metrics;
pub mod path;
pub mod record;
pub mod value;

// Re-export commonly used types
pub use config::{Config, LayoutConfig, StoreConfig};
pub use error::{Error, Result};
pub use flatten::{flatten, flatten_with_layout, FlatMap};
pub use path::TreePath;
pub use record::{Node, Storable};
pub use value::{Quantity, Scalar, Table, Value};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
