//! JSON Loader
//!
//! A typed, fail-fast facade over parsed JSON documents. Callers never see
//! the parser's own representation: they get named [`NodeView`]s with typed
//! getters, array and object traversal, structural hashing and JSON Schema
//! validation.
//!
//! ## Features
//!
//! - **Borrowed Views**: every view borrows the [`Document`] it came from, so
//!   no view can outlive the parsed tree
//! - **Uniform Errors**: a missing or wrongly typed member is always an error
//!   naming the key and the enclosing node
//! - **Defaults for Absence Only**: `*_or` getters cover missing keys, never
//!   malformed values
//! - **Schema Validation**: JSON Schema checks with schema and document
//!   pointers at the point of failure
//!
//! ## Example
//!
//! ```
//! use json_loader::load_from_str;
//!
//! let doc = load_from_str(r#"{"listeners": [{"port": 80}], "debug": true}"#)?;
//! let root = doc.root();
//! assert!(root.get_boolean("debug")?);
//! assert_eq!(root.get_integer_or("workers", 4)?, 4);
//! for listener in root.get_object_array("listeners")? {
//!     assert_eq!(listener.get_integer("port")?, 80);
//! }
//! # Ok::<(), json_loader::JsonError>(())
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod loader;
pub mod node;
pub mod schema;
pub mod view;

pub use checksum::StructuralHash;
pub use config::{LimitsConfig, LoaderConfig};
pub use error::{ErrorKind, JsonError, Result};
pub use loader::{load_from_file, load_from_str, Document, Loader};
pub use node::NodeKind;
pub use schema::{SchemaDraft, ValidationOptions};
pub use view::NodeView;
