//! # tessera-schema
//!
//! Record metadata and configuration for the Tessera filter compiler.
//!
//! This crate provides:
//! - The closed set of [`RecordType`]s a filter can target
//! - [`PropertyType`]s and the [`PropertyCatalog`] metadata snapshot
//! - Configuration parser for `tessera.toml` files
//!
//! ## Example
//!
//! ```rust
//! use tessera_schema::{PropertyCatalog, PropertyType, RecordType};
//!
//! let catalog = PropertyCatalog::new()
//!     .with_property(RecordType::Account, "name", PropertyType::Text)
//!     .with_property(RecordType::Account, "employees", PropertyType::Number);
//!
//! assert_eq!(
//!     catalog.property_type(RecordType::Account, "employees"),
//!     Some(PropertyType::Number)
//! );
//! assert_eq!(RecordType::Account.table_name(), "account");
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{PropertyCatalog, PropertyMap};
pub use config::{DatabaseProvider, EmptyFilterPolicy, TesseraConfig};
pub use error::{SchemaError, SchemaResult};
pub use types::{PropertyType, RecordType, deserialize_optional_record_type};
