//! # Tessera
//!
//! Compiles visual filter expressions into safe, parameterized SQL.
//!
//! Tessera provides:
//! - A filter expression tree (groups of subgroups of conditions) edited by
//!   a filter UI
//! - A fixed operator catalog per property type
//! - A compiler emitting SQL whose identifiers all come from metadata and
//!   whose user input is always bound as parameters
//! - A validation oracle answering "can this filter be submitted?"
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let catalog = PropertyCatalog::new()
//!     .with_property(RecordType::Ticket, "tag", PropertyType::Text);
//!
//! let path = NodePath::new(0, 0, 0);
//! let expr = FilterExpression::new(RecordType::Ticket)
//!     .set_property(path, "tag")?
//!     .set_operator(path, "in")?
//!     .set_value(path, vec!["a", "b", "c"])?;
//!
//! let oracle = ValidationOracle::default();
//! assert!(oracle.is_valid(&expr, &catalog));
//!
//! if let Some(query) = oracle.submit(&expr, &catalog)? {
//!     let (sql, params) = query.to_sql(DatabaseType::MySQL);
//!     assert_eq!(sql, "SELECT * FROM ticket WHERE tag IN (?, ?, ?)");
//!     assert_eq!(params.len(), 3);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Record metadata and configuration.
pub mod schema {
    pub use tessera_schema::*;
}

/// Expressions, compiler, and validation.
pub mod query {
    pub use tessera_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::query::{
        CompileError, CompiledQuery, Condition, DatabaseType, EditError, FilterExpression,
        FilterValue, Group, MetadataCache, NodePath, PropertyResolver, SubGroup,
        ValidationOracle, compile, diagnose, operators_for, operators_for_name,
    };
    pub use crate::schema::{
        EmptyFilterPolicy, PropertyCatalog, PropertyType, RecordType, TesseraConfig,
    };
}

// Re-export key types at the crate root
pub use query::{CompileError, CompiledQuery, FilterExpression, ValidationOracle, compile};
pub use schema::{SchemaError, TesseraConfig};
