//! # tessera-query
//!
//! Filter expression compiler for Tessera.
//!
//! This crate provides:
//! - The [`FilterExpression`] tree edited by the filter UI (groups of
//!   subgroups of conditions) with copy-on-write edits
//! - The operator registry: which operators each property type offers
//! - The compiler, turning an expression into parameterized SQL
//! - The [`ValidationOracle`] deciding whether a filter may be submitted
//! - Provider traits and the [`MetadataCache`] feeding property metadata to
//!   the compiler
//!
//! ## Compiling
//!
//! ```rust
//! use tessera_query::{compile, DatabaseType, FilterExpression, NodePath};
//! use tessera_schema::{PropertyCatalog, PropertyType, RecordType};
//!
//! let catalog = PropertyCatalog::new()
//!     .with_property(RecordType::Contact, "age", PropertyType::Number);
//!
//! // age > 30 OR age < 18
//! let expr = FilterExpression::new(RecordType::Contact).add_sub_group(0)?;
//! let first = NodePath::new(0, 0, 0);
//! let second = NodePath::new(0, 1, 0);
//! let expr = expr
//!     .set_property(first, "age")?
//!     .set_operator(first, "greaterThan")?
//!     .set_value(first, 30)?
//!     .set_property(second, "age")?
//!     .set_operator(second, "lessThan")?
//!     .set_value(second, 18)?;
//!
//! let (sql, params) = compile(&expr, &catalog)?.to_sql(DatabaseType::SQLite);
//! assert_eq!(sql, "SELECT * FROM contact WHERE (age > ?) OR (age < ?)");
//! assert_eq!(params.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Operators
//!
//! ```rust
//! use tessera_query::operator::operators_for_name;
//!
//! let keys: Vec<_> = operators_for_name("boolean").iter().map(|op| op.key).collect();
//! assert_eq!(keys, ["is", "isNot"]);
//! ```

pub mod cache;
pub mod compiled;
pub mod compiler;
pub mod error;
pub mod expression;
pub mod filter;
pub mod logging;
pub mod operator;
pub mod oracle;
pub mod pagination;
pub mod provider;
pub mod sql;
pub mod value;

pub use cache::MetadataCache;
pub use compiled::CompiledQuery;
pub use compiler::{PropertyResolver, ResolvedProperty, ResolverFn, compile, diagnose, resolver_fn};
pub use error::{CompileError, CompileResult, EditError, ParseError, ProviderError};
pub use expression::{Condition, FilterExpression, Group, MAX_FILTER_JSON_SIZE, NodePath, SubGroup};
pub use filter::{Comparison, Predicate};
pub use operator::{
    Arity, Operator, OperatorNotFound, SqlOp, Wildcard, operators_for, operators_for_name,
    resolve_operator,
};
pub use oracle::ValidationOracle;
pub use pagination::Page;
pub use provider::{
    DistinctValueProvider, PropertyMetadataProvider, ProviderResult, QueryExecutor, Row,
    StaticMetadataProvider, StaticValueProvider,
};
pub use sql::{DatabaseType, SqlBuilder};
pub use value::FilterValue;
