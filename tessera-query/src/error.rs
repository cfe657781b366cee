//! Error types for compiling, editing, and parsing filters.
//!
//! Compile errors carry the [`NodePath`] of the offending condition so the
//! filter UI can highlight it. Incomplete conditions (no property or no
//! operator yet) are never errors; only a chosen-but-malformed
//! property/operator/value combination is.
//!
//! ```rust
//! use tessera_query::{CompileError, NodePath};
//!
//! let err = CompileError::InvalidValue {
//!     path: NodePath::new(0, 1, 2),
//!     property: "age".into(),
//!     reason: "expected a number, got boolean".into(),
//! };
//! assert_eq!(err.path(), Some(NodePath::new(0, 1, 2)));
//! assert_eq!(err.code(), "invalid_value");
//! ```

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use crate::expression::NodePath;

/// Result type for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors produced when compiling a filter expression.
#[derive(Error, Debug, Clone, PartialEq, Diagnostic)]
pub enum CompileError {
    /// The expression has no record type.
    #[error("filter has no record type")]
    #[diagnostic(
        code(tessera::compile::empty_record_type),
        help("choose a record type before adding conditions")
    )]
    EmptyRecordType,

    /// The property is not in the metadata for the record type.
    #[error("unknown property `{property}` at {path}")]
    #[diagnostic(code(tessera::compile::unknown_property))]
    UnknownProperty { path: NodePath, property: String },

    /// The operator is not legal for the property's type.
    #[error("operator `{operator}` is not valid for property `{property}` at {path}")]
    #[diagnostic(code(tessera::compile::unknown_operator))]
    UnknownOperator {
        path: NodePath,
        property: String,
        operator: String,
    },

    /// The value does not fit the operator's arity or the property's type.
    #[error("invalid value for `{property}` at {path}: {reason}")]
    #[diagnostic(code(tessera::compile::invalid_value))]
    InvalidValue {
        path: NodePath,
        property: String,
        reason: String,
    },
}

impl CompileError {
    /// Path of the offending condition, if the error concerns one.
    pub fn path(&self) -> Option<NodePath> {
        match self {
            Self::EmptyRecordType => None,
            Self::UnknownProperty { path, .. }
            | Self::UnknownOperator { path, .. }
            | Self::InvalidValue { path, .. } => Some(*path),
        }
    }

    /// Stable short code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyRecordType => "empty_record_type",
            Self::UnknownProperty { .. } => "unknown_property",
            Self::UnknownOperator { .. } => "unknown_operator",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}

/// Errors produced by expression edits addressing nodes that do not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum EditError {
    /// No group at that index.
    #[error("group {group} does not exist")]
    #[diagnostic(code(tessera::edit::group_out_of_range))]
    GroupOutOfRange { group: usize },

    /// No subgroup at that index.
    #[error("subgroup {sub_group} of group {group} does not exist")]
    #[diagnostic(code(tessera::edit::sub_group_out_of_range))]
    SubGroupOutOfRange { group: usize, sub_group: usize },

    /// No condition at that path.
    #[error("condition {path} does not exist")]
    #[diagnostic(code(tessera::edit::condition_out_of_range))]
    ConditionOutOfRange { path: NodePath },
}

/// Errors produced when reading an expression from JSON.
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    /// The payload exceeds the accepted size.
    #[error("filter JSON is {size} bytes, the limit is {limit}")]
    #[diagnostic(code(tessera::parse::too_large))]
    TooLarge { size: usize, limit: usize },

    /// The payload is not a valid filter expression.
    #[error("invalid filter JSON")]
    #[diagnostic(code(tessera::parse::json))]
    Json(#[from] serde_json::Error),
}

/// Errors reported by external metadata, value, and query collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ProviderError {
    /// The collaborator could not answer.
    #[error("{provider} unavailable: {message}")]
    #[diagnostic(code(tessera::provider::unavailable))]
    Unavailable {
        provider: &'static str,
        message: String,
    },

    /// Paging through a collaborator stopped making progress.
    #[error("{provider} paging stalled at page {page}: {message}")]
    #[diagnostic(code(tessera::provider::stalled))]
    Stalled {
        provider: &'static str,
        page: u32,
        message: String,
    },

    /// The query executor rejected or failed a query.
    #[error("query execution failed: {message}")]
    #[diagnostic(code(tessera::provider::execution))]
    Execution { message: String },
}

impl ProviderError {
    /// Create an unavailable error.
    pub fn unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider,
            message: message.into(),
        }
    }

    /// Create a stalled-paging error.
    pub fn stalled(provider: &'static str, page: u32, message: impl Into<String>) -> Self {
        Self::Stalled {
            provider,
            page,
            message: message.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }
}
