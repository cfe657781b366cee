//! Operator registry.
//!
//! Each [`PropertyType`] has a fixed, ordered set of operators. The order is
//! the order the filter UI lists them in, so it is part of the contract.
//!
//! ```rust
//! use tessera_query::operator::{operators_for, operators_for_name, resolve_operator, Arity};
//! use tessera_schema::PropertyType;
//!
//! let between = resolve_operator(PropertyType::Number, "between").unwrap();
//! assert_eq!(between.arity, Arity::Pair);
//!
//! // Unknown types are filtered as text.
//! assert_eq!(operators_for_name("picklist"), operators_for(PropertyType::Text));
//! ```

use serde::Serialize;
use std::fmt;
use tessera_schema::PropertyType;
use thiserror::Error;

/// How many values an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// Exactly one value.
    Scalar,
    /// Exactly two values, as a two-element list.
    Pair,
    /// One or more values, as a list.
    List,
}

/// The SQL comparison an operator compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SqlOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
    /// `BETWEEN ... AND ...`
    Between,
}

impl SqlOp {
    /// Get the SQL keyword or symbol.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for SqlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Where `%` goes around a pattern-matching value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Wildcard {
    /// `%value%`
    Contains,
    /// `value%`
    StartsWith,
    /// `%value`
    EndsWith,
}

impl Wildcard {
    /// Wrap an already-escaped value in wildcards.
    pub fn apply(&self, escaped: &str) -> String {
        match self {
            Self::Contains => format!("%{}%", escaped),
            Self::StartsWith => format!("{}%", escaped),
            Self::EndsWith => format!("%{}", escaped),
        }
    }
}

/// One entry in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operator {
    /// Key used by the filter UI and in serialized expressions.
    pub key: &'static str,
    /// Label shown in operator dropdowns.
    pub label: &'static str,
    /// Number of values expected.
    pub arity: Arity,
    /// SQL comparison emitted.
    pub sql: SqlOp,
    /// Wildcards applied to the bound value, for pattern operators.
    pub wildcard: Option<Wildcard>,
}

impl Operator {
    const fn scalar(key: &'static str, label: &'static str, sql: SqlOp) -> Self {
        Self {
            key,
            label,
            arity: Arity::Scalar,
            sql,
            wildcard: None,
        }
    }

    const fn pattern(key: &'static str, label: &'static str, sql: SqlOp, wildcard: Wildcard) -> Self {
        Self {
            key,
            label,
            arity: Arity::Scalar,
            sql,
            wildcard: Some(wildcard),
        }
    }

    const fn list(key: &'static str, label: &'static str, sql: SqlOp) -> Self {
        Self {
            key,
            label,
            arity: Arity::List,
            sql,
            wildcard: None,
        }
    }

    const fn between(label: &'static str) -> Self {
        Self {
            key: "between",
            label,
            arity: Arity::Pair,
            sql: SqlOp::Between,
            wildcard: None,
        }
    }
}

/// Operators for text properties.
pub static TEXT_OPERATORS: [Operator; 10] = [
    Operator::scalar("equals", "Equals", SqlOp::Eq),
    Operator::pattern("contains", "Contains", SqlOp::Like, Wildcard::Contains),
    Operator::pattern("startsWith", "Starts with", SqlOp::Like, Wildcard::StartsWith),
    Operator::pattern("endsWith", "Ends with", SqlOp::Like, Wildcard::EndsWith),
    Operator::pattern("notContains", "Does not contain", SqlOp::NotLike, Wildcard::Contains),
    Operator::pattern("notStartsWith", "Does not start with", SqlOp::NotLike, Wildcard::StartsWith),
    Operator::pattern("notEndsWith", "Does not end with", SqlOp::NotLike, Wildcard::EndsWith),
    Operator::scalar("notEquals", "Does not equal", SqlOp::NotEq),
    Operator::list("in", "Is any of", SqlOp::In),
    Operator::list("notIn", "Is none of", SqlOp::NotIn),
];

/// Operators for number properties.
pub static NUMBER_OPERATORS: [Operator; 6] = [
    Operator::scalar("equals", "Equals", SqlOp::Eq),
    Operator::scalar("greaterThan", "Greater than", SqlOp::Gt),
    Operator::scalar("lessThan", "Less than", SqlOp::Lt),
    Operator::scalar("lessThanOrEqual", "Less than or equal", SqlOp::Lte),
    Operator::scalar("greaterThanOrEqual", "Greater than or equal", SqlOp::Gte),
    Operator::between("Between"),
];

/// Operators for boolean properties.
pub static BOOLEAN_OPERATORS: [Operator; 2] = [
    Operator::scalar("is", "Is", SqlOp::Eq),
    Operator::scalar("isNot", "Is not", SqlOp::NotEq),
];

/// Operators for date properties.
pub static DATE_OPERATORS: [Operator; 3] = [
    Operator::scalar("before", "Before", SqlOp::Lt),
    Operator::scalar("after", "After", SqlOp::Gt),
    Operator::between("Between"),
];

/// The operator key is not legal for the property type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operator `{key}` is not available for {property_type} properties")]
pub struct OperatorNotFound {
    /// The property type looked up.
    pub property_type: PropertyType,
    /// The operator key that did not match.
    pub key: String,
}

/// All operators legal for a property type, in display order.
pub fn operators_for(property_type: PropertyType) -> &'static [Operator] {
    match property_type {
        PropertyType::Text => &TEXT_OPERATORS,
        PropertyType::Number => &NUMBER_OPERATORS,
        PropertyType::Boolean => &BOOLEAN_OPERATORS,
        PropertyType::Date => &DATE_OPERATORS,
    }
}

/// Operators for a property type given by name.
///
/// Unrecognised names get the text operators.
pub fn operators_for_name(type_name: &str) -> &'static [Operator] {
    operators_for(PropertyType::from_name(type_name))
}

/// Find an operator by key for a property type.
pub fn resolve_operator(
    property_type: PropertyType,
    key: &str,
) -> Result<&'static Operator, OperatorNotFound> {
    operators_for(property_type)
        .iter()
        .find(|op| op.key == key)
        .ok_or_else(|| OperatorNotFound {
            property_type,
            key: key.to_string(),
        })
}

/// Arity of an operator key in any catalog.
///
/// Keys shared between catalogs (`equals`, `between`) have the same arity
/// everywhere, so the lookup does not need the property type.
pub fn arity_for_key(key: &str) -> Option<Arity> {
    let catalogs: [&[Operator]; 4] = [
        &TEXT_OPERATORS,
        &NUMBER_OPERATORS,
        &BOOLEAN_OPERATORS,
        &DATE_OPERATORS,
    ];
    catalogs
        .into_iter()
        .flatten()
        .find(|op| op.key == key)
        .map(|op| op.arity)
}
