//! Compiles a [`FilterExpression`] into a parameterized [`CompiledQuery`].
//!
//! Identifiers in the output are never taken from the condition text: the
//! table comes from the [`RecordType`] and every column from the
//! [`PropertyResolver`]. User input only ever ends up in bound parameters.
//!
//! ```rust
//! use tessera_query::{compile, DatabaseType, FilterExpression, NodePath};
//! use tessera_schema::{PropertyCatalog, PropertyType, RecordType};
//!
//! let catalog = PropertyCatalog::new()
//!     .with_property(RecordType::Account, "name", PropertyType::Text);
//!
//! let path = NodePath::new(0, 0, 0);
//! let expr = FilterExpression::new(RecordType::Account)
//!     .set_property(path, "name")?
//!     .set_operator(path, "contains")?
//!     .set_value(path, "Acme")?;
//!
//! let query = compile(&expr, &catalog)?;
//! let (sql, params) = query.to_sql(DatabaseType::SQLite);
//! assert_eq!(sql, r"SELECT * FROM account WHERE name LIKE ? ESCAPE '\'");
//! assert_eq!(params[0].as_str(), Some("%Acme%"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use smallvec::smallvec;
use smol_str::SmolStr;
use tessera_schema::{PropertyCatalog, PropertyType, RecordType};
use tracing::{debug, trace, warn};

use crate::compiled::CompiledQuery;
use crate::error::{CompileError, CompileResult};
use crate::expression::{Condition, FilterExpression, NodePath};
use crate::filter::{Comparison, ParamList, Predicate};
use crate::operator::{Arity, Operator, resolve_operator};
use crate::sql::{escape_like_pattern, is_safe_identifier};
use crate::value::FilterValue;

/// A property as known to the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperty {
    /// Column emitted in SQL, owned by the metadata.
    pub column: SmolStr,
    /// Type deciding the legal operators and value coercion.
    pub property_type: PropertyType,
}

/// Source of property metadata for the compiler.
pub trait PropertyResolver {
    /// Resolve a property key for a record type.
    fn resolve(&self, record_type: RecordType, property: &str) -> Option<ResolvedProperty>;
}

impl PropertyResolver for PropertyCatalog {
    fn resolve(&self, record_type: RecordType, property: &str) -> Option<ResolvedProperty> {
        self.get(record_type, property)
            .map(|(key, property_type)| ResolvedProperty {
                column: key.clone(),
                property_type,
            })
    }
}

impl<R: PropertyResolver + ?Sized> PropertyResolver for &R {
    fn resolve(&self, record_type: RecordType, property: &str) -> Option<ResolvedProperty> {
        (**self).resolve(record_type, property)
    }
}

/// Adapts a type-lookup closure into a [`PropertyResolver`].
///
/// The column is the property key itself; keys that are not safe
/// identifiers are still rejected by the compiler.
#[derive(Debug, Clone, Copy)]
pub struct ResolverFn<F>(pub F);

impl<F> PropertyResolver for ResolverFn<F>
where
    F: Fn(RecordType, &str) -> Option<PropertyType>,
{
    fn resolve(&self, record_type: RecordType, property: &str) -> Option<ResolvedProperty> {
        (self.0)(record_type, property).map(|property_type| ResolvedProperty {
            column: SmolStr::new(property),
            property_type,
        })
    }
}

/// Wrap a closure as a resolver.
pub fn resolver_fn<F>(f: F) -> ResolverFn<F>
where
    F: Fn(RecordType, &str) -> Option<PropertyType>,
{
    ResolverFn(f)
}

/// Compile an expression, stopping at the first invalid condition.
///
/// Incomplete conditions are skipped. An expression with no complete
/// condition compiles to a query without a predicate.
pub fn compile<R>(expr: &FilterExpression, resolver: &R) -> CompileResult<CompiledQuery>
where
    R: PropertyResolver + ?Sized,
{
    let record_type = expr.record_type.ok_or(CompileError::EmptyRecordType)?;
    let predicate = fold_groups(expr, record_type, resolver, None)?;
    let query = CompiledQuery::new(record_type, predicate);

    debug!(
        record_type = %record_type,
        predicates = query.predicate_count(),
        params = query.param_count(),
        "compiled filter"
    );
    Ok(query)
}

/// Report every invalid condition, in walk order.
///
/// Returns an empty list exactly when [`compile`] succeeds.
pub fn diagnose<R>(expr: &FilterExpression, resolver: &R) -> Vec<CompileError>
where
    R: PropertyResolver + ?Sized,
{
    let Some(record_type) = expr.record_type else {
        return vec![CompileError::EmptyRecordType];
    };

    let mut errors = Vec::new();
    // Collect mode never returns Err.
    let _ = fold_groups(expr, record_type, resolver, Some(&mut errors));
    errors
}

/// Walk the tree and fold it: conditions AND, subgroups OR, groups AND.
///
/// With `errors` set, invalid conditions are recorded and left out of the
/// fold instead of aborting the walk.
fn fold_groups<R>(
    expr: &FilterExpression,
    record_type: RecordType,
    resolver: &R,
    mut errors: Option<&mut Vec<CompileError>>,
) -> CompileResult<Option<Predicate>>
where
    R: PropertyResolver + ?Sized,
{
    let mut groups = Vec::with_capacity(expr.groups.len());
    for (g, group) in expr.groups.iter().enumerate() {
        let mut sub_groups = Vec::with_capacity(group.sub_groups.len());
        for (s, sub_group) in group.sub_groups.iter().enumerate() {
            let mut comparisons = Vec::with_capacity(sub_group.conditions.len());
            for (c, condition) in sub_group.conditions.iter().enumerate() {
                let path = NodePath::new(g, s, c);
                match compile_condition(record_type, path, condition, resolver) {
                    Ok(Some(cmp)) => comparisons.push(Predicate::Compare(cmp)),
                    Ok(None) => {}
                    Err(err) => match errors.as_deref_mut() {
                        Some(errors) => errors.push(err),
                        None => return Err(err),
                    },
                }
            }
            sub_groups.extend(Predicate::and(comparisons));
        }
        groups.extend(Predicate::or(sub_groups));
    }
    Ok(Predicate::and(groups))
}

fn compile_condition<R>(
    record_type: RecordType,
    path: NodePath,
    condition: &Condition,
    resolver: &R,
) -> CompileResult<Option<Comparison>>
where
    R: PropertyResolver + ?Sized,
{
    let property = condition.property.trim();
    let operator_key = condition.operator.trim();
    if property.is_empty() || operator_key.is_empty() {
        trace!(%path, "skipping incomplete condition");
        return Ok(None);
    }

    let resolved = resolver
        .resolve(record_type, property)
        .filter(|resolved| {
            let safe = is_safe_identifier(&resolved.column);
            if !safe {
                warn!(
                    record_type = %record_type,
                    column = %resolved.column,
                    "metadata column is not a safe identifier"
                );
            }
            safe
        })
        .ok_or_else(|| CompileError::UnknownProperty {
            path,
            property: property.to_string(),
        })?;

    let operator = resolve_operator(resolved.property_type, operator_key).map_err(|_| {
        CompileError::UnknownOperator {
            path,
            property: property.to_string(),
            operator: operator_key.to_string(),
        }
    })?;

    let params = bind_params(operator, resolved.property_type, &condition.value).map_err(
        |reason| CompileError::InvalidValue {
            path,
            property: property.to_string(),
            reason,
        },
    )?;

    Ok(Some(Comparison {
        table: record_type.table_name(),
        column: resolved.column,
        op: operator.sql,
        params,
        path,
    }))
}

/// Check the value against the operator's arity and coerce it to the
/// property type.
fn bind_params(
    operator: &Operator,
    property_type: PropertyType,
    value: &FilterValue,
) -> Result<ParamList, String> {
    match operator.arity {
        Arity::Scalar => {
            let bound = coerce(property_type, value)?;
            let bound = match (operator.wildcard, bound) {
                (Some(wildcard), FilterValue::String(text)) => {
                    FilterValue::String(wildcard.apply(&escape_like_pattern(&text)))
                }
                (_, bound) => bound,
            };
            Ok(smallvec![bound])
        }
        Arity::Pair => {
            let items = expect_list(value)?;
            if items.len() != 2 {
                return Err(format!("expected exactly two values, got {}", items.len()));
            }
            items.iter().map(|v| coerce(property_type, v)).collect()
        }
        Arity::List => {
            let items = expect_list(value)?;
            if items.is_empty() {
                return Err("expected at least one value".to_string());
            }
            items.iter().map(|v| coerce(property_type, v)).collect()
        }
    }
}

fn expect_list(value: &FilterValue) -> Result<&[FilterValue], String> {
    value
        .as_list()
        .ok_or_else(|| format!("expected a list, got {}", value.kind()))
}

fn coerce(property_type: PropertyType, value: &FilterValue) -> Result<FilterValue, String> {
    match (property_type, value) {
        (_, FilterValue::Null) => Err("a value is required".to_string()),
        (_, FilterValue::List(_) | FilterValue::Json(_)) => {
            Err(format!("expected a single value, got {}", value.kind()))
        }

        (PropertyType::Text, FilterValue::String(_)) => Ok(value.clone()),
        (PropertyType::Text, other) => Ok(FilterValue::String(other.to_string())),

        (PropertyType::Number, FilterValue::Int(_)) => Ok(value.clone()),
        (PropertyType::Number, FilterValue::Float(x)) if x.is_finite() => Ok(value.clone()),
        (PropertyType::Number, FilterValue::Float(_)) => Err("number must be finite".to_string()),
        (PropertyType::Number, FilterValue::String(s)) => parse_number(s),

        (PropertyType::Boolean, FilterValue::Bool(_)) => Ok(value.clone()),
        (PropertyType::Boolean, FilterValue::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                _ => Err(format!("`{}` is not a boolean", s)),
            }
        }

        (PropertyType::Date, FilterValue::String(s)) => parse_date(s),

        (ty, other) => Err(format!("expected a {} value, got {}", ty, other.kind())),
    }
}

fn parse_number(s: &str) -> Result<FilterValue, String> {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(FilterValue::Int(i));
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(FilterValue::Float(x)),
        _ => Err(format!("`{}` is not a number", s)),
    }
}

/// Accepts RFC 3339 timestamps and `YYYY-MM-DD` dates, bound as text.
fn parse_date(s: &str) -> Result<FilterValue, String> {
    let trimmed = s.trim();
    let valid = chrono::DateTime::parse_from_rfc3339(trimmed).is_ok()
        || chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok();
    if valid {
        Ok(FilterValue::String(trimmed.to_string()))
    } else {
        Err(format!("`{}` is not a date", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Group, SubGroup};
    use crate::operator::SqlOp;
    use crate::sql::DatabaseType;
    use pretty_assertions::assert_eq;

    fn catalog() -> PropertyCatalog {
        PropertyCatalog::new()
            .with_property(RecordType::Account, "name", PropertyType::Text)
            .with_property(RecordType::Account, "employees", PropertyType::Number)
            .with_property(RecordType::Account, "is_active", PropertyType::Boolean)
            .with_property(RecordType::Account, "created_at", PropertyType::Date)
            .with_property(RecordType::Account, "order", PropertyType::Number)
    }

    fn single(property: &str, operator: &str, value: impl Into<FilterValue>) -> FilterExpression {
        FilterExpression::from_groups(
            RecordType::Account,
            [Group::new([SubGroup::new([Condition::new(
                property, operator, value,
            )])])],
        )
    }

    fn sql(expr: &FilterExpression) -> (String, Vec<FilterValue>) {
        compile(expr, &catalog())
            .unwrap()
            .to_sql(DatabaseType::PostgreSQL)
    }

    #[test]
    fn test_missing_record_type() {
        let mut expr = single("name", "equals", "x");
        expr.record_type = None;
        assert_eq!(compile(&expr, &catalog()), Err(CompileError::EmptyRecordType));
        assert_eq!(diagnose(&expr, &catalog()), vec![CompileError::EmptyRecordType]);
    }

    #[test]
    fn test_blank_expression_compiles_empty() {
        let query = compile(&FilterExpression::new(RecordType::Account), &catalog()).unwrap();
        assert!(query.is_empty());
        assert_eq!(query.to_sql(DatabaseType::MySQL).0, "SELECT * FROM account");
    }

    #[test]
    fn test_text_pattern_escapes_user_text() {
        let (text, params) = sql(&single("name", "startsWith", "50%_off"));
        assert_eq!(text, r"SELECT * FROM account WHERE name LIKE $1 ESCAPE '\'");
        assert_eq!(params, vec![FilterValue::from(r"50\%\_off%")]);

        let (_, params) = sql(&single("name", "notEndsWith", "Inc"));
        assert_eq!(params, vec![FilterValue::from("%Inc")]);
    }

    #[test]
    fn test_text_coerces_scalars_to_strings() {
        let (_, params) = sql(&single("name", "equals", 42));
        assert_eq!(params, vec![FilterValue::from("42")]);
    }

    #[test]
    fn test_number_coercion() {
        let (sql_text, params) = sql(&single("employees", "greaterThanOrEqual", "250"));
        assert_eq!(sql_text, "SELECT * FROM account WHERE employees >= $1");
        assert_eq!(params, vec![FilterValue::Int(250)]);

        let (_, params) = sql(&single("employees", "lessThan", " 2.5 "));
        assert_eq!(params, vec![FilterValue::Float(2.5)]);

        let err = compile(&single("employees", "equals", "lots"), &catalog()).unwrap_err();
        assert_eq!(err.code(), "invalid_value");
        let err = compile(&single("employees", "equals", true), &catalog()).unwrap_err();
        assert_eq!(err.code(), "invalid_value");
    }

    #[test]
    fn test_boolean_coercion() {
        let (sql_text, params) = sql(&single("is_active", "isNot", "TRUE"));
        assert_eq!(sql_text, "SELECT * FROM account WHERE is_active <> $1");
        assert_eq!(params, vec![FilterValue::Bool(true)]);
        assert!(compile(&single("is_active", "is", "yes"), &catalog()).is_err());
    }

    #[test]
    fn test_date_values() {
        let (sql_text, params) = sql(&single(
            "created_at",
            "between",
            vec!["2024-01-01", "2024-12-31T23:59:59Z"],
        ));
        assert_eq!(
            sql_text,
            "SELECT * FROM account WHERE created_at BETWEEN $1 AND $2"
        );
        assert_eq!(params.len(), 2);

        let err = compile(&single("created_at", "before", "last tuesday"), &catalog()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidValue { .. }));
    }

    #[test]
    fn test_between_requires_two_values() {
        for value in [vec![], vec![1], vec![1, 2, 3]] {
            let err = compile(&single("employees", "between", value), &catalog()).unwrap_err();
            assert_eq!(err.code(), "invalid_value");
        }
        let err = compile(&single("employees", "between", 5), &catalog()).unwrap_err();
        assert_eq!(err.code(), "invalid_value");
    }

    #[test]
    fn test_in_list() {
        let (sql_text, params) = sql(&single("name", "notIn", vec!["a", "b"]));
        assert_eq!(sql_text, "SELECT * FROM account WHERE name NOT IN ($1, $2)");
        assert_eq!(params.len(), 2);

        let empty: Vec<String> = Vec::new();
        assert!(compile(&single("name", "in", empty), &catalog()).is_err());
    }

    #[test]
    fn test_scalar_rejects_null_and_lists() {
        let err = compile(&single("name", "equals", FilterValue::Null), &catalog()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for `name` at groups[0].subGroups[0].conditions[0]: a value is required"
        );
        assert!(compile(&single("name", "equals", vec!["a"]), &catalog()).is_err());
    }

    #[test]
    fn test_unknown_property_and_operator() {
        let err = compile(&single("nickname", "equals", "x"), &catalog()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownProperty {
                path: NodePath::new(0, 0, 0),
                property: "nickname".into(),
            }
        );

        let err = compile(&single("is_active", "contains", "x"), &catalog()).unwrap_err();
        assert_eq!(err.code(), "unknown_operator");
    }

    #[test]
    fn test_reserved_column_is_quoted() {
        let (sql_text, _) = sql(&single("order", "equals", 1));
        assert_eq!(sql_text, "SELECT * FROM account WHERE \"order\" = $1");
    }

    #[test]
    fn test_reserved_identifiers_use_backticks_on_mysql() {
        let catalog =
            PropertyCatalog::new().with_property(RecordType::User, "order", PropertyType::Number);
        let expr = FilterExpression::from_groups(
            RecordType::User,
            [Group::new([SubGroup::new([Condition::new("order", "equals", 1)])])],
        );

        let (sql_text, params) = compile(&expr, &catalog)
            .unwrap()
            .to_sql(DatabaseType::MySQL);
        assert_eq!(sql_text, "SELECT * FROM `user` WHERE `order` = ?");
        assert_eq!(params, vec![FilterValue::Int(1)]);
    }

    #[test]
    fn test_unsafe_metadata_column_rejected() {
        let catalog = PropertyCatalog::new().with_property(
            RecordType::Account,
            "name; DROP TABLE account",
            PropertyType::Text,
        );
        let expr = single("name; DROP TABLE account", "equals", "x");
        assert_eq!(compile(&expr, &catalog).unwrap_err().code(), "unknown_property");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = resolver_fn(|rt, key| match (rt, key) {
            (RecordType::Account, "age") => Some(PropertyType::Number),
            _ => None,
        });
        let query = compile(&single("age", "greaterThan", 30), &resolver).unwrap();
        let cmp = query.predicate.as_ref().unwrap().comparisons()[0].clone();
        assert_eq!(cmp.column, "age");
        assert_eq!(cmp.op, SqlOp::Gt);
        assert_eq!(cmp.table, "account");
    }

    #[test]
    fn test_diagnose_reports_every_error() {
        let expr = FilterExpression::from_groups(
            RecordType::Account,
            [
                Group::new([SubGroup::new([
                    Condition::new("nickname", "equals", "x"),
                    Condition::new("name", "equals", "ok"),
                ])]),
                Group::new([SubGroup::new([
                    Condition::incomplete(),
                    Condition::new("employees", "between", vec![1]),
                ])]),
            ],
        );

        let errors = diagnose(&expr, &catalog());
        let paths: Vec<_> = errors.iter().filter_map(CompileError::path).collect();
        assert_eq!(paths, vec![NodePath::new(0, 0, 0), NodePath::new(1, 0, 1)]);

        assert_eq!(compile(&expr, &catalog()).unwrap_err(), errors[0]);
        assert!(diagnose(&single("name", "equals", "x"), &catalog()).is_empty());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let expr = single("name", "contains", "Acme");
        assert_eq!(compile(&expr, &catalog()), compile(&expr, &catalog()));
    }
}
