//! Integration tests for compiling filter expressions to SQL.
//!
//! Each test builds an expression the way the filter UI does, through
//! copy-on-write edits, and checks the rendered SQL and bound parameters.

use pretty_assertions::assert_eq;
use tessera::prelude::*;
use tessera::query::{Arity, ParseError, Predicate};

fn catalog() -> PropertyCatalog {
    PropertyCatalog::new()
        .with_property(RecordType::Contact, "name", PropertyType::Text)
        .with_property(RecordType::Contact, "age", PropertyType::Number)
        .with_property(RecordType::Contact, "tag", PropertyType::Text)
        .with_property(RecordType::Contact, "subscribed", PropertyType::Boolean)
        .with_property(RecordType::Contact, "signed_up", PropertyType::Date)
}

fn fill(
    expr: FilterExpression,
    path: NodePath,
    property: &str,
    operator: &str,
    value: impl Into<FilterValue>,
) -> FilterExpression {
    expr.set_property(path, property)
        .and_then(|e| e.set_operator(path, operator))
        .and_then(|e| e.set_value(path, value))
        .expect("edit within the tree")
}

fn render(expr: &FilterExpression) -> (String, Vec<FilterValue>) {
    compile(expr, &catalog())
        .expect("expression compiles")
        .to_sql(DatabaseType::SQLite)
}

/// `name contains "Acme"`
#[test]
fn test_contains_binds_wildcards() {
    let expr = fill(
        FilterExpression::new(RecordType::Contact),
        NodePath::new(0, 0, 0),
        "name",
        "contains",
        "Acme",
    );

    let (sql, params) = render(&expr);
    insta::assert_snapshot!(sql, @r"SELECT * FROM contact WHERE name LIKE ? ESCAPE '\'");
    assert_eq!(params, vec![FilterValue::from("%Acme%")]);
}

/// One group, two subgroups: `age > 30` OR `age < 18`.
#[test]
fn test_subgroups_are_ored() {
    let expr = FilterExpression::new(RecordType::Contact)
        .add_sub_group(0)
        .unwrap();
    let expr = fill(expr, NodePath::new(0, 0, 0), "age", "greaterThan", 30);
    let expr = fill(expr, NodePath::new(0, 1, 0), "age", "lessThan", 18);

    let (sql, params) = render(&expr);
    assert_eq!(sql, "SELECT * FROM contact WHERE (age > ?) OR (age < ?)");
    assert_eq!(params, vec![FilterValue::Int(30), FilterValue::Int(18)]);
}

/// Two groups are ANDed.
#[test]
fn test_groups_are_anded() {
    let expr = FilterExpression::new(RecordType::Contact).add_group();
    let expr = fill(expr, NodePath::new(0, 0, 0), "subscribed", "is", true);
    let expr = fill(expr, NodePath::new(1, 0, 0), "name", "notEquals", "Bob");

    let (sql, params) = render(&expr);
    assert_eq!(
        sql,
        "SELECT * FROM contact WHERE (subscribed = ?) AND (name <> ?)"
    );
    assert_eq!(params, vec![FilterValue::Bool(true), FilterValue::from("Bob")]);
}

/// `tag in ["a", "b", "c"]`
#[test]
fn test_in_binds_each_value() {
    let expr = fill(
        FilterExpression::new(RecordType::Contact),
        NodePath::new(0, 0, 0),
        "tag",
        "in",
        vec!["a", "b", "c"],
    );

    let (sql, params) = render(&expr);
    assert_eq!(sql, "SELECT * FROM contact WHERE tag IN (?, ?, ?)");
    assert_eq!(params.len(), 3);
}

/// Conditions within a subgroup are ANDed and nest inside the OR.
#[test]
fn test_nested_fold() {
    let expr = FilterExpression::new(RecordType::Contact)
        .add_condition(0, 0)
        .and_then(|e| e.add_sub_group(0))
        .unwrap();
    let expr = fill(expr, NodePath::new(0, 0, 0), "age", "between", vec![18, 30]);
    let expr = fill(expr, NodePath::new(0, 0, 1), "signed_up", "after", "2024-06-01");
    let expr = fill(expr, NodePath::new(0, 1, 0), "tag", "startsWith", "vip");

    let (sql, params) = compile(&expr, &catalog())
        .unwrap()
        .to_sql(DatabaseType::PostgreSQL);
    insta::assert_snapshot!(
        sql,
        @r"SELECT * FROM contact WHERE ((age BETWEEN $1 AND $2) AND (signed_up > $3)) OR (tag LIKE $4 ESCAPE '\')"
    );
    assert_eq!(
        params,
        vec![
            FilterValue::Int(18),
            FilterValue::Int(30),
            FilterValue::from("2024-06-01"),
            FilterValue::from("vip%"),
        ]
    );
}

#[test]
fn test_incomplete_conditions_are_skipped() {
    let blank = FilterExpression::new(RecordType::Contact)
        .add_group()
        .add_sub_group(1)
        .unwrap();
    let query = compile(&blank, &catalog()).unwrap();
    assert!(query.predicate.is_none());

    // Property chosen but no operator yet.
    let half = blank
        .set_property(NodePath::new(1, 1, 0), "age")
        .unwrap();
    assert!(compile(&half, &catalog()).unwrap().is_empty());

    let one = fill(half, NodePath::new(1, 1, 0), "age", "equals", 40);
    let (sql, _) = render(&one);
    assert_eq!(sql, "SELECT * FROM contact WHERE age = ?");
}

#[test]
fn test_removing_last_condition_drops_its_subgroup() {
    let expr = FilterExpression::new(RecordType::Contact)
        .add_sub_group(0)
        .unwrap();
    let expr = fill(expr, NodePath::new(0, 0, 0), "age", "greaterThan", 30);
    let expr = fill(expr, NodePath::new(0, 1, 0), "age", "lessThan", 18);

    let removed = expr.remove_condition(NodePath::new(0, 1, 0)).unwrap();
    assert_eq!(removed.groups[0].sub_groups.len(), 1);
    let (sql, _) = render(&removed);
    assert_eq!(sql, "SELECT * FROM contact WHERE age > ?");

    let emptied = removed.remove_condition(NodePath::new(0, 0, 0)).unwrap();
    assert!(emptied.groups.is_empty());
    assert!(compile(&emptied, &catalog()).unwrap().is_empty());
}

#[test]
fn test_identifiers_come_from_metadata() {
    let expr = fill(
        FilterExpression::new(RecordType::Contact),
        NodePath::new(0, 0, 0),
        "name\"; DROP TABLE contact; --",
        "equals",
        "x",
    );
    let err = compile(&expr, &catalog()).unwrap_err();
    assert!(matches!(err, CompileError::UnknownProperty { .. }));

    let expr = fill(
        FilterExpression::new(RecordType::Contact),
        NodePath::new(0, 0, 0),
        "name",
        "equals",
        "'; DROP TABLE contact; --",
    );
    let query = compile(&expr, &catalog()).unwrap();
    let (sql, params) = query.to_sql(DatabaseType::PostgreSQL);
    assert!(!sql.contains("DROP"));
    assert_eq!(params.len(), 1);
    for column in query.columns() {
        assert!(catalog().contains(RecordType::Contact, &column));
    }
}

/// Every operator of every property type emits only catalog columns.
#[test]
fn test_every_operator_emits_catalog_columns() {
    let catalog = catalog();
    let cases: [(PropertyType, &str, FilterValue, FilterValue); 4] = [
        (PropertyType::Text, "name", "x".into(), "y".into()),
        (PropertyType::Number, "age", 5.into(), 10.into()),
        (PropertyType::Boolean, "subscribed", true.into(), false.into()),
        (PropertyType::Date, "signed_up", "2024-01-01".into(), "2024-12-31".into()),
    ];

    for (property_type, property, low, high) in cases {
        for operator in operators_for(property_type) {
            let value = match operator.arity {
                Arity::Scalar => low.clone(),
                Arity::Pair | Arity::List => FilterValue::List(vec![low.clone(), high.clone()]),
            };
            let expr = fill(
                FilterExpression::new(RecordType::Contact),
                NodePath::new(0, 0, 0),
                property,
                operator.key,
                value,
            );

            let query = compile(&expr, &catalog)
                .unwrap_or_else(|err| panic!("{} {}: {}", property, operator.key, err));
            let columns = query.columns();
            assert_eq!(columns.len(), 1, "{} {}", property, operator.key);
            assert_eq!(columns[0].as_str(), property);
            for column in &columns {
                assert!(
                    catalog.contains(RecordType::Contact, column),
                    "{} {} emitted unknown column {}",
                    property,
                    operator.key,
                    column
                );
            }
            for db_type in [DatabaseType::PostgreSQL, DatabaseType::MySQL, DatabaseType::SQLite] {
                let (sql, params) = query.to_sql(db_type);
                assert!(sql.starts_with("SELECT * FROM contact WHERE "), "{}", sql);
                assert_eq!(params.len(), query.param_count());
            }
        }
    }
}

#[test]
fn test_operator_change_resets_value_on_arity_change() {
    let path = NodePath::new(0, 0, 0);
    let expr = fill(
        FilterExpression::new(RecordType::Contact),
        path,
        "age",
        "between",
        vec![1, 2],
    );

    let switched = expr.set_operator(path, "equals").unwrap();
    assert_eq!(switched.condition(path).unwrap().value, FilterValue::Null);
    assert!(compile(&switched, &catalog()).is_err());
}

#[test]
fn test_json_round_trip_compiles_identically() {
    let json = r#"{
        "recordType": "contact",
        "groups": [
            {"subGroups": [
                {"conditions": [{"property": "age", "operator": "greaterThanOrEqual", "value": 21}]},
                {"conditions": [{"property": "tag", "operator": "notIn", "value": ["spam"]}]}
            ]}
        ]
    }"#;

    let expr = FilterExpression::from_json(json).unwrap();
    let reparsed = FilterExpression::from_json(&expr.to_json().unwrap()).unwrap();
    assert_eq!(expr, reparsed);

    let query = compile(&expr, &catalog()).unwrap();
    assert_eq!(query, compile(&reparsed, &catalog()).unwrap());
    assert!(matches!(query.predicate, Some(Predicate::Or(ref children)) if children.len() == 2));
}

#[test]
fn test_blank_record_type_from_json() {
    let expr = FilterExpression::from_json(r#"{"recordType": "", "groups": []}"#).unwrap();
    assert_eq!(compile(&expr, &catalog()), Err(CompileError::EmptyRecordType));
}

#[test]
fn test_oversized_json_rejected() {
    let padding = " ".repeat(tessera::query::MAX_FILTER_JSON_SIZE);
    let json = format!(r#"{{"recordType": "contact"{}}}"#, padding);
    assert!(matches!(
        FilterExpression::from_json(&json),
        Err(ParseError::TooLarge { .. })
    ));
}

#[test]
fn test_unknown_type_name_gets_text_operators() {
    assert_eq!(
        operators_for_name("unknown-type"),
        operators_for(PropertyType::Text)
    );
}
