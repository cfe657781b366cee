//! The output of a successful compile.

use serde::Serialize;
use smol_str::SmolStr;
use tessera_schema::RecordType;

use crate::filter::Predicate;
use crate::sql::{DatabaseType, SqlBuilder};
use crate::value::FilterValue;

/// A compiled filter, ready to render for a database.
///
/// ```rust
/// use tessera_query::{CompiledQuery, DatabaseType};
/// use tessera_schema::RecordType;
///
/// let query = CompiledQuery::new(RecordType::User, None);
/// let (sql, params) = query.to_sql(DatabaseType::PostgreSQL);
/// assert_eq!(sql, "SELECT * FROM \"user\"");
/// assert!(params.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// Record type queried.
    pub record_type: RecordType,
    /// Table queried, always derived from `record_type`.
    pub table: &'static str,
    /// Folded predicate; `None` when no condition was complete.
    pub predicate: Option<Predicate>,
}

impl CompiledQuery {
    /// Create a compiled query for a record type.
    pub fn new(record_type: RecordType, predicate: Option<Predicate>) -> Self {
        Self {
            record_type,
            table: record_type.table_name(),
            predicate,
        }
    }

    /// True when the query has no predicate and so matches every row.
    pub fn is_empty(&self) -> bool {
        self.predicate.is_none()
    }

    /// Number of comparisons in the predicate.
    pub fn predicate_count(&self) -> usize {
        self.predicate
            .as_ref()
            .map_or(0, |p| p.comparisons().len())
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.predicate.as_ref().map_or(0, Predicate::param_count)
    }

    /// Distinct columns referenced, in first-use order.
    pub fn columns(&self) -> Vec<SmolStr> {
        let mut columns: Vec<SmolStr> = Vec::new();
        if let Some(predicate) = &self.predicate {
            for cmp in predicate.comparisons() {
                if !columns.contains(&cmp.column) {
                    columns.push(cmp.column.clone());
                }
            }
        }
        columns
    }

    /// Render the full `SELECT`.
    pub fn to_sql(&self, db_type: DatabaseType) -> (String, Vec<FilterValue>) {
        let mut builder = SqlBuilder::new(db_type);
        builder.push("SELECT * FROM ").push_identifier(self.table);
        if let Some(predicate) = &self.predicate {
            builder.push(" WHERE ");
            predicate.write_sql(&mut builder);
        }
        builder.build()
    }

    /// Render only the `WHERE` body; empty when there is no predicate.
    pub fn predicate_sql(&self, db_type: DatabaseType) -> (String, Vec<FilterValue>) {
        let mut builder = SqlBuilder::new(db_type);
        if let Some(predicate) = &self.predicate {
            predicate.write_sql(&mut builder);
        }
        builder.build()
    }
}
