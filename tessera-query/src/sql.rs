//! SQL generation utilities.

use tessera_schema::DatabaseProvider;

use crate::value::FilterValue;

/// Longest identifier accepted; PostgreSQL truncates beyond this.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Check that a name is usable as a bare SQL identifier.
///
/// Only ASCII letters, digits, and underscores are accepted, and the name
/// must not start with a digit. Metadata keys failing this check are never
/// emitted, quoted or not.
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_IDENTIFIER_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    let reserved = [
        "user", "order", "group", "select", "from", "where", "table", "index",
        "key", "primary", "foreign", "check", "default", "null", "not", "and",
        "or", "in", "is", "like", "between", "case", "when", "then", "else",
        "end", "as", "on", "join", "left", "right", "inner", "outer", "cross",
        "natural", "using", "limit", "offset", "union", "intersect", "except",
        "all", "distinct", "having", "create", "alter", "drop", "insert",
        "update", "delete", "into", "values", "set", "returning", "escape",
    ];

    if reserved.contains(&name.to_lowercase().as_str()) {
        return true;
    }

    !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape `LIKE` metacharacters so user text matches literally.
///
/// Pairs with the `ESCAPE` clause from [`DatabaseType::like_escape`].
pub fn escape_like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Target database for placeholder and escape syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    /// PostgreSQL uses $1, $2, etc.
    #[default]
    PostgreSQL,
    /// MySQL uses ?, ?, etc.
    MySQL,
    /// SQLite uses ?, ?, etc.
    SQLite,
}

impl DatabaseType {
    /// Get the parameter placeholder for this database type.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", index),
            Self::MySQL | Self::SQLite => "?".to_string(),
        }
    }

    /// Get the `ESCAPE` clause declaring backslash as the LIKE escape.
    ///
    /// MySQL treats backslash as an escape inside string literals, so the
    /// literal itself has to be doubled there.
    pub fn like_escape(&self) -> &'static str {
        match self {
            Self::PostgreSQL | Self::SQLite => r"ESCAPE '\'",
            Self::MySQL => r"ESCAPE '\\'",
        }
    }

    /// Quote an identifier if needed.
    ///
    /// MySQL reads double quotes as a string literal unless `ANSI_QUOTES` is
    /// set, so it gets backticks. The quote character is doubled inside.
    pub fn quote_identifier(&self, name: &str) -> String {
        if !needs_quoting(name) {
            return name.to_string();
        }
        let quote = match self {
            Self::PostgreSQL | Self::SQLite => '"',
            Self::MySQL => '`',
        };
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }
}

impl From<DatabaseProvider> for DatabaseType {
    fn from(provider: DatabaseProvider) -> Self {
        match provider {
            DatabaseProvider::PostgreSql => Self::PostgreSQL,
            DatabaseProvider::MySql => Self::MySQL,
            DatabaseProvider::Sqlite => Self::SQLite,
        }
    }
}

/// A SQL builder that keeps text and bound parameters in step.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    db_type: DatabaseType,
    sql: String,
    params: Vec<FilterValue>,
}

impl SqlBuilder {
    /// Create a new SQL builder.
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            sql: String::with_capacity(64),
            params: Vec::new(),
        }
    }

    /// The dialect this builder renders for.
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Push a literal SQL string.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        self.sql.push_str(sql.as_ref());
        self
    }

    /// Push a placeholder and bind its value.
    pub fn push_param(&mut self, value: impl Into<FilterValue>) -> &mut Self {
        let index = self.params.len() + 1;
        self.sql.push_str(&self.db_type.placeholder(index));
        self.params.push(value.into());
        self
    }

    /// Push a comma-separated placeholder list, binding every value.
    pub fn push_param_list<'a>(
        &mut self,
        values: impl IntoIterator<Item = &'a FilterValue>,
    ) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_param(value.clone());
        }
        self
    }

    /// Push an identifier (properly quoted if needed).
    pub fn push_identifier(&mut self, name: &str) -> &mut Self {
        let quoted = self.db_type.quote_identifier(name);
        self.sql.push_str(&quoted);
        self
    }

    /// Build the final SQL string and parameters.
    pub fn build(self) -> (String, Vec<FilterValue>) {
        (self.sql, self.params)
    }
}
