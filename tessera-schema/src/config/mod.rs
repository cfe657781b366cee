//! Configuration file parsing for `tessera.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};

/// Main configuration structure for `tessera.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    /// Compiler settings.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Metadata fetching settings.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl TesseraConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self =
            toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot express constraints for.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.metadata.page_size == 0 {
            return Err(SchemaError::config("metadata.page_size must be at least 1"));
        }
        Ok(())
    }
}

/// Compiler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Target database, decides placeholder and escape syntax.
    #[serde(default = "default_provider")]
    pub dialect: DatabaseProvider,

    /// What an expression without any complete condition means.
    #[serde(default)]
    pub empty_filter: EmptyFilterPolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: default_provider(),
            empty_filter: EmptyFilterPolicy::default(),
        }
    }
}

fn default_provider() -> DatabaseProvider {
    DatabaseProvider::PostgreSql
}

/// Supported database providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    /// PostgreSQL.
    #[serde(alias = "postgres")]
    PostgreSql,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DatabaseProvider {
    /// Get the provider name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Treatment of a filter that compiles to zero predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFilterPolicy {
    /// An empty filter is submittable and matches every record.
    #[default]
    MatchAll,
    /// An empty filter cannot be submitted.
    Reject,
}

impl EmptyFilterPolicy {
    /// Whether a zero-predicate filter may be submitted.
    pub fn allows_empty(&self) -> bool {
        matches!(self, Self::MatchAll)
    }
}

/// Metadata fetching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    /// Page size used when pulling property metadata.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    100
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log the rendered SQL and parameter count of every submitted filter.
    ///
    /// The compiler's own debug events are governed by the log level alone.
    #[serde(default)]
    pub log_compiles: bool,
}

/// Expand environment variables in the format `${VAR_NAME}`.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = match regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return result,
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TesseraConfig::default();
        assert_eq!(config.compiler.dialect, DatabaseProvider::PostgreSql);
        assert_eq!(config.compiler.empty_filter, EmptyFilterPolicy::MatchAll);
        assert_eq!(config.metadata.page_size, 100);
        assert!(!config.debug.log_compiles);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [compiler]
            dialect = "sqlite"
        "#;

        let config = TesseraConfig::from_str(toml).unwrap();
        assert_eq!(config.compiler.dialect, DatabaseProvider::Sqlite);
        assert_eq!(config.compiler.empty_filter, EmptyFilterPolicy::MatchAll);
    }

    #[test]
    fn test_parse_reject_policy() {
        let toml = r#"
            [compiler]
            empty_filter = "reject"
        "#;

        let config = TesseraConfig::from_str(toml).unwrap();
        assert!(!config.compiler.empty_filter.allows_empty());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let toml = r#"
            [metadata]
            page_size = 0
        "#;

        let err = TesseraConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, SchemaError::ConfigError { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
            [compiler]
            optimizer = true
        "#;

        assert!(matches!(
            TesseraConfig::from_str(toml),
            Err(SchemaError::TomlError { .. })
        ));
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: This test runs single-threaded and we clean up after
        unsafe {
            std::env::set_var("TESSERA_TEST_DIALECT", "mysql");
        }
        let expanded = expand_env_vars("dialect = \"${TESSERA_TEST_DIALECT}\"");
        assert_eq!(expanded, "dialect = \"mysql\"");
        unsafe {
            std::env::remove_var("TESSERA_TEST_DIALECT");
        }
    }
}
