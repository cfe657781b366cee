//! Live "can this filter be submitted" signal.
//!
//! The oracle dry-runs the compiler on every edit. It holds no state beyond
//! its settings, so one instance can serve every filter session.

use tessera_schema::{EmptyFilterPolicy, TesseraConfig};
use tracing::debug;

use crate::compiled::CompiledQuery;
use crate::compiler::{PropertyResolver, compile, diagnose};
use crate::error::{CompileError, CompileResult};
use crate::expression::FilterExpression;
use crate::sql::DatabaseType;

/// Decides whether a filter expression may be submitted.
///
/// ```rust
/// use tessera_query::{FilterExpression, ValidationOracle};
/// use tessera_schema::{EmptyFilterPolicy, PropertyCatalog, RecordType};
///
/// let catalog = PropertyCatalog::new();
/// let blank = FilterExpression::new(RecordType::Task);
///
/// assert!(ValidationOracle::new(EmptyFilterPolicy::MatchAll).is_valid(&blank, &catalog));
/// assert!(!ValidationOracle::new(EmptyFilterPolicy::Reject).is_valid(&blank, &catalog));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOracle {
    policy: EmptyFilterPolicy,
    dialect: DatabaseType,
    log_compiles: bool,
}

impl ValidationOracle {
    /// Create an oracle with the given empty-filter policy.
    pub fn new(policy: EmptyFilterPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Create an oracle from the `[compiler]` and `[debug]` config sections.
    pub fn from_config(config: &TesseraConfig) -> Self {
        Self {
            policy: config.compiler.empty_filter,
            dialect: config.compiler.dialect.into(),
            log_compiles: config.debug.log_compiles,
        }
    }

    /// Set the dialect submitted queries are logged in.
    pub fn with_dialect(mut self, dialect: DatabaseType) -> Self {
        self.dialect = dialect;
        self
    }

    /// The empty-filter policy.
    pub fn policy(&self) -> EmptyFilterPolicy {
        self.policy
    }

    /// The configured dialect.
    pub fn dialect(&self) -> DatabaseType {
        self.dialect
    }

    /// Whether `submit` logs the rendered SQL of accepted filters.
    pub fn logs_submits(&self) -> bool {
        self.log_compiles
    }

    /// True iff the expression compiles and the result is submittable
    /// under the empty-filter policy. Errors collapse to `false`.
    pub fn is_valid<R>(&self, expr: &FilterExpression, resolver: &R) -> bool
    where
        R: PropertyResolver + ?Sized,
    {
        match compile(expr, resolver) {
            Ok(query) => !query.is_empty() || self.policy.allows_empty(),
            Err(_) => false,
        }
    }

    /// Every error preventing submission, for highlighting in the UI.
    pub fn errors<R>(&self, expr: &FilterExpression, resolver: &R) -> Vec<CompileError>
    where
        R: PropertyResolver + ?Sized,
    {
        diagnose(expr, resolver)
    }

    /// Compile for submission.
    ///
    /// Returns `Ok(None)` for an empty expression the policy rejects, so a
    /// submit that slipped past [`is_valid`](Self::is_valid) does nothing.
    pub fn submit<R>(
        &self,
        expr: &FilterExpression,
        resolver: &R,
    ) -> CompileResult<Option<CompiledQuery>>
    where
        R: PropertyResolver + ?Sized,
    {
        let query = compile(expr, resolver)?;
        if query.is_empty() && !self.policy.allows_empty() {
            debug!(record_type = %query.record_type, "ignoring submit of empty filter");
            return Ok(None);
        }

        if self.log_compiles {
            let (sql, params) = query.to_sql(self.dialect);
            debug!(sql = %sql, params = params.len(), "submitting filter");
        }
        Ok(Some(query))
    }
}
