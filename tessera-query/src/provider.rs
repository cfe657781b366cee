//! Collaborators the filter UI talks to over the network.
//!
//! The compiler itself never calls these; property metadata reaches it as a
//! [`PropertyCatalog`] snapshot built by the
//! [`MetadataCache`](crate::cache::MetadataCache).

use async_trait::async_trait;
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::sync::Arc;
use tessera_schema::{PropertyCatalog, PropertyMap, RecordType};

use crate::compiled::CompiledQuery;
use crate::error::ProviderError;
use crate::pagination::Page;

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A result row, keyed by column.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Source of property metadata.
#[async_trait]
pub trait PropertyMetadataProvider: Send + Sync {
    /// List one page of properties for a record type, optionally filtered by
    /// a key substring.
    async fn list_properties(
        &self,
        record_type: RecordType,
        page: Page,
        search: Option<&str>,
    ) -> ProviderResult<PropertyMap>;
}

/// Source of distinct values, used to suggest `in`/`notIn` choices.
#[async_trait]
pub trait DistinctValueProvider: Send + Sync {
    /// List one page of distinct values of a property.
    async fn list_distinct_values(
        &self,
        record_type: RecordType,
        property: &str,
        page: Page,
        search: Option<&str>,
    ) -> ProviderResult<Vec<String>>;
}

/// Runs compiled queries.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query and return its rows.
    async fn execute(&self, query: &CompiledQuery) -> ProviderResult<Vec<Row>>;
}

fn matches_search(candidate: &str, search: Option<&str>) -> bool {
    match search.map(str::trim) {
        None | Some("") => true,
        Some(needle) => candidate.to_lowercase().contains(&needle.to_lowercase()),
    }
}

/// Serves property metadata from an in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    catalog: Arc<RwLock<PropertyCatalog>>,
}

impl StaticMetadataProvider {
    /// Create a provider serving the given catalog.
    pub fn new(catalog: PropertyCatalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Replace the served catalog.
    pub fn replace(&self, catalog: PropertyCatalog) {
        *self.catalog.write() = catalog;
    }
}

#[async_trait]
impl PropertyMetadataProvider for StaticMetadataProvider {
    async fn list_properties(
        &self,
        record_type: RecordType,
        page: Page,
        search: Option<&str>,
    ) -> ProviderResult<PropertyMap> {
        let catalog = self.catalog.read();
        let matching: Vec<_> = catalog
            .properties(record_type)
            .filter(|(key, _)| matches_search(key, search))
            .collect();
        Ok(page
            .slice(&matching)
            .iter()
            .map(|(key, ty)| ((*key).clone(), *ty))
            .collect())
    }
}

/// Serves distinct values from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticValueProvider {
    values: Arc<RwLock<HashMap<(RecordType, SmolStr), Vec<String>>>>,
}

impl StaticValueProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the distinct values of a property.
    pub fn register(
        &self,
        record_type: RecordType,
        property: impl Into<SmolStr>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> &Self {
        self.values.write().insert(
            (record_type, property.into()),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }
}

#[async_trait]
impl DistinctValueProvider for StaticValueProvider {
    async fn list_distinct_values(
        &self,
        record_type: RecordType,
        property: &str,
        page: Page,
        search: Option<&str>,
    ) -> ProviderResult<Vec<String>> {
        let values = self.values.read();
        let Some(all) = values.get(&(record_type, SmolStr::new(property))) else {
            return Ok(Vec::new());
        };
        let matching: Vec<&String> = all.iter().filter(|v| matches_search(v, search)).collect();
        Ok(page.slice(&matching).iter().map(|v| (*v).clone()).collect())
    }
}
