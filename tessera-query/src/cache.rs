//! Property metadata snapshots for the compiler.
//!
//! The cache is the only place metadata is fetched asynchronously. Each
//! refresh builds a new [`PropertyCatalog`] and swaps it in whole, so a
//! snapshot handed to the compiler never changes underneath it.

use parking_lot::RwLock;
use std::sync::Arc;
use tessera_schema::{PropertyCatalog, PropertyMap, RecordType, TesseraConfig};
use tracing::info;

use crate::error::ProviderError;
use crate::pagination::{DEFAULT_PAGE_SIZE, Page};
use crate::provider::{PropertyMetadataProvider, ProviderResult};

/// Most pages pulled for one record type before a refresh gives up.
pub const MAX_METADATA_PAGES: u32 = 10_000;

/// Caches property metadata pulled from a [`PropertyMetadataProvider`].
pub struct MetadataCache {
    provider: Arc<dyn PropertyMetadataProvider>,
    page_size: u32,
    catalog: RwLock<Arc<PropertyCatalog>>,
}

impl MetadataCache {
    /// Create an empty cache over a provider.
    pub fn new(provider: Arc<dyn PropertyMetadataProvider>) -> Self {
        Self {
            provider,
            page_size: DEFAULT_PAGE_SIZE,
            catalog: RwLock::new(Arc::new(PropertyCatalog::new())),
        }
    }

    /// Create a cache using the `[metadata]` config section.
    pub fn from_config(provider: Arc<dyn PropertyMetadataProvider>, config: &TesseraConfig) -> Self {
        Self::new(provider).with_page_size(config.metadata.page_size)
    }

    /// Set the page size used for refreshes. Zero is raised to one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The current catalog.
    pub fn snapshot(&self) -> Arc<PropertyCatalog> {
        Arc::clone(&self.catalog.read())
    }

    /// Pull every page of properties for a record type and publish a new
    /// snapshot.
    ///
    /// On error the previous snapshot stays published.
    pub async fn refresh(&self, record_type: RecordType) -> ProviderResult<usize> {
        let properties = self.fetch_all(record_type).await?;
        let count = properties.len();

        let mut guard = self.catalog.write();
        let mut next = PropertyCatalog::clone(&guard);
        next.set_properties(record_type, properties);
        *guard = Arc::new(next);
        drop(guard);

        info!(record_type = %record_type, properties = count, "refreshed property metadata");
        Ok(count)
    }

    /// Refresh every record type, stopping at the first failure.
    pub async fn refresh_all(&self) -> ProviderResult<usize> {
        let mut total = 0;
        for record_type in RecordType::ALL {
            total += self.refresh(record_type).await?;
        }
        Ok(total)
    }

    async fn fetch_all(&self, record_type: RecordType) -> ProviderResult<PropertyMap> {
        let mut properties = PropertyMap::new();
        let mut page = Page::first(self.page_size);
        loop {
            let batch = self
                .provider
                .list_properties(record_type, page, None)
                .await?;
            let len = batch.len();
            crate::tessera_debug!(record_type = %record_type, page = page.page, len, "fetched metadata page");
            let before = properties.len();
            properties.extend(batch);
            if page.is_last(len) {
                return Ok(properties);
            }
            // A full page with nothing new means the provider ignores paging.
            if properties.len() == before {
                return Err(ProviderError::stalled(
                    "property metadata",
                    page.page,
                    "full page added no new properties",
                ));
            }
            if page.page >= MAX_METADATA_PAGES {
                return Err(ProviderError::stalled(
                    "property metadata",
                    page.page,
                    format!("reached the {} page limit", MAX_METADATA_PAGES),
                ));
            }
            page = page.next();
        }
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("page_size", &self.page_size)
            .field("properties", &self.catalog.read().len())
            .finish()
    }
}
