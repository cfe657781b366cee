//! Property catalog: the resolved metadata snapshot filters are compiled
//! against.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::{PropertyType, RecordType};

/// Properties of a single record type, keyed by property key.
pub type PropertyMap = IndexMap<SmolStr, PropertyType>;

/// Known properties for every record type.
///
/// A catalog is an immutable snapshot once built; refreshing metadata means
/// building a new catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyCatalog {
    records: IndexMap<RecordType, PropertyMap>,
}

impl PropertyCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, returning the updated catalog.
    pub fn with_property(
        mut self,
        record_type: RecordType,
        key: impl Into<SmolStr>,
        property_type: PropertyType,
    ) -> Self {
        self.insert(record_type, key, property_type);
        self
    }

    /// Add or replace a property.
    pub fn insert(
        &mut self,
        record_type: RecordType,
        key: impl Into<SmolStr>,
        property_type: PropertyType,
    ) {
        self.records
            .entry(record_type)
            .or_default()
            .insert(key.into(), property_type);
    }

    /// Replace all properties of a record type.
    pub fn set_properties(&mut self, record_type: RecordType, properties: PropertyMap) {
        self.records.insert(record_type, properties);
    }

    /// Look up a property, returning the catalog's own key alongside its type.
    pub fn get(&self, record_type: RecordType, key: &str) -> Option<(&SmolStr, PropertyType)> {
        self.records
            .get(&record_type)?
            .get_key_value(key)
            .map(|(k, ty)| (k, *ty))
    }

    /// Get the type of a property.
    pub fn property_type(&self, record_type: RecordType, key: &str) -> Option<PropertyType> {
        self.get(record_type, key).map(|(_, ty)| ty)
    }

    /// Check whether a property is known.
    pub fn contains(&self, record_type: RecordType, key: &str) -> bool {
        self.get(record_type, key).is_some()
    }

    /// All properties of a record type, in insertion order.
    pub fn properties(&self, record_type: RecordType) -> impl Iterator<Item = (&SmolStr, PropertyType)> {
        self.records
            .get(&record_type)
            .into_iter()
            .flat_map(|props| props.iter().map(|(k, ty)| (k, *ty)))
    }

    /// Properties whose key contains `needle` (case-insensitive).
    pub fn search<'a>(
        &'a self,
        record_type: RecordType,
        needle: &'a str,
    ) -> impl Iterator<Item = (&'a SmolStr, PropertyType)> + 'a {
        let needle = needle.to_lowercase();
        self.properties(record_type)
            .filter(move |(k, _)| k.to_lowercase().contains(&needle))
    }

    /// Record types that have at least one property.
    pub fn record_types(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.records
            .iter()
            .filter(|(_, props)| !props.is_empty())
            .map(|(rt, _)| *rt)
    }

    /// Total number of properties across all record types.
    pub fn len(&self) -> usize {
        self.records.values().map(IndexMap::len).sum()
    }

    /// Check if the catalog has no properties.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
