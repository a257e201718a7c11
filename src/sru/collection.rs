//! Registered SRU collections.
//!
//! The archive exposes many collections behind one endpoint; a search must
//! name one that the harvester knows how to handle.

use super::SruError;

/// Descriptor of a searchable collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Short name used in configuration (`DDD`).
    pub name: &'static str,
    /// Server-side collection id sent as `x-collection`.
    pub collection_id: &'static str,
    /// Record schema requested from the SRU endpoint.
    pub record_schema: &'static str,
    /// OAI-PMH metadata prefix of the per-record manifests.
    pub metadata_prefix: &'static str,
    /// OAI-PMH set name.
    pub set_name: &'static str,
    /// English description.
    pub description_en: &'static str,
    /// Dutch description.
    pub description_nl: &'static str,
    /// First and last year covered.
    pub time_period: (u16, u16),
}

/// The historical newspapers collection.
pub const DDD: Collection = Collection {
    name: "DDD",
    collection_id: "DDD_krantnr",
    record_schema: "ddd",
    metadata_prefix: "didl",
    set_name: "DDD",
    description_en: "Historical Newspapers",
    description_nl: "Historische Kranten",
    time_period: (1883, 1976),
};

/// Lookup table of collections that may be searched.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    collections: Vec<Collection>,
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        Self {
            collections: vec![DDD],
        }
    }
}

impl CollectionRegistry {
    /// Creates a registry with no collections.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            collections: Vec::new(),
        }
    }

    /// Registers `collection`, replacing any entry with the same short name.
    pub fn register(&mut self, collection: Collection) {
        self.collections.retain(|c| c.name != collection.name);
        self.collections.push(collection);
    }

    /// Returns the collection registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Returns the collection registered under `name`, or a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`SruError::UnknownCollection`] when `name` is not registered.
    pub fn resolve(&self, name: &str) -> Result<&Collection, SruError> {
        self.get(name)
            .ok_or_else(|| SruError::unknown_collection(name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contains_ddd() {
        let registry = CollectionRegistry::default();
        let ddd = registry.resolve("DDD").unwrap();
        assert_eq!(ddd.collection_id, "DDD_krantnr");
        assert_eq!(ddd.record_schema, "ddd");
    }

    #[test]
    fn test_unknown_collection_is_rejected() {
        let registry = CollectionRegistry::default();
        let err = registry.resolve("ddd").unwrap_err();
        assert!(matches!(err, SruError::UnknownCollection { ref name } if name == "ddd"));
    }

    #[test]
    fn test_register_replaces_existing_entry() {
        let mut registry = CollectionRegistry::empty();
        assert!(registry.get("DDD").is_none());

        registry.register(DDD);
        registry.register(Collection {
            collection_id: "DDD_artikel",
            ..DDD
        });

        assert_eq!(registry.resolve("DDD").unwrap().collection_id, "DDD_artikel");
    }
}
