//! Platform resource catalog collaborator
//!
//! The hosting platform owns the authoritative resource and tag catalog;
//! the kernel only asks whether an id resolves and which tags it carries.

use crate::ResourceId;
use std::collections::{BTreeMap, BTreeSet};

/// Read-only catalog of known resources and their tags
pub trait ResourceCatalog: Send + Sync {
    /// Whether the resource id resolves to a known resource
    fn contains(&self, resource: &ResourceId) -> bool;

    /// Tags attached to the resource; unknown resources carry no tags
    fn tags(&self, resource: &ResourceId) -> BTreeSet<String>;
}

/// Map-backed catalog for tests, demos, and static deployments
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tags_by_resource: BTreeMap<ResourceId, BTreeSet<String>>,
}

impl StaticCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource with its tags
    pub fn insert(&mut self, resource: ResourceId, tags: impl IntoIterator<Item = String>) {
        self.tags_by_resource
            .insert(resource, tags.into_iter().collect());
    }
}

impl ResourceCatalog for StaticCatalog {
    fn contains(&self, resource: &ResourceId) -> bool {
        self.tags_by_resource.contains_key(resource)
    }

    fn tags(&self, resource: &ResourceId) -> BTreeSet<String> {
        self.tags_by_resource
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_lookup() {
        let mut catalog = StaticCatalog::new();
        let ore = ResourceId::new("metal.ore").unwrap();
        catalog.insert(ore.clone(), vec!["ores".to_string()]);

        assert!(catalog.contains(&ore));
        assert!(catalog.tags(&ore).contains("ores"));

        let unknown = ResourceId::new("void.dust").unwrap();
        assert!(!catalog.contains(&unknown));
        assert!(catalog.tags(&unknown).is_empty());
    }
}
