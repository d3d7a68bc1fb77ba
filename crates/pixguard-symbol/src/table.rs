//! Per-type name → id tables

use std::collections::BTreeMap;

use pixguard_types::{ImageType, ResourceId, ResourceName};

/// Names to ids for one resource type, ordered by name
pub type TypeTable = BTreeMap<ResourceName, ResourceId>;

/// Resource type (`drawable`, `mipmap`, `string`, ...) → [`TypeTable`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    types: BTreeMap<String, TypeTable>,
}

impl SymbolTable {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name = id` under `resource_type`; a repeated name keeps the last id
    pub fn insert(&mut self, resource_type: &str, name: impl Into<ResourceName>, id: ResourceId) {
        self.types
            .entry(resource_type.to_owned())
            .or_default()
            .insert(name.into(), id);
    }

    /// Table for one type
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&TypeTable> {
        self.types.get(resource_type)
    }

    /// Known type names, sorted
    pub fn types(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.keys().map(String::as_str)
    }

    /// Id of `name` within one type
    #[must_use]
    pub fn resolve(&self, resource_type: &str, name: &ResourceName) -> Option<ResourceId> {
        self.get(resource_type).and_then(|t| t.get(name)).copied()
    }

    /// Id of `name` in the table a reference of `image_type` points at
    #[inline]
    #[must_use]
    pub fn resolve_image(&self, image_type: ImageType, name: &ResourceName) -> Option<ResourceId> {
        self.resolve(image_type.as_str(), name)
    }

    /// Whether `id` belongs to one of the image-bearing tables
    #[must_use]
    pub fn is_image_id(&self, id: ResourceId) -> bool {
        ImageType::ALL
            .iter()
            .filter_map(|t| self.get(t.as_str()))
            .any(|t| t.values().any(|v| *v == id))
    }

    /// Id → name for one type
    ///
    /// Ids shared by several names resolve to the name that sorts last.
    #[must_use]
    pub fn invert(&self, resource_type: &str) -> BTreeMap<ResourceId, ResourceName> {
        self.get(resource_type)
            .into_iter()
            .flat_map(|t| t.iter())
            .map(|(name, id)| (*id, name.clone()))
            .collect()
    }

    /// Total number of entries across types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.values().map(BTreeMap::len).sum()
    }

    /// True when no type has any entry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
