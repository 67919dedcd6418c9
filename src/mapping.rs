//! Source to destination identifier mappings
use std::{collections::HashMap, hash::Hash};

/// Mapping from a source identifier to a destination identifier.
///
/// One mapping is built per destination repository and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMapping<K, V>
where
    K: Eq + Hash,
{
    /// Known pairs
    entries: HashMap<K, V>,
}

impl<K, V> Default for EntityMapping<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> EntityMapping<K, V>
where
    K: Eq + Hash,
{
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the destination counterpart of a source entity
    pub fn insert(&mut self, source: K, destination: V) {
        self.entries.insert(source, destination);
    }

    /// Destination counterpart of a source entity
    pub fn get(&self, source: &K) -> Option<&V> {
        self.entries.get(source)
    }

    /// Number of mapped entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the destination identifiers
    pub fn destinations(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

/// Label names, matched by name on both sides
pub type LabelMapping = EntityMapping<String, String>;

/// Source milestone id to destination milestone number
pub type MilestoneMapping = EntityMapping<u64, u64>;
