//! In-memory metastore and a fixed metastore locator

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Metastore, MetastoreError, MetastoreLocator};

/// A persisted configuration element: an id plus string attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetastoreElement {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl MetastoreElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Metastore kept entirely in memory.
///
/// Elements keep their insertion order; replacing an element keeps its slot.
pub struct MemoryMetastore {
    name: String,
    elements: RwLock<HashMap<String, Vec<MetastoreElement>>>,
}

impl MemoryMetastore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace an element
    pub fn put(&self, element_type: &str, element: MetastoreElement) {
        let mut elements = self.elements.write();
        let of_type = elements.entry(element_type.to_string()).or_default();
        match of_type.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => of_type.push(element),
        }
    }
}

impl Metastore for MemoryMetastore {
    fn name(&self) -> &str {
        &self.name
    }

    fn elements(&self, element_type: &str) -> Result<Vec<MetastoreElement>, MetastoreError> {
        Ok(self
            .elements
            .read()
            .get(element_type)
            .cloned()
            .unwrap_or_default())
    }
}

/// Locator that always hands out the same metastore (or none)
#[derive(Clone)]
pub struct StaticMetastoreLocator {
    metastore: Option<Arc<dyn Metastore>>,
}

impl StaticMetastoreLocator {
    pub fn new(metastore: Arc<dyn Metastore>) -> Self {
        Self {
            metastore: Some(metastore),
        }
    }

    /// A locator whose metastore can never be reached
    pub fn unavailable() -> Self {
        Self { metastore: None }
    }
}

impl MetastoreLocator for StaticMetastoreLocator {
    fn metastore(&self) -> Option<Arc<dyn Metastore>> {
        self.metastore.clone()
    }
}
