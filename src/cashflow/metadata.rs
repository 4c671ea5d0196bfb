use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMetadata {
    pub deal: String,
    // None when the column exists but the deal has no value for it
    pub attributes: BTreeMap<String, Option<String>>,
}

impl EntityMetadata {
    pub fn new<T: Into<String>>(deal: T) -> Self {
        Self {
            deal: deal.into(),
            attributes: Default::default(),
        }
    }

    pub fn with_attribute<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.attributes.insert(name.into(), Some(value.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)?.as_deref()
    }
}

/// Attribute columns available in a metadata table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    attributes: BTreeSet<String>,
}

impl Schema {
    pub fn from_metadata(metadata: &[EntityMetadata]) -> Self {
        Self {
            attributes: metadata
                .iter()
                .flat_map(|item| item.attributes.keys().cloned())
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|item| item.as_str())
    }
}
