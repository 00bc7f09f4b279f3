//! Directory entry types

use std::collections::HashMap;

/// Search scope relative to the search base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// The base entry only
    Base,
    /// Direct children of the base entry
    OneLevel,
    /// The base entry and everything below it
    Subtree,
}

/// One entry returned by a directory search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Distinguished name
    pub dn: String,

    /// First value of each returned attribute
    pub attributes: HashMap<String, String>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Build an entry from multi-valued attributes, keeping the first value of each
    pub fn from_multi_valued(dn: impl Into<String>, attrs: HashMap<String, Vec<String>>) -> Self {
        let attributes = attrs
            .into_iter()
            .filter_map(|(name, values)| values.into_iter().next().map(|v| (name, v)))
            .collect();

        Self {
            dn: dn.into(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}
