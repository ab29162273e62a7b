//! Named collections of entries.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::entry::ServerEntry;
use crate::error::ValidationError;
use crate::parse::parse_entry_value;

/// A raw entry that failed validation, kept by name so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEntry {
    pub name: String,
    pub error: ValidationError,
}

/// Entry name to validated entry.
///
/// Insertion order is kept for output, but two sets with the same entries in a
/// different order compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSet {
    entries: IndexMap<String, ServerEntry>,
}

impl ServerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every member of a raw entry-set object.
    ///
    /// Invalid members are returned separately and do not stop the rest.
    pub fn from_raw(section: &Map<String, Value>) -> (Self, Vec<InvalidEntry>) {
        let mut set = Self::new();
        let mut invalid = Vec::new();
        for (name, raw) in section {
            match parse_entry_value(raw) {
                Ok(entry) => {
                    set.insert(name.clone(), entry);
                }
                Err(error) => invalid.push(InvalidEntry {
                    name: name.clone(),
                    error,
                }),
            }
        }
        (set, invalid)
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, entry: ServerEntry) -> Option<ServerEntry> {
        self.entries.insert(name.into(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&ServerEntry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ServerEntry> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServerEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Canonical map of every entry, keyed by name, in insertion order.
    pub fn to_canonical_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), Value::Object(entry.to_canonical_map())))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, ServerEntry)> for ServerSet {
    fn from_iter<I: IntoIterator<Item = (S, ServerEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for ServerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_canonical_map().serialize(serializer)
    }
}
