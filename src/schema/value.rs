use serde::{Deserialize, Serialize};
use std::fmt;

use super::command::Node;
use super::entity::{Entity, EntityGroup};

/// The kinds of value a name can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    List,
    Catalog,
    Group,
    Snippet,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Catalog => "catalog",
            Self::Group => "gen",
            Self::Snippet => "desc",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An insertion-ordered mapping from key to word list.
///
/// Order matters: `WRITE ... ORDER` walks a sentence catalog entry by entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<(String, Vec<String>)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let mut catalog = Self::new();
        for (key, list) in entries {
            catalog.insert(key, list);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: String, list: Vec<String>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = list,
            None => self.entries.push((key, list)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Merge `other` into `self`; keys from `other` win.
    pub fn merge(&mut self, other: &Catalog) {
        for (key, list) in &other.entries {
            self.insert(key.clone(), list.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }
}

/// An owned value, as produced by the expression evaluator and handed to
/// the store's replace contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    List(Vec<String>),
    Catalog(Catalog),
    /// The member sequence of an entity group. The pointer is owned by the
    /// store and re-anchored on replacement.
    Group(Vec<Entity>),
    Snippet(Vec<Node>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::List(_) => Kind::List,
            Self::Catalog(_) => Kind::Catalog,
            Self::Group(_) => Kind::Group,
            Self::Snippet(_) => Kind::Snippet,
        }
    }
}

/// A borrowed view of a stored value, returned by lookups.
#[derive(Debug, Clone, Copy)]
pub enum ValueRef<'a> {
    List(&'a [String]),
    Catalog(&'a Catalog),
    Group(&'a EntityGroup),
    Snippet(&'a [Node]),
}

impl<'a> ValueRef<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Self::List(_) => Kind::List,
            Self::Catalog(_) => Kind::Catalog,
            Self::Group(_) => Kind::Group,
            Self::Snippet(_) => Kind::Snippet,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(list) => list.is_empty(),
            Self::Catalog(catalog) => catalog.is_empty(),
            Self::Group(group) => group.is_empty(),
            Self::Snippet(nodes) => nodes.is_empty(),
        }
    }

    pub fn as_list(&self) -> Option<&'a [String]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }
}
