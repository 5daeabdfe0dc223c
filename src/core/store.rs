//! The typed variable store.
//!
//! Five namespaces: word-sets and sentence-sets (one list per vocabulary
//! file), entity groups, user variables, and snippets. Names are lowercased
//! on every access. Lookups under [`Namespace::All`] probe word-sets, then
//! sentence-sets, then entity groups, then user variables.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::schema::command::Node;
use crate::schema::entity::EntityGroup;
use crate::schema::value::{Catalog, Kind, Value, ValueRef};

/// Which namespace an access is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    All,
    WordSet,
    SentenceSet,
    EntityGroup,
    UserVar,
    Snippet,
}

impl Namespace {
    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "any namespace",
            Self::WordSet => "word set",
            Self::SentenceSet => "sentence set",
            Self::EntityGroup => "gen",
            Self::UserVar => "user variable",
            Self::Snippet => "desc",
        }
    }
}

/// A loaded vocabulary folder that a user variable can alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Words,
    Sentences,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("variable {0} does not exist")]
    Missing(String),
    #[error("a {namespace} cannot hold a value of type {actual}")]
    Mismatch {
        namespace: &'static str,
        expected: Kind,
        actual: Kind,
    },
}

impl StoreError {
    fn mismatch(namespace: Namespace, expected: Kind, value: &Value) -> Self {
        Self::Mismatch {
            namespace: namespace.name(),
            expected,
            actual: value.kind(),
        }
    }
}

/// Where a lookup found a name. Used to route a replacement back to the
/// same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    WordSet,
    SentenceSet,
    Group,
    GroupField,
    UserVar,
    Alias(Folder),
    Snippet,
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    word_sets: Catalog,
    sentence_sets: Catalog,
    groups: FxHashMap<String, EntityGroup>,
    snippets: FxHashMap<String, Vec<Node>>,
    user_vars: FxHashMap<String, Value>,
    folder_aliases: FxHashMap<String, Folder>,
}

/// Split `group.field`. Only names with exactly one period qualify.
pub fn split_dotted(name: &str) -> Option<(&str, &str)> {
    let (group, field) = name.split_once('.')?;
    if field.contains('.') {
        return None;
    }
    Some((group, field))
}

impl Store {
    pub fn new(word_sets: Catalog, sentence_sets: Catalog) -> Self {
        Self {
            word_sets,
            sentence_sets,
            ..Self::default()
        }
    }

    /// Make `name` a user variable that reads as the whole loaded folder.
    pub fn alias_folder(&mut self, name: &str, folder: Folder) {
        self.folder_aliases.insert(name.to_lowercase(), folder);
    }

    pub fn word_sets(&self) -> &Catalog {
        &self.word_sets
    }

    pub fn sentence_sets(&self) -> &Catalog {
        &self.sentence_sets
    }

    pub fn lookup(&self, name: &str, namespace: Namespace) -> Option<ValueRef<'_>> {
        let name = name.to_lowercase();
        self.locate(&name, namespace)
            .and_then(|slot| self.read(&name, slot))
    }

    pub fn exists(&self, name: &str, namespace: Namespace) -> bool {
        self.lookup(name, namespace).is_some()
    }

    pub fn group(&self, name: &str) -> Option<&EntityGroup> {
        self.groups.get(&name.to_lowercase())
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut EntityGroup> {
        self.groups.get_mut(&name.to_lowercase())
    }

    pub fn snippet(&self, name: &str) -> Option<&[Node]> {
        self.snippets
            .get(&name.to_lowercase())
            .map(|nodes| nodes.as_slice())
    }

    /// Install a freshly generated group, replacing any previous one.
    pub fn define_group(&mut self, name: &str, group: EntityGroup) {
        self.groups.insert(name.to_lowercase(), group);
    }

    pub fn define_snippet(&mut self, name: &str, nodes: Vec<Node>) {
        self.snippets.insert(name.to_lowercase(), nodes);
    }

    /// Overwrite an existing name in the namespace it was found in.
    pub fn replace(&mut self, name: &str, namespace: Namespace, value: Value) -> Result<(), StoreError> {
        let name = name.to_lowercase();
        let slot = self
            .locate(&name, namespace)
            .ok_or_else(|| StoreError::Missing(name.clone()))?;
        self.write(&name, slot, value)
    }

    /// Replace `name` if it exists anywhere; otherwise create it, as an
    /// entity group for group values and as a user variable for the rest.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let name = name.to_lowercase();
        if let Some(slot) = self.locate(&name, Namespace::All) {
            return self.write(&name, slot, value);
        }
        match value {
            Value::Group(members) => {
                self.groups.insert(name, EntityGroup::new(members));
            }
            Value::Snippet(_) => {
                return Err(StoreError::mismatch(Namespace::UserVar, Kind::List, &value));
            }
            other => {
                self.user_vars.insert(name, other);
            }
        }
        Ok(())
    }

    fn locate(&self, name: &str, namespace: Namespace) -> Option<Slot> {
        use Namespace as N;
        if namespace == N::Snippet {
            return self.snippets.contains_key(name).then_some(Slot::Snippet);
        }
        if matches!(namespace, N::All | N::WordSet) && self.word_sets.contains_key(name) {
            return Some(Slot::WordSet);
        }
        if matches!(namespace, N::All | N::SentenceSet) && self.sentence_sets.contains_key(name) {
            return Some(Slot::SentenceSet);
        }
        if matches!(namespace, N::All | N::EntityGroup) {
            if self.groups.contains_key(name) {
                return Some(Slot::Group);
            }
            if let Some((group, field)) = split_dotted(name) {
                let has_field = self
                    .groups
                    .get(group)
                    .and_then(|g| g.active())
                    .is_some_and(|e| e.has_field(field));
                if has_field {
                    return Some(Slot::GroupField);
                }
            }
        }
        if matches!(namespace, N::All | N::UserVar) {
            if self.user_vars.contains_key(name) {
                return Some(Slot::UserVar);
            }
            if let Some(folder) = self.folder_aliases.get(name) {
                return Some(Slot::Alias(*folder));
            }
        }
        None
    }

    fn read(&self, name: &str, slot: Slot) -> Option<ValueRef<'_>> {
        match slot {
            Slot::WordSet => self.word_sets.get(name).map(ValueRef::List),
            Slot::SentenceSet => self.sentence_sets.get(name).map(ValueRef::List),
            Slot::Group => self.groups.get(name).map(ValueRef::Group),
            Slot::GroupField => {
                let (group, field) = split_dotted(name)?;
                self.groups
                    .get(group)?
                    .active()?
                    .field(field)
                    .map(ValueRef::List)
            }
            // groups and snippets never land in user variables
            Slot::UserVar => self.user_vars.get(name).and_then(|value| match value {
                Value::List(list) => Some(ValueRef::List(list)),
                Value::Catalog(catalog) => Some(ValueRef::Catalog(catalog)),
                Value::Group(_) | Value::Snippet(_) => None,
            }),
            Slot::Alias(Folder::Words) => Some(ValueRef::Catalog(&self.word_sets)),
            Slot::Alias(Folder::Sentences) => Some(ValueRef::Catalog(&self.sentence_sets)),
            Slot::Snippet => self.snippets.get(name).map(|n| ValueRef::Snippet(n.as_slice())),
        }
    }

    fn write(&mut self, name: &str, slot: Slot, value: Value) -> Result<(), StoreError> {
        match (slot, value) {
            (Slot::WordSet, Value::List(list)) => self.word_sets.insert(name.to_string(), list),
            (Slot::SentenceSet, Value::List(list)) => {
                self.sentence_sets.insert(name.to_string(), list)
            }
            (Slot::Group, Value::Group(members)) => {
                if let Some(group) = self.groups.get_mut(name) {
                    group.replace_members(members);
                }
            }
            (Slot::GroupField, Value::List(list)) => {
                let (group, field) =
                    split_dotted(name).ok_or_else(|| StoreError::Missing(name.to_string()))?;
                let entity = self
                    .groups
                    .get_mut(group)
                    .and_then(|g| g.active_mut())
                    .ok_or_else(|| StoreError::Missing(name.to_string()))?;
                entity.set_field(field, list);
            }
            (Slot::UserVar | Slot::Alias(_), value @ (Value::List(_) | Value::Catalog(_))) => {
                self.folder_aliases.remove(name);
                self.user_vars.insert(name.to_string(), value);
            }
            (Slot::Snippet, Value::Snippet(nodes)) => {
                self.snippets.insert(name.to_string(), nodes);
            }
            (slot, value) => {
                let (namespace, expected) = match slot {
                    Slot::WordSet => (Namespace::WordSet, Kind::List),
                    Slot::SentenceSet => (Namespace::SentenceSet, Kind::List),
                    Slot::Group => (Namespace::EntityGroup, Kind::Group),
                    Slot::GroupField => (Namespace::EntityGroup, Kind::List),
                    Slot::UserVar | Slot::Alias(_) => (Namespace::UserVar, Kind::List),
                    Slot::Snippet => (Namespace::Snippet, Kind::Snippet),
                };
                return Err(StoreError::mismatch(namespace, expected, &value));
            }
        }
        Ok(())
    }
}
