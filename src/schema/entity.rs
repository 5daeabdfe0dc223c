use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One generated record in an entity group: a character, a city, a ship.
///
/// Every field holds a word list. Two entities are equal when all of their
/// fields are equal, which is how group arithmetic and pointer re-anchoring
/// identify members.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entity {
    fields: BTreeMap<String, Vec<String>>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(|v| v.as_slice())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Vec<String>) {
        self.fields.insert(name.into(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// An ordered entity sequence with a pointer to its active member.
///
/// The pointer is `None` exactly when the group is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityGroup {
    members: Vec<Entity>,
    pointer: Option<usize>,
}

impl EntityGroup {
    pub fn new(members: Vec<Entity>) -> Self {
        let pointer = if members.is_empty() { None } else { Some(0) };
        Self { members, pointer }
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn active(&self) -> Option<&Entity> {
        self.pointer.and_then(|i| self.members.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Entity> {
        match self.pointer {
            Some(i) => self.members.get_mut(i),
            None => None,
        }
    }

    /// Point at `index`. Returns false (and changes nothing) when the index
    /// is out of range.
    pub fn set_pointer(&mut self, index: usize) -> bool {
        if index < self.members.len() {
            self.pointer = Some(index);
            true
        } else {
            false
        }
    }

    /// Replace the member sequence, keeping the pointer on the previously
    /// active member if an equal one is present, else resetting it to the
    /// first member.
    pub fn replace_members(&mut self, members: Vec<Entity>) {
        let previous = self.active().cloned();
        self.members = members;
        self.pointer = match previous.and_then(|p| self.members.iter().position(|m| *m == p)) {
            Some(idx) => Some(idx),
            None if self.members.is_empty() => None,
            None => Some(0),
        };
    }

    /// Collect a field across every member, in member order.
    pub fn field_across(&self, field: &str) -> Vec<String> {
        self.members
            .iter()
            .filter_map(|m| m.field(field))
            .flat_map(|v| v.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Entity {
        let mut e = Entity::new();
        e.set_field("name", vec![name.to_string()]);
        e
    }

    #[test]
    fn new_group_points_at_first_member() {
        let g = EntityGroup::new(vec![named("Ann"), named("Theo")]);
        assert_eq!(g.pointer(), Some(0));
        assert_eq!(g.active(), Some(&named("Ann")));
        assert_eq!(EntityGroup::new(Vec::new()).pointer(), None);
    }

    #[test]
    fn replace_members_reanchors_on_equal_member() {
        let mut g = EntityGroup::new(vec![named("Ann"), named("Theo"), named("Mina")]);
        assert!(g.set_pointer(1));
        g.replace_members(vec![named("Mina"), named("Theo")]);
        assert_eq!(g.pointer(), Some(1));
        assert_eq!(g.active(), Some(&named("Theo")));
    }

    #[test]
    fn replace_members_resets_when_active_is_gone() {
        let mut g = EntityGroup::new(vec![named("Ann"), named("Theo")]);
        g.set_pointer(1);
        g.replace_members(vec![named("Mina"), named("Ross")]);
        assert_eq!(g.pointer(), Some(0));
        g.replace_members(Vec::new());
        assert_eq!(g.pointer(), None);
        assert!(g.active().is_none());
    }

    #[test]
    fn set_pointer_rejects_out_of_range() {
        let mut g = EntityGroup::new(vec![named("Ann")]);
        assert!(!g.set_pointer(3));
        assert_eq!(g.pointer(), Some(0));
    }

    #[test]
    fn field_across_concatenates_in_order() {
        let mut a = named("Ann");
        a.set_field("pets", vec!["cat".into(), "dog".into()]);
        let mut b = named("Theo");
        b.set_field("pets", vec!["owl".into()]);
        let g = EntityGroup::new(vec![a, b, named("Mina")]);
        assert_eq!(g.field_across("pets"), vec!["cat", "dog", "owl"]);
        assert_eq!(g.field_across("name"), vec!["Ann", "Theo", "Mina"]);
    }
}
