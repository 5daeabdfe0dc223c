//! Random selection and entity-group pointers.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::schema::entity::EntityGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PointerError {
    #[error("the gen has no members")]
    EmptyGroup,
    #[error("the gen pointer is undefined")]
    UndefinedPointer,
}

/// Draw up to `count` distinct items from `source`, never drawing anything
/// in `exclude`. After each draw every item equal to the drawn one leaves
/// the pool, so the result never repeats and its length is
/// `min(count, distinct items available)`.
pub fn unique_sample<T, R>(source: &[T], count: usize, exclude: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let mut pool: Vec<T> = source
        .iter()
        .filter(|item| !exclude.contains(item))
        .cloned()
        .collect();
    let mut drawn = Vec::with_capacity(count.min(pool.len()));
    while drawn.len() < count && !pool.is_empty() {
        let idx = rng.gen_range(0..pool.len());
        let item = pool.swap_remove(idx);
        pool.retain(|other| *other != item);
        drawn.push(item);
    }
    drawn
}

/// One uniform draw from `source \ exclude`.
pub fn sample_one<T, R>(source: &[T], exclude: &[T], rng: &mut R) -> Option<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let candidates: Vec<&T> = source.iter().filter(|item| !exclude.contains(item)).collect();
    candidates.choose(rng).map(|item| (*item).clone())
}

/// Move the pointer by `offset` places, wrapping in both directions.
pub fn shift_pointer(group: &mut EntityGroup, offset: i64) -> Result<usize, PointerError> {
    if group.is_empty() {
        return Err(PointerError::EmptyGroup);
    }
    let current = group.pointer().ok_or(PointerError::UndefinedPointer)?;
    let size = group.len() as i64;
    let target = (current as i64 + offset).rem_euclid(size) as usize;
    group.set_pointer(target);
    Ok(target)
}

/// Permute the members and keep the pointer on the same entity.
pub fn shuffle_group<R: Rng + ?Sized>(group: &mut EntityGroup, rng: &mut R) {
    if group.len() <= 1 {
        return;
    }
    let mut members = group.members().to_vec();
    members.shuffle(rng);
    group.replace_members(members);
}

/// The sentence index `WRITE` uses after `current`. In order mode this is
/// simply the next index; in random mode it is any other index, so two
/// consecutive sentences come from different entries whenever possible.
pub fn next_index<R: Rng + ?Sized>(current: usize, size: usize, ordered: bool, rng: &mut R) -> usize {
    if ordered {
        return current + 1;
    }
    if size <= 1 {
        return 0;
    }
    let pick = rng.gen_range(0..size - 1);
    if pick >= current % size {
        pick + 1
    } else {
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::entity::Entity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn named(name: &str) -> Entity {
        let mut e = Entity::new();
        e.set_field("name", vec![name.to_string()]);
        e
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unique_sample_collapses_duplicates() {
        let mut rng = StdRng::seed_from_u64(1);
        let source = strings(&["a", "a", "a", "b"]);
        let mut drawn = unique_sample(&source, 10, &[], &mut rng);
        drawn.sort();
        assert_eq!(drawn, strings(&["a", "b"]));
    }

    #[test]
    fn unique_sample_honours_exclusions() {
        let mut rng = StdRng::seed_from_u64(2);
        let source = strings(&["a", "b", "c"]);
        for _ in 0..50 {
            let drawn = unique_sample(&source, 2, &strings(&["b"]), &mut rng);
            assert_eq!(drawn.len(), 2);
            assert!(!drawn.contains(&"b".to_string()));
        }
        assert!(unique_sample(&source, 3, &source, &mut rng).is_empty());
        assert!(unique_sample::<String, _>(&[], 3, &[], &mut rng).is_empty());
    }

    #[test]
    fn sample_one_respects_exclusions() {
        let mut rng = StdRng::seed_from_u64(3);
        let source = strings(&["x", "y"]);
        for _ in 0..20 {
            assert_eq!(sample_one(&source, &strings(&["x"]), &mut rng), Some("y".to_string()));
        }
        assert_eq!(sample_one(&source, &source, &mut rng), None);
    }

    #[test]
    fn shift_wraps_both_ways() {
        let mut g = EntityGroup::new(vec![named("a"), named("b"), named("c")]);
        assert_eq!(shift_pointer(&mut g, -1), Ok(2));
        assert_eq!(shift_pointer(&mut g, 1), Ok(0));
        assert_eq!(shift_pointer(&mut g, 7), Ok(1));
        assert_eq!(shift_pointer(&mut g, -3), Ok(1));
    }

    #[test]
    fn shift_fails_on_empty_group() {
        let mut g = EntityGroup::new(Vec::new());
        assert_eq!(shift_pointer(&mut g, 1), Err(PointerError::EmptyGroup));
    }

    #[test]
    fn shuffle_keeps_active_member() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut g = EntityGroup::new((0..8).map(|i| named(&i.to_string())).collect());
        g.set_pointer(5);
        let active = g.active().cloned();
        for _ in 0..10 {
            shuffle_group(&mut g, &mut rng);
            assert_eq!(g.active().cloned(), active);
            assert_eq!(g.len(), 8);
        }
    }

    #[test]
    fn next_index_avoids_repeats() {
        let mut rng = StdRng::seed_from_u64(5);
        for current in 0..4 {
            for _ in 0..25 {
                let next = next_index(current, 4, false, &mut rng);
                assert!(next < 4);
                assert_ne!(next, current);
            }
        }
        assert_eq!(next_index(0, 1, false, &mut rng), 0);
        assert_eq!(next_index(3, 4, true, &mut rng), 4);
    }
}
