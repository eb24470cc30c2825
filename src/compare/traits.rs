//! Per-entity equality and the multiset comparison built on it.

use super::result::CategoryOutcome;
use std::collections::HashMap;
use std::hash::Hash;

/// Equality rule for one entity category.
///
/// Two entities are equal when their keys are equal. The key is the
/// normalized, comparable projection of the entity: it includes every
/// compared field and leaves out the rest.
pub trait EntityComparer<T> {
    type Key: Eq + Hash;

    /// Normalized comparable form of `entity`.
    fn key(&self, entity: &T) -> Self::Key;
}

impl<T, C: EntityComparer<T>> EntityComparer<T> for &C {
    type Key = C::Key;

    fn key(&self, entity: &T) -> Self::Key {
        (*self).key(entity)
    }
}

/// Compare one category, stopping at a count mismatch.
///
/// Counts are checked before any key is computed, so unequal counts cost
/// nothing beyond the length check.
pub fn compare_category_with<T, C>(comparer: &C, left: &[T], right: &[T]) -> CategoryOutcome<T>
where
    T: Clone,
    C: EntityComparer<T>,
{
    if left.len() != right.len() {
        return CategoryOutcome::CountMismatch {
            left: left.len(),
            right: right.len(),
            only_in_left: Vec::new(),
            only_in_right: Vec::new(),
        };
    }
    multiset_outcome(comparer, left, right)
}

/// Compare one category and always list the entities on each side only.
pub fn diff_category_with<T, C>(comparer: &C, left: &[T], right: &[T]) -> CategoryOutcome<T>
where
    T: Clone,
    C: EntityComparer<T>,
{
    match multiset_outcome(comparer, left, right) {
        CategoryOutcome::ContentMismatch {
            only_in_left,
            only_in_right,
        } if left.len() != right.len() => CategoryOutcome::CountMismatch {
            left: left.len(),
            right: right.len(),
            only_in_left,
            only_in_right,
        },
        outcome => outcome,
    }
}

fn multiset_outcome<T, C>(comparer: &C, left: &[T], right: &[T]) -> CategoryOutcome<T>
where
    T: Clone,
    C: EntityComparer<T>,
{
    // Key -> indices of left entities with that key not yet matched.
    let mut unmatched: HashMap<C::Key, Vec<usize>> = HashMap::with_capacity(left.len());
    for (i, entity) in left.iter().enumerate() {
        unmatched.entry(comparer.key(entity)).or_default().push(i);
    }

    let mut only_in_right = Vec::new();
    for entity in right {
        let matched = unmatched
            .get_mut(&comparer.key(entity))
            .and_then(Vec::pop)
            .is_some();
        if !matched {
            only_in_right.push(entity.clone());
        }
    }

    let mut left_over: Vec<usize> = unmatched.into_values().flatten().collect();
    left_over.sort_unstable();
    let only_in_left: Vec<T> = left_over.into_iter().map(|i| left[i].clone()).collect();

    if only_in_left.is_empty() && only_in_right.is_empty() {
        CategoryOutcome::Equal
    } else {
        CategoryOutcome::ContentMismatch {
            only_in_left,
            only_in_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CaseInsensitive;

    impl EntityComparer<String> for CaseInsensitive {
        type Key = String;

        fn key(&self, entity: &String) -> String {
            entity.to_lowercase()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_equal_ignores_order() {
        let outcome = compare_category_with(&CaseInsensitive, &strings(&["a", "B"]), &strings(&["b", "A"]));
        assert!(outcome.is_equal());
    }

    #[test]
    fn test_multiset_semantics() {
        let outcome = compare_category_with(
            &CaseInsensitive,
            &strings(&["a", "a", "b"]),
            &strings(&["a", "b", "b"]),
        );
        assert_eq!(
            outcome,
            CategoryOutcome::ContentMismatch {
                only_in_left: strings(&["a"]),
                only_in_right: strings(&["b"]),
            }
        );
    }

    #[test]
    fn test_count_mismatch_short_circuits() {
        let outcome = compare_category_with(&CaseInsensitive, &strings(&["a"]), &strings(&["a", "b"]));
        assert_eq!(
            outcome,
            CategoryOutcome::CountMismatch {
                left: 1,
                right: 2,
                only_in_left: Vec::new(),
                only_in_right: Vec::new(),
            }
        );
    }

    #[test]
    fn test_diff_lists_entities_on_count_mismatch() {
        let outcome = diff_category_with(&CaseInsensitive, &strings(&["a"]), &strings(&["a", "b"]));
        assert_eq!(
            outcome,
            CategoryOutcome::CountMismatch {
                left: 1,
                right: 2,
                only_in_left: Vec::new(),
                only_in_right: strings(&["b"]),
            }
        );
    }
}
