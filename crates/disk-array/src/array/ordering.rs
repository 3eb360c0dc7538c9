//! Equality and ordering over the logical elements.
//!
//! Every relational operator goes through [`compare`], a single three-way
//! comparison: elements of the shared prefix decide first, and when they are
//! all equal the shorter array is the lesser one.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::DiskArray;
use crate::element::Element;

/// Three-way comparison of two element sequences.
///
/// Returns `None` if some pair in the shared prefix is unordered (e.g. NaN).
pub(crate) fn compare<T: PartialOrd>(left: &[T], right: &[T]) -> Option<Ordering> {
    for (a, b) in left.iter().zip(right) {
        match a.partial_cmp(b)? {
            Ordering::Equal => {}
            decided => return Some(decided),
        }
    }
    Some(left.len().cmp(&right.len()))
}

impl<T: Element + PartialEq> PartialEq for DiskArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element + Eq> Eq for DiskArray<T> {}

impl<T: Element + PartialEq> PartialEq<[T]> for DiskArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Element + PartialEq, const N: usize> PartialEq<[T; N]> for DiskArray<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element + PartialOrd> PartialOrd for DiskArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        compare(self.as_slice(), other.as_slice())
    }
}

impl<T: Element + Ord> Ord for DiskArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Total orders never yield `None`.
        compare(self.as_slice(), other.as_slice()).unwrap_or(Ordering::Equal)
    }
}

impl<T: Element + Hash> Hash for DiskArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::StorageOptions;

    fn array_of(options: &StorageOptions, values: &[i32]) -> DiskArray<i32> {
        let mut array = DiskArray::with_options(options.clone());
        array.assign_slice(values).unwrap();
        array
    }

    #[test]
    fn compare_uses_prefix_then_length() {
        assert_eq!(compare(&[1, 2], &[1, 3]), Some(Ordering::Less));
        assert_eq!(compare(&[2], &[1, 9, 9]), Some(Ordering::Greater));
        assert_eq!(compare(&[1, 2], &[1, 2, 0]), Some(Ordering::Less));
        assert_eq!(compare::<i32>(&[], &[]), Some(Ordering::Equal));
        assert_eq!(compare(&[f64::NAN], &[1.0]), None);
    }

    #[test]
    fn equal_sequences_from_any_construction_path() {
        let dir = tempfile::tempdir().unwrap();
        let options = StorageOptions::new().directory(dir.path());

        let assigned = array_of(&options, &[4, 5, 6]);

        let mut pushed = DiskArray::with_options(options.clone());
        for v in [4, 5, 6] {
            pushed.push(v).unwrap();
        }

        let mut inserted = DiskArray::with_options(options.clone());
        inserted.assign_iter([4, 6]).unwrap();
        inserted.insert(1, 5).unwrap();

        for (a, b) in [(&assigned, &pushed), (&pushed, &inserted), (&assigned, &inserted)] {
            assert_eq!(a, b);
            assert!(!(a < b));
            assert!(!(a > b));
            assert!(a <= b && a >= b);
            assert_eq!(a.cmp(b), Ordering::Equal);
        }
        assert_ne!(assigned.capacity(), inserted.capacity());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let dir = tempfile::tempdir().unwrap();
        let options = StorageOptions::new().directory(dir.path());
        let short = array_of(&options, &[1, 2]);
        let long = array_of(&options, &[1, 2, 3]);
        let bigger = array_of(&options, &[1, 3]);

        assert!(short < long);
        assert!(long > short);
        assert!(long < bigger);
        assert!(bigger >= long);
        assert_ne!(short, long);
        assert_eq!(short, [1, 2]);
        assert!(short == *[1, 2].as_slice());

        let mut sorted = vec![bigger, long, short];
        sorted.sort();
        assert_eq!(sorted[0], [1, 2]);
        assert_eq!(sorted[2], [1, 3]);
    }
}
