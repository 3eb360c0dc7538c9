//! Serde support: arrays serialize as a sequence of their elements.
//!
//! The plain `Deserialize` impl uses default [`StorageOptions`]; use
//! [`DiskArraySeed`] to choose where the new array keeps its file.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, DeserializeSeed, Deserializer, Error as DeError, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::DiskArray;
use crate::element::Element;
use crate::options::StorageOptions;

/// Most elements reserved up front from a sequence's size hint.
///
/// Longer sequences still load; they grow as elements arrive.
const MAX_PREALLOCATED: usize = 4096;

impl<T> Serialize for DiskArray<T>
where
    T: Element + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self.as_slice() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

/// Deserializes a [`DiskArray`] whose file follows the given options.
pub struct DiskArraySeed<T> {
    options: StorageOptions,
    _marker: PhantomData<T>,
}

impl<T> DiskArraySeed<T> {
    pub fn new(options: StorageOptions) -> Self {
        Self {
            options,
            _marker: PhantomData,
        }
    }
}

impl<'de, T> DeserializeSeed<'de> for DiskArraySeed<T>
where
    T: Element + Deserialize<'de>,
{
    type Value = DiskArray<T>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(DiskArrayVisitor {
            options: self.options,
            _marker: PhantomData,
        })
    }
}

struct DiskArrayVisitor<T> {
    options: StorageOptions,
    _marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for DiskArrayVisitor<T>
where
    T: Element + Deserialize<'de>,
{
    type Value = DiskArray<T>;

    fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut array = DiskArray::with_options(self.options);
        // The hint comes from the input, so it only bounds the first allocation.
        if let Some(size) = seq.size_hint() {
            array
                .ensure_capacity(size.min(MAX_PREALLOCATED))
                .map_err(A::Error::custom)?;
        }
        while let Some(value) = seq.next_element::<T>()? {
            array.push(value).map_err(A::Error::custom)?;
        }
        Ok(array)
    }
}

impl<'de, T> Deserialize<'de> for DiskArray<T>
where
    T: Element + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        DiskArraySeed::new(StorageOptions::default()).deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, StorageOptions) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let options = StorageOptions::new().directory(dir.path());
        (dir, options)
    }

    fn restore<T>(bytes: &[u8], options: &StorageOptions) -> postcard::Result<DiskArray<T>>
    where
        T: Element + for<'de> Deserialize<'de>,
    {
        let mut deserializer = postcard::Deserializer::from_bytes(bytes);
        DiskArraySeed::new(options.clone()).deserialize(&mut deserializer)
    }

    #[test]
    fn serialization_roundtrip() {
        let (dir, options) = scratch();
        let array =
            DiskArray::from_slice_with_capacity_in(&[10u32, 20, 30], 3, options.clone()).unwrap();

        let bytes = postcard::to_stdvec(&array).expect("serialization should succeed");
        let restored: DiskArray<u32> =
            restore(&bytes, &options).expect("deserialization should succeed");

        assert_eq!(restored, array);
        assert_eq!(restored.capacity(), 3);
        assert_ne!(restored.path(), array.path());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn serializes_like_a_vec() {
        let (_dir, options) = scratch();
        let array =
            DiskArray::from_slice_with_capacity_in(&[1i16, -2, 3], 3, options).unwrap();
        assert_eq!(
            postcard::to_stdvec(&array).unwrap(),
            postcard::to_stdvec(&vec![1i16, -2, 3]).unwrap()
        );
    }

    #[test]
    fn empty_sequence_deserializes_without_a_file() {
        let bytes = postcard::to_stdvec(&Vec::<u64>::new()).unwrap();
        let restored: DiskArray<u64> = postcard::from_bytes(&bytes).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.capacity(), 0);
        assert_eq!(restored.path(), None);
    }

    #[test]
    fn inflated_length_prefix_reserves_a_bounded_amount() {
        let (dir, options) = scratch();
        // A sequence length prefix claiming 2^40 elements with no elements after it.
        let bytes = postcard::to_stdvec(&(1u64 << 40)).unwrap();

        let err = restore::<u32>(&bytes, &options).unwrap_err();
        assert_eq!(err, postcard::Error::DeserializeUnexpectedEnd);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn long_sequences_grow_past_the_reservation() {
        let (_dir, options) = scratch();
        let values: Vec<u16> = (0..5000).collect();
        let bytes = postcard::to_stdvec(&values).unwrap();

        let restored: DiskArray<u16> = restore(&bytes, &options).unwrap();
        assert_eq!(restored.as_slice(), values.as_slice());
        assert!(restored.capacity() >= 5000);
    }
}
