//! Element types that can live in mapped storage.

/// Fixed-layout value type that can be stored as raw bytes in a backing file.
///
/// Elements are moved in and out of storage with plain byte copies, and bytes
/// past the logical length hold whatever the file last contained (zeros for
/// freshly sized regions, stale values otherwise).
///
/// # Safety
///
/// Implementors must guarantee that:
/// - every bit pattern of `size_of::<Self>()` bytes is a valid value,
/// - the type owns no heap memory or other resources,
/// - the type is not zero-sized.
///
/// `#[repr(C)]` structs made only of `Element` fields satisfy the first two
/// points; padding bytes are fine because the file always backs them.
pub unsafe trait Element: Copy + 'static {}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numeric types accept every bit pattern.
            unsafe impl Element for $ty {}
        )*
    };
}

impl_element!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// SAFETY: an array of valid elements is valid for any bit pattern of its
// items. `N == 0` is rejected by the zero-size check at construction.
unsafe impl<T: Element, const N: usize> Element for [T; N] {}
