//! One-shot implementations of the [XXH64] and [XXH3-128] hash
//! algorithms.
//!
//! Both algorithms hash a complete byte slice in a single call. There
//! is no incremental interface; if the data is not in memory yet,
//! gather it first.
//!
//! [XXH64]: https://github.com/Cyan4973/xxHash/blob/dev/doc/xxhash_spec.md
//! [XXH3-128]: https://github.com/Cyan4973/xxHash
//!
//! ### Hashing with XXH64
//!
//! ```rust
//! let hash = xxdigest::hash64(0, b"Hello, world!\0");
//! assert_eq!(hash, 0x7b06_c531_ea43_e89f);
//! ```
//!
//! ### Hashing with XXH3-128
//!
//! ```rust
//! use xxdigest::Hash128;
//!
//! let hash = xxdigest::hash128(0, &[]);
//! assert_eq!(u128::from(hash), 0x99aa_06d3_0147_98d8_6001_c324_468d_497f);
//! assert_eq!(hash.low64, 0x6001_c324_468d_497f);
//! assert_eq!(hash, Hash128::from(0x99aa_06d3_0147_98d8_6001_c324_468d_497f));
//! ```
//!
//! ### With a custom secret
//!
//! ```rust
//! let secret = [0x5a; xxdigest::SECRET_MINIMUM_LENGTH];
//! let hash = xxdigest::hash128_with_secret(0, &secret, b"some data").unwrap();
//!
//! let short_secret = [0x5a; 16];
//! assert!(xxdigest::hash128_with_secret(0, &short_secret, b"some data").is_err());
//! # let _ = hash;
//! ```
//!
//! ## Feature flags
//!
//! | name          | description                                                              |
//! |---------------|--------------------------------------------------------------------------|
//! | `std`         | Detects SIMD support at runtime and caches the result (default)          |
//! | `xxhash64`    | Compiles the XXH64 algorithm (default)                                   |
//! | `xxhash3_128` | Compiles the XXH3-128 algorithm (default)                                |
//! | `serialize`   | Implements `serde::Serialize` and `serde::Deserialize` for [`Hash128`][] |

#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "xxhash64")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash64")))]
pub mod xxhash64;

#[cfg(feature = "xxhash64")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash64")))]
pub use xxhash64::Hasher as XxHash64;

#[cfg(feature = "xxhash3_128")]
mod xxhash3;

#[cfg(feature = "xxhash3_128")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash3_128")))]
pub use xxhash3::{
    derive_secret, Backend, UnsupportedBackendError, DEFAULT_SECRET_LENGTH, SECRET_MINIMUM_LENGTH,
};

#[cfg(feature = "xxhash3_128")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash3_128")))]
pub mod xxhash3_128;

#[cfg(feature = "xxhash3_128")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash3_128")))]
pub use xxhash3_128::{Hash128, Hasher as XxHash3_128, OneshotWithSecretError};

/// Computes the XXH64 hash of `data`.
///
/// This is a shorthand for [`XxHash64::oneshot`][].
#[cfg(feature = "xxhash64")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash64")))]
#[must_use]
#[inline]
pub fn hash64(seed: u64, data: &[u8]) -> u64 {
    XxHash64::oneshot(seed, data)
}

/// Computes the XXH3-128 hash of `data`.
///
/// This is a shorthand for [`XxHash3_128::oneshot_with_seed`][].
#[cfg(feature = "xxhash3_128")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash3_128")))]
#[must_use]
#[inline]
pub fn hash128(seed: u64, data: &[u8]) -> Hash128 {
    XxHash3_128::oneshot_with_seed(seed, data)
}

/// Computes the XXH3-128 hash of `data` using a caller-provided
/// secret.
///
/// This is a shorthand for [`XxHash3_128::oneshot_with_seed_and_secret`][].
#[cfg(feature = "xxhash3_128")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash3_128")))]
#[inline]
pub fn hash128_with_secret(
    seed: u64,
    secret: &[u8],
    data: &[u8],
) -> Result<Hash128, OneshotWithSecretError> {
    XxHash3_128::oneshot_with_seed_and_secret(seed, secret, data)
}

#[cfg(feature = "xxhash3_128")]
trait IntoU32 {
    fn into_u32(self) -> u32;
}

#[cfg(feature = "xxhash3_128")]
impl IntoU32 for u8 {
    #[inline(always)]
    fn into_u32(self) -> u32 {
        self.into()
    }
}

trait IntoU64 {
    fn into_u64(self) -> u64;
}

impl IntoU64 for u8 {
    #[inline(always)]
    fn into_u64(self) -> u64 {
        self.into()
    }
}

impl IntoU64 for u32 {
    #[inline(always)]
    fn into_u64(self) -> u64 {
        self.into()
    }
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl IntoU64 for usize {
    #[inline(always)]
    fn into_u64(self) -> u64 {
        self as u64
    }
}

#[cfg(feature = "xxhash3_128")]
trait IntoU128 {
    fn into_u128(self) -> u128;
}

#[cfg(feature = "xxhash3_128")]
impl IntoU128 for u64 {
    #[inline(always)]
    fn into_u128(self) -> u128 {
        u128::from(self)
    }
}

/// Stable stand-ins for the `slice::as_chunks` family.
trait SliceBackport<T> {
    fn bp_as_chunks<const N: usize>(&self) -> (&[[T; N]], &[T]);

    #[cfg(feature = "xxhash3_128")]
    fn bp_as_chunks_mut<const N: usize>(&mut self) -> (&mut [[T; N]], &mut [T]);

    #[cfg(feature = "xxhash3_128")]
    fn bp_as_rchunks<const N: usize>(&self) -> (&[T], &[[T; N]]);
}

impl<T> SliceBackport<T> for [T] {
    #[inline]
    fn bp_as_chunks<const N: usize>(&self) -> (&[[T; N]], &[T]) {
        assert_ne!(N, 0);
        let len = self.len() / N;
        // Safety: `len * N` is never more than `self.len()`
        let (head, tail) = unsafe { self.split_at_unchecked(len * N) };
        // Safety: `head` holds exactly `len * N` initialized elements
        // and `[T; N]` has the same alignment as `T`.
        let head = unsafe { core::slice::from_raw_parts(head.as_ptr().cast(), len) };
        (head, tail)
    }

    #[cfg(feature = "xxhash3_128")]
    #[inline]
    fn bp_as_chunks_mut<const N: usize>(&mut self) -> (&mut [[T; N]], &mut [T]) {
        assert_ne!(N, 0);
        let len = self.len() / N;
        // Safety: `len * N` is never more than `self.len()`
        let (head, tail) = unsafe { self.split_at_mut_unchecked(len * N) };
        // Safety: `head` holds exactly `len * N` initialized elements
        // and `[T; N]` has the same alignment as `T`.
        let head = unsafe { core::slice::from_raw_parts_mut(head.as_mut_ptr().cast(), len) };
        (head, tail)
    }

    #[cfg(feature = "xxhash3_128")]
    #[inline]
    fn bp_as_rchunks<const N: usize>(&self) -> (&[T], &[[T; N]]) {
        assert_ne!(N, 0);
        let len = self.len() / N;
        // Safety: `len * N` is never more than `self.len()`
        let (head, tail) = unsafe { self.split_at_unchecked(self.len() - len * N) };
        // Safety: `tail` holds exactly `len * N` initialized elements
        // and `[T; N]` has the same alignment as `T`.
        let tail = unsafe { core::slice::from_raw_parts(tail.as_ptr().cast(), len) };
        (head, tail)
    }
}
