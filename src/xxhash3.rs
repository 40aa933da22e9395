//! Pieces shared by the XXH3 family: constants, the secret, the
//! mixing primitives and the accumulator backends used for long
//! inputs.

#![deny(
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    unsafe_op_in_unsafe_fn
)]

use crate::{IntoU128 as _, SliceBackport as _};

mod backend;
mod secret;

pub use backend::{Backend, Detected, UnsupportedBackendError};
pub use secret::{Error as SecretError, Secret, SECRET_MINIMUM_LENGTH};

// This module is not `cfg`-gated because it is the fallback for
// every other implementation.
pub mod scalar;

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
pub mod neon;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

#[cfg(target_arch = "x86_64")]
pub mod sse2;

pub mod primes {
    pub const PRIME32_1: u64 = 0x9E3779B1;
    pub const PRIME32_2: u64 = 0x85EBCA77;
    pub const PRIME32_3: u64 = 0xC2B2AE3D;
    pub const PRIME64_1: u64 = 0x9E3779B185EBCA87;
    pub const PRIME64_2: u64 = 0xC2B2AE3D27D4EB4F;
    pub const PRIME64_3: u64 = 0x165667B19E3779F9;
    pub const PRIME64_4: u64 = 0x85EBCA77C2B2AE63;
    pub const PRIME64_5: u64 = 0x27D4EB2F165667C5;
    pub const PRIME_MX1: u64 = 0x165667919E3779F9;
    pub const PRIME_MX2: u64 = 0x9FB21C651E98DF25;
}

use primes::*;

/// Inputs longer than this are hashed with the accumulator loop.
pub const CUTOFF: usize = 240;

pub const DEFAULT_SEED: u64 = 0;

pub const STRIPE_BYTES: usize = 64;

/// How far the secret advances between two stripes.
pub const SECRET_CONSUME_RATE: usize = 8;

/// The length of the default secret.
pub const DEFAULT_SECRET_LENGTH: usize = 192;

pub type DefaultSecret = [u8; DEFAULT_SECRET_LENGTH];

pub const DEFAULT_SECRET_RAW: DefaultSecret = [
    0xb8, 0xfe, 0x6c, 0x39, 0x23, 0xa4, 0x4b, 0xbe, 0x7c, 0x01, 0x81, 0x2c, 0xf7, 0x21, 0xad, 0x1c,
    0xde, 0xd4, 0x6d, 0xe9, 0x83, 0x90, 0x97, 0xdb, 0x72, 0x40, 0xa4, 0xa4, 0xb7, 0xb3, 0x67, 0x1f,
    0xcb, 0x79, 0xe6, 0x4e, 0xcc, 0xc0, 0xe5, 0x78, 0x82, 0x5a, 0xd0, 0x7d, 0xcc, 0xff, 0x72, 0x21,
    0xb8, 0x08, 0x46, 0x74, 0xf7, 0x43, 0x24, 0x8e, 0xe0, 0x35, 0x90, 0xe6, 0x81, 0x3a, 0x26, 0x4c,
    0x3c, 0x28, 0x52, 0xbb, 0x91, 0xc3, 0x00, 0xcb, 0x88, 0xd0, 0x65, 0x8b, 0x1b, 0x53, 0x2e, 0xa3,
    0x71, 0x64, 0x48, 0x97, 0xa2, 0x0d, 0xf9, 0x4e, 0x38, 0x19, 0xef, 0x46, 0xa9, 0xde, 0xac, 0xd8,
    0xa8, 0xfa, 0x76, 0x3f, 0xe3, 0x9c, 0x34, 0x3f, 0xf9, 0xdc, 0xbb, 0xc7, 0xc7, 0x0b, 0x4f, 0x1d,
    0x8a, 0x51, 0xe0, 0x4b, 0xcd, 0xb4, 0x59, 0x31, 0xc8, 0x9f, 0x7e, 0xc9, 0xd9, 0x78, 0x73, 0x64,
    0xea, 0xc5, 0xac, 0x83, 0x34, 0xd3, 0xeb, 0xc3, 0xc5, 0x81, 0xa0, 0xff, 0xfa, 0x13, 0x63, 0xeb,
    0x17, 0x0d, 0xdd, 0x51, 0xb7, 0xf0, 0xda, 0x49, 0xd3, 0x16, 0x55, 0x26, 0x29, 0xd4, 0x68, 0x9e,
    0x2b, 0x16, 0xbe, 0x58, 0x7d, 0x47, 0xa1, 0xfc, 0x8f, 0xf8, 0xb8, 0xd1, 0x7a, 0xd0, 0x31, 0xce,
    0x45, 0xcb, 0x3a, 0x8f, 0x95, 0x16, 0x04, 0x28, 0xaf, 0xd7, 0xfb, 0xca, 0xbb, 0x4b, 0x40, 0x7e,
];

// Safety: The default secret is long enough
pub const DEFAULT_SECRET: &Secret = unsafe { Secret::new_unchecked(&DEFAULT_SECRET_RAW) };

#[rustfmt::skip]
pub const INITIAL_ACCUMULATORS: [u64; 8] = [
    PRIME32_3, PRIME64_1, PRIME64_2, PRIME64_3,
    PRIME64_4, PRIME32_2, PRIME64_5, PRIME32_1,
];

/// Runs `$fn_name` with the vector implementation that `$backend`
/// names. The function's first argument must be `impl Vector`.
macro_rules! dispatch {
    (
        $backend:expr => fn $fn_name:ident($($arg_name:ident : $arg_ty:ty),*) $(-> $ret_ty:ty)?
    ) => {{
        #[inline]
        fn do_scalar($($arg_name : $arg_ty),*) $(-> $ret_ty)? {
            $fn_name($crate::xxhash3::scalar::Impl, $($arg_name),*)
        }

        /// # Safety
        ///
        /// You must ensure that the CPU has the NEON feature
        #[inline]
        #[target_feature(enable = "neon")]
        #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
        unsafe fn do_neon($($arg_name : $arg_ty),*) $(-> $ret_ty)? {
            // Safety: The caller has ensured we have the NEON feature
            unsafe {
                $fn_name($crate::xxhash3::neon::Impl::new_unchecked(), $($arg_name),*)
            }
        }

        /// # Safety
        ///
        /// You must ensure that the CPU has the AVX2 feature
        #[inline]
        #[target_feature(enable = "avx2")]
        #[cfg(target_arch = "x86_64")]
        unsafe fn do_avx2($($arg_name : $arg_ty),*) $(-> $ret_ty)? {
            // Safety: The caller has ensured we have the AVX2 feature
            unsafe {
                $fn_name($crate::xxhash3::avx2::Impl::new_unchecked(), $($arg_name),*)
            }
        }

        /// # Safety
        ///
        /// You must ensure that the CPU has the SSE2 feature
        #[inline]
        #[target_feature(enable = "sse2")]
        #[cfg(target_arch = "x86_64")]
        unsafe fn do_sse2($($arg_name : $arg_ty),*) $(-> $ret_ty)? {
            // Safety: The caller has ensured we have the SSE2 feature
            unsafe {
                $fn_name($crate::xxhash3::sse2::Impl::new_unchecked(), $($arg_name),*)
            }
        }

        let backend: $crate::xxhash3::Detected = $backend;

        match backend.get() {
            #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
            $crate::xxhash3::Backend::Neon => {
                // Safety: A `Detected` backend is always available
                unsafe { do_neon($($arg_name),*) }
            }

            #[cfg(target_arch = "x86_64")]
            $crate::xxhash3::Backend::Avx2 => {
                // Safety: A `Detected` backend is always available
                unsafe { do_avx2($($arg_name),*) }
            }

            #[cfg(target_arch = "x86_64")]
            $crate::xxhash3::Backend::Sse2 => {
                // Safety: A `Detected` backend is always available
                unsafe { do_sse2($($arg_name),*) }
            }

            _ => do_scalar($($arg_name),*),
        }
    }};
}
pub(crate) use dispatch;

macro_rules! assert_input_range {
    ($min:literal.., $len:expr) => {
        assert!($min <= $len);
    };
    ($min:literal..=$max:literal, $len:expr) => {
        assert!($min <= $len);
        assert!($len <= $max);
    };
}
pub(crate) use assert_input_range;

/// Derives the secret that inputs longer than 240 bytes are hashed
/// with when a nonzero seed is used.
///
/// Even 64-bit words of the default secret have the seed added and
/// odd words have it subtracted. A seed of zero returns the default
/// secret unchanged. The result is the same no matter which
/// [`Backend`][] computes it.
#[must_use]
pub fn derive_secret(seed: u64) -> [u8; DEFAULT_SECRET_LENGTH] {
    let mut secret = DEFAULT_SECRET_RAW;
    derive_secret_on(Detected::active(), seed, &mut secret);
    secret
}

/// # Correctness
///
/// This function assumes that the incoming buffer has been populated
/// with the default secret.
#[inline]
pub fn derive_secret_on(backend: Detected, seed: u64, secret: &mut DefaultSecret) {
    if seed == DEFAULT_SEED {
        return;
    }

    dispatch! {
        backend => fn derive_secret_impl(seed: u64, secret: &mut DefaultSecret)
    }
}

#[inline]
fn derive_secret_impl(vector: impl Vector, seed: u64, secret: &mut DefaultSecret) {
    vector.derive_secret(seed, secret)
}

/// The per-stripe and per-block steps of the long input loop.
///
/// Every implementation must produce bit-identical accumulators; the
/// scalar one is the reference the others are checked against.
pub trait Vector: Copy {
    /// Scrambles every lane after a full block:
    /// `lane = (lane ^ (lane >> 47) ^ secret) * PRIME32_1`.
    fn round_scramble(&self, acc: &mut [u64; 8], secret_end: &[u8; 64]);

    /// Mixes one stripe into the lanes. Lane `i ^ 1` receives the raw
    /// input word and lane `i` receives the 32x32 product of the two
    /// halves of `input ^ secret`.
    fn accumulate(&self, acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]);

    /// Adds the seed to the even words of `secret` and subtracts it
    /// from the odd ones.
    fn derive_secret(&self, seed: u64, secret: &mut DefaultSecret);
}

#[inline]
pub fn avalanche(mut x: u64) -> u64 {
    x ^= x >> 37;
    x = x.wrapping_mul(PRIME_MX1);
    x ^= x >> 32;
    x
}

#[inline]
pub fn avalanche_xxh64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(PRIME64_2);
    x ^= x >> 29;
    x = x.wrapping_mul(PRIME64_3);
    x ^= x >> 32;
    x
}

/// 64-bit by 64-bit multiplication to a 128-bit result, folded back
/// to 64 bits by xoring the halves.
#[inline]
pub fn multiply_fold(lhs: u64, rhs: u64) -> u64 {
    let product = lhs.into_u128().wrapping_mul(rhs.into_u128());
    product.lower_half() ^ product.upper_half()
}

pub trait Halves {
    type Output;

    fn upper_half(self) -> Self::Output;
    fn lower_half(self) -> Self::Output;
}

impl Halves for u64 {
    type Output = u32;

    #[inline]
    fn upper_half(self) -> Self::Output {
        (self >> 32) as _
    }

    #[inline]
    fn lower_half(self) -> Self::Output {
        self as _
    }
}

impl Halves for u128 {
    type Output = u64;

    #[inline]
    fn upper_half(self) -> Self::Output {
        (self >> 64) as _
    }

    #[inline]
    fn lower_half(self) -> Self::Output {
        self as _
    }
}

/// Little-endian reads from either end of a slice. The caller has
/// already checked that the slice is long enough.
pub trait U8SliceExt {
    fn first_u32(&self) -> u32;

    fn last_u32(&self) -> u32;

    fn first_u64(&self) -> u64;

    fn last_u64(&self) -> u64;
}

impl U8SliceExt for [u8] {
    #[inline]
    fn first_u32(&self) -> u32 {
        let (head, _) = self.bp_as_chunks();
        u32::from_le_bytes(head[0])
    }

    #[inline]
    fn last_u32(&self) -> u32 {
        let (_, tail) = self.bp_as_rchunks();
        u32::from_le_bytes(tail[tail.len() - 1])
    }

    #[inline]
    fn first_u64(&self) -> u64 {
        let (head, _) = self.bp_as_chunks();
        u64::from_le_bytes(head[0])
    }

    #[inline]
    fn last_u64(&self) -> u64 {
        let (_, tail) = self.bp_as_rchunks();
        u64::from_le_bytes(tail[tail.len() - 1])
    }
}
