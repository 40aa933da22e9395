use core::arch::x86_64::*;

use super::{primes::PRIME32_1, DefaultSecret, Vector};

#[derive(Copy, Clone)]
pub struct Impl(());

impl Impl {
    /// # Safety
    ///
    /// You must ensure that the CPU has the SSE2 feature
    #[inline]
    pub unsafe fn new_unchecked() -> Impl {
        Impl(())
    }
}

impl Vector for Impl {
    #[inline]
    fn round_scramble(&self, acc: &mut [u64; 8], secret_end: &[u8; 64]) {
        // Safety: Type can only be constructed when SSE2 feature is present
        unsafe { round_scramble_sse2(acc, secret_end) }
    }

    #[inline]
    fn accumulate(&self, acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
        // Safety: Type can only be constructed when SSE2 feature is present
        unsafe { accumulate_sse2(acc, stripe, secret) }
    }

    #[inline]
    fn derive_secret(&self, seed: u64, secret: &mut DefaultSecret) {
        // Safety: Type can only be constructed when SSE2 feature is present
        unsafe { derive_secret_sse2(seed, secret) }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the SSE2 feature
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn round_scramble_sse2(acc: &mut [u64; 8], secret_end: &[u8; 64]) {
    // Safety: The caller has ensured we have the SSE2
    // feature. We load from and store to references so we
    // know that data is valid. We use unaligned loads /
    // stores. Data manipulation is otherwise done on
    // intermediate values.
    unsafe {
        let acc = acc.as_mut_ptr().cast::<__m128i>();
        let secret = secret_end.as_ptr().cast::<__m128i>();
        let prime = _mm_set1_epi32(PRIME32_1 as i32);

        for i in 0..4 {
            let a = _mm_loadu_si128(acc.add(i));
            let shifted = _mm_srli_epi64::<47>(a);
            let a = _mm_xor_si128(a, shifted);

            let s = _mm_loadu_si128(secret.add(i));
            let a = _mm_xor_si128(a, s);

            let a_high = _mm_shuffle_epi32::<0b00_11_00_01>(a);
            let low = _mm_mul_epu32(a, prime);
            let high = _mm_mul_epu32(a_high, prime);
            let high = _mm_slli_epi64::<32>(high);

            _mm_storeu_si128(acc.add(i), _mm_add_epi64(low, high));
        }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the SSE2 feature
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn accumulate_sse2(acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
    // Safety: The caller has ensured we have the SSE2
    // feature. We load from and store to references so we
    // know that data is valid. We use unaligned loads /
    // stores. Data manipulation is otherwise done on
    // intermediate values.
    unsafe {
        let acc = acc.as_mut_ptr().cast::<__m128i>();
        let stripe = stripe.as_ptr().cast::<__m128i>();
        let secret = secret.as_ptr().cast::<__m128i>();

        for i in 0..4 {
            let a = _mm_loadu_si128(acc.add(i));

            let d = _mm_loadu_si128(stripe.add(i));
            let s = _mm_loadu_si128(secret.add(i));
            let ds = _mm_xor_si128(d, s);

            let ds_high = _mm_shuffle_epi32::<0b00_11_00_01>(ds);
            let product = _mm_mul_epu32(ds, ds_high);

            let d_swapped = _mm_shuffle_epi32::<0b01_00_11_10>(d);
            let a = _mm_add_epi64(a, d_swapped);

            _mm_storeu_si128(acc.add(i), _mm_add_epi64(a, product));
        }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the SSE2 feature
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn derive_secret_sse2(seed: u64, secret: &mut DefaultSecret) {
    // Safety: The caller has ensured we have the SSE2
    // feature. We load from and store to references so we
    // know that data is valid. We use unaligned loads /
    // stores. Data manipulation is otherwise done on
    // intermediate values.
    unsafe {
        let n = secret.len() / 16;
        let secret = secret.as_mut_ptr().cast::<__m128i>();
        let seed = _mm_set_epi64x(seed.wrapping_neg() as i64, seed as i64);

        for i in 0..n {
            let s = _mm_loadu_si128(secret.add(i));
            _mm_storeu_si128(secret.add(i), _mm_add_epi64(s, seed));
        }
    }
}
