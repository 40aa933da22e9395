use core::arch::x86_64::*;

use super::{primes::PRIME32_1, DefaultSecret, Vector};

#[derive(Copy, Clone)]
pub struct Impl(());

impl Impl {
    /// # Safety
    ///
    /// You must ensure that the CPU has the AVX2 feature
    #[inline]
    pub unsafe fn new_unchecked() -> Impl {
        Impl(())
    }
}

impl Vector for Impl {
    #[inline]
    fn round_scramble(&self, acc: &mut [u64; 8], secret_end: &[u8; 64]) {
        // Safety: Type can only be constructed when AVX2 feature is present
        unsafe { round_scramble_avx2(acc, secret_end) }
    }

    #[inline]
    fn accumulate(&self, acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
        // Safety: Type can only be constructed when AVX2 feature is present
        unsafe { accumulate_avx2(acc, stripe, secret) }
    }

    #[inline]
    fn derive_secret(&self, seed: u64, secret: &mut DefaultSecret) {
        // Safety: Type can only be constructed when AVX2 feature is present
        unsafe { derive_secret_avx2(seed, secret) }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the AVX2 feature
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn round_scramble_avx2(acc: &mut [u64; 8], secret_end: &[u8; 64]) {
    // Safety: The caller has ensured we have the AVX2
    // feature. We load from and store to references so we
    // know that data is valid. We use unaligned loads /
    // stores. Data manipulation is otherwise done on
    // intermediate values.
    unsafe {
        let acc = acc.as_mut_ptr().cast::<__m256i>();
        let secret = secret_end.as_ptr().cast::<__m256i>();
        let prime = _mm256_set1_epi32(PRIME32_1 as i32);

        // The scramble is lane-local, so each half of the
        // accumulator is handled independently.
        for i in 0..2 {
            let a = _mm256_loadu_si256(acc.add(i));
            let shifted = _mm256_srli_epi64::<47>(a);
            let a = _mm256_xor_si256(a, shifted);

            let s = _mm256_loadu_si256(secret.add(i));
            let a = _mm256_xor_si256(a, s);

            let a_high = _mm256_shuffle_epi32::<0b00_11_00_01>(a);
            let low = _mm256_mul_epu32(a, prime);
            let high = _mm256_mul_epu32(a_high, prime);
            let high = _mm256_slli_epi64::<32>(high);

            _mm256_storeu_si256(acc.add(i), _mm256_add_epi64(low, high));
        }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the AVX2 feature
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn accumulate_avx2(acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
    // Safety: The caller has ensured we have the AVX2
    // feature. We load from and store to references so we
    // know that data is valid. We use unaligned loads /
    // stores. Data manipulation is otherwise done on
    // intermediate values.
    unsafe {
        let acc = acc.as_mut_ptr().cast::<__m256i>();
        let stripe = stripe.as_ptr().cast::<__m256i>();
        let secret = secret.as_ptr().cast::<__m256i>();

        for i in 0..2 {
            let a = _mm256_loadu_si256(acc.add(i));

            let d = _mm256_loadu_si256(stripe.add(i));
            let s = _mm256_loadu_si256(secret.add(i));
            let ds = _mm256_xor_si256(d, s);

            let ds_high = _mm256_shuffle_epi32::<0b00_11_00_01>(ds);
            let product = _mm256_mul_epu32(ds, ds_high);

            // Swaps the 64-bit words within each 128-bit lane
            let d_swapped = _mm256_shuffle_epi32::<0b01_00_11_10>(d);
            let a = _mm256_add_epi64(a, d_swapped);

            _mm256_storeu_si256(acc.add(i), _mm256_add_epi64(a, product));
        }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the AVX2 feature
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn derive_secret_avx2(seed: u64, secret: &mut DefaultSecret) {
    // Safety: The caller has ensured we have the AVX2
    // feature. We load from and store to references so we
    // know that data is valid. We use unaligned loads /
    // stores. Data manipulation is otherwise done on
    // intermediate values.
    unsafe {
        let n = secret.len() / 32;
        let secret = secret.as_mut_ptr().cast::<__m256i>();

        let neg = seed.wrapping_neg() as i64;
        let seed = seed as i64;
        let seed = _mm256_set_epi64x(neg, seed, neg, seed);

        for i in 0..n {
            let s = _mm256_loadu_si256(secret.add(i));
            _mm256_storeu_si256(secret.add(i), _mm256_add_epi64(s, seed));
        }
    }
}
