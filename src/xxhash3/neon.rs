use core::arch::aarch64::*;

use super::{primes::PRIME32_1, DefaultSecret, Vector};

#[derive(Copy, Clone)]
pub struct Impl(());

impl Impl {
    /// # Safety
    ///
    /// You must ensure that the CPU has the NEON feature
    #[inline]
    pub unsafe fn new_unchecked() -> Self {
        Self(())
    }
}

impl Vector for Impl {
    #[inline]
    fn round_scramble(&self, acc: &mut [u64; 8], secret_end: &[u8; 64]) {
        // Safety: Type can only be constructed when NEON feature is present
        unsafe { round_scramble_neon(acc, secret_end) }
    }

    #[inline]
    fn accumulate(&self, acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
        // Safety: Type can only be constructed when NEON feature is present
        unsafe { accumulate_neon(acc, stripe, secret) }
    }

    #[inline]
    fn derive_secret(&self, seed: u64, secret: &mut DefaultSecret) {
        // Safety: Type can only be constructed when NEON feature is present
        unsafe { derive_secret_neon(seed, secret) }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the NEON feature
#[inline]
#[target_feature(enable = "neon")]
unsafe fn round_scramble_neon(acc: &mut [u64; 8], secret_end: &[u8; 64]) {
    // Safety: The caller has ensured we have the NEON
    // feature. We load from and store to references so we
    // know that data is valid. Byte loads have no alignment
    // requirement and the accumulator is `u64`-aligned.
    unsafe {
        let prime = vdup_n_u32(PRIME32_1 as u32);

        for i in 0..4 {
            let a = vld1q_u64(acc.as_ptr().add(i * 2));
            let shifted = vshrq_n_u64::<47>(a);
            let a = veorq_u64(a, shifted);

            let s = vreinterpretq_u64_u8(vld1q_u8(secret_end.as_ptr().add(i * 16)));
            let a = veorq_u64(a, s);

            let a_low = vmovn_u64(a);
            let a_high = vshrn_n_u64::<32>(a);

            let high = vshlq_n_u64::<32>(vmull_u32(a_high, prime));
            let a = vmlal_u32(high, a_low, prime);

            vst1q_u64(acc.as_mut_ptr().add(i * 2), a);
        }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the NEON feature
#[inline]
#[target_feature(enable = "neon")]
unsafe fn accumulate_neon(acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
    // Safety: The caller has ensured we have the NEON
    // feature. We load from and store to references so we
    // know that data is valid. Byte loads have no alignment
    // requirement and the accumulator is `u64`-aligned.
    unsafe {
        for i in 0..4 {
            let a = vld1q_u64(acc.as_ptr().add(i * 2));

            let d = vld1q_u8(stripe.as_ptr().add(i * 16));
            let s = vld1q_u8(secret.as_ptr().add(i * 16));

            let d64 = vreinterpretq_u64_u8(d);
            let d_swapped = vextq_u64::<1>(d64, d64);
            let a = vaddq_u64(a, d_swapped);

            let ds = vreinterpretq_u64_u8(veorq_u8(d, s));
            let ds_low = vmovn_u64(ds);
            let ds_high = vshrn_n_u64::<32>(ds);
            let a = vmlal_u32(a, ds_low, ds_high);

            vst1q_u64(acc.as_mut_ptr().add(i * 2), a);
        }
    }
}

/// # Safety
///
/// You must ensure that the CPU has the NEON feature
#[inline]
#[target_feature(enable = "neon")]
unsafe fn derive_secret_neon(seed: u64, secret: &mut DefaultSecret) {
    // Safety: The caller has ensured we have the NEON
    // feature. We load from and store to references so we
    // know that data is valid. Byte loads have no alignment
    // requirement.
    unsafe {
        let seeds = [seed, seed.wrapping_neg()];
        let seeds = vld1q_u64(seeds.as_ptr());

        for i in 0..secret.len() / 16 {
            let ptr = secret.as_mut_ptr().add(i * 16);
            let s = vreinterpretq_u64_u8(vld1q_u8(ptr));
            let s = vaddq_u64(s, seeds);
            vst1q_u8(ptr, vreinterpretq_u8_u64(s));
        }
    }
}
