use super::{primes::PRIME32_1, DefaultSecret, Halves as _, Vector};
use crate::{IntoU64 as _, SliceBackport as _};

#[derive(Copy, Clone)]
pub struct Impl;

impl Vector for Impl {
    #[inline]
    fn round_scramble(&self, acc: &mut [u64; 8], secret_end: &[u8; 64]) {
        let (last, _) = secret_end.bp_as_chunks();
        let last = last.iter().copied().map(u64::from_le_bytes);

        for (acc, secret) in acc.iter_mut().zip(last) {
            *acc ^= *acc >> 47;
            *acc ^= secret;
            *acc = acc.wrapping_mul(PRIME32_1);
        }
    }

    #[inline]
    fn accumulate(&self, acc: &mut [u64; 8], stripe: &[u8; 64], secret: &[u8; 64]) {
        let (stripe, _) = stripe.bp_as_chunks();
        let (secret, _) = secret.bp_as_chunks();

        for i in 0..8 {
            let stripe = u64::from_le_bytes(stripe[i]);
            let secret = u64::from_le_bytes(secret[i]);

            let value = stripe ^ secret;
            acc[i ^ 1] = acc[i ^ 1].wrapping_add(stripe);
            acc[i] = multiply_64_as_32_and_add(value, value >> 32, acc[i]);
        }
    }

    #[inline]
    fn derive_secret(&self, seed: u64, secret: &mut DefaultSecret) {
        let (words, _) = secret.bp_as_chunks_mut();
        let (pairs, _) = words.bp_as_chunks_mut();

        for [a_p, b_p] in pairs {
            let a = u64::from_le_bytes(*a_p);
            let b = u64::from_le_bytes(*b_p);

            let a = a.wrapping_add(seed);
            let b = b.wrapping_sub(seed);

            *a_p = a.to_le_bytes();
            *b_p = b.to_le_bytes();
        }
    }
}

#[inline]
fn multiply_64_as_32_and_add(lhs: u64, rhs: u64, acc: u64) -> u64 {
    let product = lhs.lower_half().into_u64() * rhs.lower_half().into_u64();
    product.wrapping_add(acc)
}
