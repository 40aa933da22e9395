//! The implementation of XXH3_128.

#![deny(
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    unsafe_op_in_unsafe_fn
)]

use core::fmt;

use crate::{
    xxhash3::{primes::*, *},
    IntoU128 as _, IntoU32 as _, IntoU64 as _, SliceBackport as _,
};

pub use crate::xxhash3::{
    Backend, UnsupportedBackendError, DEFAULT_SECRET_LENGTH, SECRET_MINIMUM_LENGTH,
};

/// Calculates the 128-bit hash.
///
/// Inputs of up to 240 bytes are mixed directly with the secret.
/// Longer inputs run through an accumulator loop whose inner steps
/// use the fastest available [`Backend`][].
#[derive(Debug, Clone)]
pub struct Hasher;

impl Hasher {
    /// Hash all data at once with the default seed and secret.
    #[must_use]
    #[inline]
    pub fn oneshot(input: &[u8]) -> Hash128 {
        impl_oneshot(DEFAULT_SECRET, DEFAULT_SEED, input, Detected::active())
    }

    /// Hash all data at once using the provided seed and a secret
    /// derived from the seed.
    #[must_use]
    #[inline]
    pub fn oneshot_with_seed(seed: u64, input: &[u8]) -> Hash128 {
        impl_oneshot_with_seed(seed, input, Detected::active())
    }

    /// Hash all data at once using the provided secret and the
    /// default seed.
    #[inline]
    pub fn oneshot_with_secret(
        secret: &[u8],
        input: &[u8],
    ) -> Result<Hash128, OneshotWithSecretError> {
        Self::oneshot_with_seed_and_secret(DEFAULT_SEED, secret, input)
    }

    /// Hash all data at once using the provided seed and secret.
    ///
    /// The secret must be at least [`SECRET_MINIMUM_LENGTH`][] bytes
    /// long; shorter secrets are rejected for every input length.
    ///
    /// Inputs of up to 240 bytes use both the seed and the secret.
    /// For longer inputs a nonzero seed takes precedence: the secret
    /// is derived from the seed, as in
    /// [`oneshot_with_seed`][Self::oneshot_with_seed], and the
    /// provided secret is not read.
    #[inline]
    pub fn oneshot_with_seed_and_secret(
        seed: u64,
        secret: &[u8],
        input: &[u8],
    ) -> Result<Hash128, OneshotWithSecretError> {
        let secret = Secret::new(secret).map_err(OneshotWithSecretError)?;
        let backend = Detected::active();

        if input.len() > CUTOFF && seed != DEFAULT_SEED {
            return Ok(impl_oneshot_with_seed(seed, input, backend));
        }

        Ok(impl_oneshot(secret, seed, input, backend))
    }

    /// Hash all data at once with the provided seed, running the long
    /// input loop on a specific [`Backend`][].
    ///
    /// Every available backend returns the same hash as
    /// [`oneshot_with_seed`][Self::oneshot_with_seed]. This exists to
    /// compare and benchmark them.
    #[inline]
    pub fn oneshot_with_backend(
        backend: Backend,
        seed: u64,
        input: &[u8],
    ) -> Result<Hash128, UnsupportedBackendError> {
        let backend = Detected::new(backend)?;
        Ok(impl_oneshot_with_seed(seed, input, backend))
    }
}

/// The provided secret was not at least [`SECRET_MINIMUM_LENGTH`][]
/// bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OneshotWithSecretError(SecretError);

impl core::error::Error for OneshotWithSecretError {}

impl fmt::Display for OneshotWithSecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A 128-bit XXH3 hash, as its two 64-bit halves.
///
/// The halves are computed by separate formulas; the `u128` form
/// places `high64` in the upper bits.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Hash128 {
    /// The lower 64 bits.
    pub low64: u64,
    /// The upper 64 bits.
    pub high64: u64,
}

impl Hash128 {
    /// The canonical, big-endian representation: `high64` then
    /// `low64`. This is the form to store or transmit.
    #[must_use]
    pub fn to_canonical_bytes(self) -> [u8; 16] {
        u128::from(self).to_be_bytes()
    }

    /// Reads a hash back from its canonical representation.
    #[must_use]
    pub fn from_canonical_bytes(bytes: [u8; 16]) -> Self {
        u128::from_be_bytes(bytes).into()
    }
}

impl From<Hash128> for u128 {
    #[inline]
    fn from(value: Hash128) -> Self {
        value.high64.into_u128() << 64 | value.low64.into_u128()
    }
}

impl From<u128> for Hash128 {
    #[inline]
    fn from(value: u128) -> Self {
        Self {
            low64: value.lower_half(),
            high64: value.upper_half(),
        }
    }
}

impl fmt::LowerHex for Hash128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.high64, self.low64)
    }
}

impl fmt::Display for Hash128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

#[inline]
fn impl_oneshot_with_seed(seed: u64, input: &[u8], backend: Detected) -> Hash128 {
    let mut secret = DEFAULT_SECRET_RAW;

    // We know that the secret will only be used if we have more
    // than 240 bytes, so don't waste time computing it otherwise.
    if input.len() > CUTOFF {
        derive_secret_on(backend, seed, &mut secret);
    }

    // Safety: The default secret length is valid
    let secret = unsafe { Secret::new_unchecked(&secret) };

    impl_oneshot(secret, seed, input, backend)
}

#[inline(always)]
fn impl_oneshot(secret: &Secret, seed: u64, input: &[u8], backend: Detected) -> Hash128 {
    match input.len() {
        241.. => impl_241_plus_bytes(secret, input, backend),

        129..=240 => impl_129_to_240_bytes(secret, seed, input),

        17..=128 => impl_17_to_128_bytes(secret, seed, input),

        9..=16 => impl_9_to_16_bytes(secret, seed, input),

        4..=8 => impl_4_to_8_bytes(secret, seed, input),

        1..=3 => impl_1_to_3_bytes(secret, seed, input),

        0 => impl_0_bytes(secret, seed),
    }
}

#[inline(always)]
fn impl_0_bytes(secret: &Secret, seed: u64) -> Hash128 {
    let secret_words = secret.words_for_0();

    let low64 = avalanche_xxh64(seed ^ secret_words[0] ^ secret_words[1]);
    let high64 = avalanche_xxh64(seed ^ secret_words[2] ^ secret_words[3]);

    Hash128 { low64, high64 }
}

#[inline(always)]
fn impl_1_to_3_bytes(secret: &Secret, seed: u64, input: &[u8]) -> Hash128 {
    assert_input_range!(1..=3, input.len());
    let input_length = input.len() as u8; // OK as we checked that the length fits

    let combined = input[input.len() - 1].into_u32()
        | input_length.into_u32() << 8
        | input[0].into_u32() << 16
        | input[input.len() >> 1].into_u32() << 24;

    let secret_words = secret.words_for_1_to_3();

    let low64 = {
        let bitflip = (secret_words[0] ^ secret_words[1]).into_u64();
        bitflip.wrapping_add(seed) ^ combined.into_u64()
    };
    let high64 = {
        let bitflip = (secret_words[2] ^ secret_words[3]).into_u64();
        bitflip.wrapping_sub(seed) ^ combined.swap_bytes().rotate_left(13).into_u64()
    };

    Hash128 {
        low64: avalanche_xxh64(low64),
        high64: avalanche_xxh64(high64),
    }
}

#[inline(always)]
fn impl_4_to_8_bytes(secret: &Secret, seed: u64, input: &[u8]) -> Hash128 {
    assert_input_range!(4..=8, input.len());
    let input_first = input.first_u32();
    let input_last = input.last_u32();

    let modified_seed = seed ^ (seed.lower_half().swap_bytes().into_u64() << 32);
    let secret_words = secret.words_for_4_to_8();

    let combined = input_first.into_u64() | (input_last.into_u64() << 32);
    let keyed = {
        let bitflip = (secret_words[0] ^ secret_words[1]).wrapping_add(modified_seed);
        bitflip ^ combined
    };
    let multiplier = PRIME64_1.wrapping_add(input.len().into_u64() << 2);
    let product = keyed.into_u128().wrapping_mul(multiplier.into_u128());

    let mut high64 = product.upper_half();
    let mut low64 = product.lower_half();

    high64 = high64.wrapping_add(low64 << 1);

    low64 ^= high64 >> 3;
    low64 ^= low64 >> 35;
    low64 = low64.wrapping_mul(PRIME_MX2);
    low64 ^= low64 >> 28;

    Hash128 {
        low64,
        high64: avalanche(high64),
    }
}

#[inline(always)]
fn impl_9_to_16_bytes(secret: &Secret, seed: u64, input: &[u8]) -> Hash128 {
    assert_input_range!(9..=16, input.len());
    let input_first = input.first_u64();
    let input_last = input.last_u64();

    let secret_words = secret.words_for_9_to_16();
    let bitflip_low = (secret_words[0] ^ secret_words[1]).wrapping_sub(seed);
    let bitflip_high = (secret_words[2] ^ secret_words[3]).wrapping_add(seed);

    let product = (input_first ^ input_last ^ bitflip_low)
        .into_u128()
        .wrapping_mul(PRIME64_1.into_u128());

    let low64 = product
        .lower_half()
        .wrapping_add((input.len() - 1).into_u64() << 54);

    // `keyed_last + lower_32(keyed_last) * (PRIME32_2 - 1)`, with the
    // multiplication split so that it stays within 64 bits.
    let keyed_last = input_last ^ bitflip_high;
    let high64 = product
        .upper_half()
        .wrapping_add(keyed_last.upper_half().into_u64() << 32)
        .wrapping_add(keyed_last.lower_half().into_u64().wrapping_mul(PRIME32_2));

    let low64 = low64 ^ high64.swap_bytes();

    let folded = low64.into_u128().wrapping_mul(PRIME64_2.into_u128());
    let high64 = folded
        .upper_half()
        .wrapping_add(high64.wrapping_mul(PRIME64_2));

    Hash128 {
        low64: avalanche(folded.lower_half()),
        high64: avalanche(high64),
    }
}

#[inline]
fn impl_17_to_128_bytes(secret: &Secret, seed: u64, input: &[u8]) -> Hash128 {
    assert_input_range!(17..=128, input.len());
    let mut acc = Hash128 {
        low64: input.len().into_u64().wrapping_mul(PRIME64_1),
        high64: 0,
    };

    let secret = secret.words_for_17_to_128();
    let (fwd, _) = input.bp_as_chunks();
    let (_, bwd) = input.bp_as_rchunks();

    let q = bwd.len();

    if input.len() > 32 {
        if input.len() > 64 {
            if input.len() > 96 {
                acc = mix_32_bytes(acc, &fwd[3], &bwd[q - 4], &secret[3], seed);
            }

            acc = mix_32_bytes(acc, &fwd[2], &bwd[q - 3], &secret[2], seed);
        }

        acc = mix_32_bytes(acc, &fwd[1], &bwd[q - 2], &secret[1], seed);
    }

    acc = mix_32_bytes(acc, &fwd[0], &bwd[q - 1], &secret[0], seed);

    finalize_mixed(acc, input.len(), seed)
}

#[inline]
fn impl_129_to_240_bytes(secret: &Secret, seed: u64, input: &[u8]) -> Hash128 {
    assert_input_range!(129..=240, input.len());
    let mut acc = Hash128 {
        low64: input.len().into_u64().wrapping_mul(PRIME64_1),
        high64: 0,
    };

    let (head, _) = input.bp_as_chunks::<32>();
    let mut head = head.iter();

    let ss = secret.words_for_129_to_240_part1();
    for (chunk, secret) in head.by_ref().zip(ss).take(4) {
        let (pair, _) = chunk.bp_as_chunks();
        acc = mix_32_bytes(acc, &pair[0], &pair[1], secret, seed);
    }

    acc.low64 = avalanche(acc.low64);
    acc.high64 = avalanche(acc.high64);

    let ss = secret.words_for_129_to_240_part2();
    for (chunk, secret) in head.zip(ss) {
        let (pair, _) = chunk.bp_as_chunks();
        acc = mix_32_bytes(acc, &pair[0], &pair[1], secret, seed);
    }

    let (_, tail) = input.bp_as_rchunks::<16>();
    let q = tail.len();
    let ss = secret.words_for_129_to_240_part3();
    acc = mix_32_bytes(acc, &tail[q - 1], &tail[q - 2], ss, 0u64.wrapping_sub(seed));

    finalize_mixed(acc, input.len(), seed)
}

/// Mixes two 16-byte input blocks into both halves of the
/// accumulator. Each half receives one block keyed with half of the
/// secret and the plain sum of the other block's words.
#[inline]
fn mix_32_bytes(
    mut acc: Hash128,
    input_1: &[u8; 16],
    input_2: &[u8; 16],
    secret: &[u8; 32],
    seed: u64,
) -> Hash128 {
    let (secret, _) = secret.bp_as_chunks();
    let in_1 = to_u64s(input_1);
    let in_2 = to_u64s(input_2);

    acc.low64 = acc.low64.wrapping_add(mix_step(input_1, &secret[0], seed));
    acc.low64 ^= in_2[0].wrapping_add(in_2[1]);

    acc.high64 = acc.high64.wrapping_add(mix_step(input_2, &secret[1], seed));
    acc.high64 ^= in_1[0].wrapping_add(in_1[1]);

    acc
}

#[inline]
fn mix_step(data: &[u8; 16], secret: &[u8; 16], seed: u64) -> u64 {
    let data_words = to_u64s(data);
    let secret_words = to_u64s(secret);

    multiply_fold(
        data_words[0] ^ secret_words[0].wrapping_add(seed),
        data_words[1] ^ secret_words[1].wrapping_sub(seed),
    )
}

#[inline]
fn to_u64s(bytes: &[u8; 16]) -> [u64; 2] {
    let (pair, _) = bytes.bp_as_chunks::<8>();
    [pair[0], pair[1]].map(u64::from_le_bytes)
}

#[inline]
fn finalize_mixed(acc: Hash128, len: usize, seed: u64) -> Hash128 {
    let len = len.into_u64();

    let low64 = acc.low64.wrapping_add(acc.high64);
    let high64 = acc
        .low64
        .wrapping_mul(PRIME64_1)
        .wrapping_add(acc.high64.wrapping_mul(PRIME64_4))
        .wrapping_add(len.wrapping_sub(seed).wrapping_mul(PRIME64_2));

    Hash128 {
        low64: avalanche(low64),
        high64: 0u64.wrapping_sub(avalanche(high64)),
    }
}

#[inline]
fn impl_241_plus_bytes(secret: &Secret, input: &[u8], backend: Detected) -> Hash128 {
    assert_input_range!(241.., input.len());
    dispatch! {
        backend => fn oneshot_impl(secret: &Secret, input: &[u8]) -> Hash128
    }
}

#[inline]
fn oneshot_impl(vector: impl Vector, secret: &Secret, input: &[u8]) -> Hash128 {
    Algorithm(vector).oneshot(secret, input)
}

struct Algorithm<V>(V);

impl<V> Algorithm<V>
where
    V: Vector,
{
    #[inline]
    fn oneshot(&self, secret: &Secret, input: &[u8]) -> Hash128 {
        assert_input_range!(241.., input.len());
        let mut acc = INITIAL_ACCUMULATORS;

        let stripes_per_block = secret.stripes_per_block();
        let block_size = STRIPE_BYTES * stripes_per_block;

        let mut blocks = input.chunks_exact(block_size);

        // A block that ends exactly at the end of the input is
        // handled as the last, partial one so that its final stripe
        // is keyed like every other final stripe.
        let last_block = if blocks.remainder().is_empty() {
            blocks.next_back().unwrap_or_default()
        } else {
            blocks.remainder()
        };

        self.rounds(&mut acc, blocks, secret);

        let (_, last_stripes) = input.bp_as_rchunks();
        let last_stripe = &last_stripes[last_stripes.len() - 1];

        self.last_round(&mut acc, last_block, last_stripe, secret);

        self.final_merge(&acc, input.len().into_u64(), secret)
    }

    #[inline]
    fn rounds<'a>(
        &self,
        acc: &mut [u64; 8],
        blocks: impl IntoIterator<Item = &'a [u8]>,
        secret: &Secret,
    ) {
        for block in blocks {
            let (stripes, _) = block.bp_as_chunks();

            self.round(acc, stripes, secret);
        }
    }

    #[inline]
    fn round(&self, acc: &mut [u64; 8], stripes: &[[u8; 64]], secret: &Secret) {
        let secret_end = secret.last_stripe();

        self.round_accumulate(acc, stripes, secret);
        self.0.round_scramble(acc, secret_end);
    }

    #[inline]
    fn round_accumulate(&self, acc: &mut [u64; 8], stripes: &[[u8; 64]], secret: &Secret) {
        for (i, stripe) in stripes.iter().enumerate() {
            self.0.accumulate(acc, stripe, secret.stripe(i));
        }
    }

    #[inline]
    fn last_round(
        &self,
        acc: &mut [u64; 8],
        block: &[u8],
        last_stripe: &[u8; 64],
        secret: &Secret,
    ) {
        // Accumulation steps are run for the stripes in the last block,
        // except for the last stripe (whether it is full or not)
        let (stripes, _) = stripes_with_tail(block);

        self.round_accumulate(acc, stripes, secret);

        let last_stripe_secret = secret.last_stripe_secret();
        self.0.accumulate(acc, last_stripe, last_stripe_secret);
    }

    #[inline]
    fn final_merge(&self, acc: &[u64; 8], len: u64, secret: &Secret) -> Hash128 {
        let low64 = merge_accumulators(acc, secret.final_secret_low(), len.wrapping_mul(PRIME64_1));
        let high64 = merge_accumulators(
            acc,
            secret.final_secret_high(),
            !len.wrapping_mul(PRIME64_2),
        );

        Hash128 { low64, high64 }
    }
}

#[inline]
fn merge_accumulators(acc: &[u64; 8], secret: &[u8; 64], init_value: u64) -> u64 {
    let (secrets, _) = secret.bp_as_chunks();
    let mut result = init_value;

    for i in 0..4 {
        let sa = u64::from_le_bytes(secrets[i * 2]);
        let sb = u64::from_le_bytes(secrets[i * 2 + 1]);

        result = result.wrapping_add(multiply_fold(acc[i * 2] ^ sa, acc[i * 2 + 1] ^ sb));
    }

    avalanche(result)
}

#[inline]
fn stripes_with_tail(block: &[u8]) -> (&[[u8; 64]], &[u8]) {
    match block.bp_as_chunks() {
        ([stripes @ .., last], []) => (stripes, last),
        (stripes, last) => (stripes, last),
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::vec::Vec;

    use crate::xxhash3::test::{bytes, gen_bytes};

    use super::*;

    const _: () = {
        const fn is_clone<T: Clone>() {}
        is_clone::<Hasher>();
    };

    const EMPTY_BYTES: [u8; 0] = [];

    fn oneshot(input: &[u8]) -> u128 {
        Hasher::oneshot(input).into()
    }

    fn oneshot_with_seed(seed: u64, input: &[u8]) -> u128 {
        Hasher::oneshot_with_seed(seed, input).into()
    }

    fn gen_secret<const N: usize>() -> [u8; N] {
        core::array::from_fn(|i| (i * 53 + 17) as u8)
    }

    fn available_backends() -> impl Iterator<Item = Backend> {
        Backend::ALL.into_iter().filter(|b| b.is_available())
    }

    #[test]
    fn oneshot_empty() {
        let hash = oneshot(&EMPTY_BYTES);
        assert_eq!(hash, 0x99aa_06d3_0147_98d8_6001_c324_468d_497f);
    }

    #[test]
    fn oneshot_1_to_3_bytes() {
        test_1_to_3_bytes(oneshot)
    }

    #[track_caller]
    fn test_1_to_3_bytes(mut f: impl FnMut(&[u8]) -> u128) {
        let inputs = bytes![1, 2, 3];

        let expected = [
            0xa6cd_5e93_9200_0f6a_c44b_dff4_074e_ecdb,
            0x6a4a_5274_c1b0_d3ad_d664_5fc3_051a_9457,
            0xe3b5_5f57_945a_17cf_5f42_99fc_161c_9cbb,
        ];

        for (input, expected) in inputs.iter().zip(expected) {
            let hash = f(input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn oneshot_4_to_8_bytes() {
        test_4_to_8_bytes(oneshot)
    }

    #[track_caller]
    fn test_4_to_8_bytes(mut f: impl FnMut(&[u8]) -> u128) {
        let inputs = bytes![4, 5, 6, 7, 8];

        let expected = [
            0xeb70_bf5f_c779_e9e6_a611_1d53_e80a_3db5,
            0x9434_5321_06a7_c141_c920_d234_7a85_929b,
            0x545f_093d_32b1_68fe_a6b5_2f4d_ea38_96a3,
            0x61ce_291b_c3a4_357d_dbb2_0782_1e6d_5efe,
            0xe1e4_432a_6221_7fe4_cfd5_0c61_c8bb_98c1,
        ];

        for (input, expected) in inputs.iter().zip(expected) {
            let hash = f(input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn oneshot_9_to_16_bytes() {
        test_9_to_16_bytes(oneshot)
    }

    #[track_caller]
    fn test_9_to_16_bytes(mut f: impl FnMut(&[u8]) -> u128) {
        let inputs = bytes![9, 10, 11, 12, 13, 14, 15, 16];

        let expected = [
            0x16c7_69d8_3e4a_ebce_9079_3197_9dca_3746,
            0xbd93_0669_a87b_4b37_e67b_f1ad_8dcf_73a8,
            0xacad_8071_8f47_d494_7d67_cfc1_730f_22a3,
            0x38f9_2247_a7f7_3cc5_7780_eb31_198f_13ca,
            0xae92_e123_e947_2408_bd79_5526_1902_66c0,
            0x5f91_e6bf_7418_cfaa_55d6_5715_e2a5_7c31,
            0x301a_9f75_4e8f_569a_0017_ea4b_e19b_c787,
            0x7295_0631_8276_07e2_8428_12cc_870d_cae2,
        ];

        for (input, expected) in inputs.iter().zip(expected) {
            let hash = f(input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn oneshot_17_to_128_bytes() {
        test_17_to_128_bytes(oneshot)
    }

    #[track_caller]
    fn test_17_to_128_bytes(mut f: impl FnMut(&[u8]) -> u128) {
        let lower_boundary = bytes![17, 18, 19];
        let chunk_boundary = bytes![31, 32, 33];
        let middle_rounds = bytes![63, 64, 65, 95, 96, 97];
        let upper_boundary = bytes![126, 127, 128];

        let inputs = lower_boundary
            .iter()
            .chain(chunk_boundary)
            .chain(middle_rounds)
            .chain(upper_boundary);

        let expected = [
            // lower_boundary
            0x685b_c458_b37d_057f_c06e_233d_f772_9217,
            0x87ce_996b_b557_6d8d_e3a3_c96b_b0af_2c23,
            0x7619_bcef_2e31_1cd8_c47d_dc58_8737_93df,
            // chunk_boundary
            0x4ed3_946d_393b_687b_b54d_e399_3874_ed20,
            0x25e7_c9b3_424c_eed2_457d_9566_b6fc_d697,
            0x0217_5c3a_abb0_0637_e08d_8495_1339_de86,
            // middle_rounds
            0xbb8d_4c45_8fac_1f12_0302_a39b_74a9_cf52,
            0x9c6e_140a_4655_45e5_90c1_971d_db04_ce74,
            0xebed_f05e_eadc_28f1_1aee_64a1_615d_e88f,
            0xde19_f6fe_4a2b_b296_c86d_45f8_d4a2_b90b,
            0xc575_56e9_ccb9_7efa_6e53_ab55_b4f5_558b,
            0x9b09_227e_063d_a5a2_5b32_84a6_1f91_e97d,
            // upper_boundary
            0x0abc_2062_87ce_2afe_5181_0be2_9323_2106,
            0xd5ad_d870_c9c9_e00f_060c_2e3d_df0f_2fb9,
            0x1479_2fc3_af88_dc6c_0532_1a0b_64d6_7b41,
        ];

        for (input, expected) in inputs.zip(expected) {
            let hash = f(input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn oneshot_129_to_240_bytes() {
        test_129_to_240_bytes(oneshot)
    }

    #[track_caller]
    fn test_129_to_240_bytes(mut f: impl FnMut(&[u8]) -> u128) {
        let lower_boundary = bytes![129, 130, 131];
        let extra_rounds = bytes![159, 160, 161];
        let upper_boundary = bytes![238, 239, 240];

        let inputs = lower_boundary
            .iter()
            .chain(extra_rounds)
            .chain(upper_boundary);

        let expected = [
            // lower_boundary
            0xdd5e_74ac_6b45_f54e_bc30_b633_82b0_9a3b,
            0x6cd2_e56a_10f1_e707_3ec5_f135_d0a7_d28f,
            0x6da7_92f1_702d_4494_5609_cfc7_9dba_18fd,
            // extra_rounds
            0xe344_82de_7831_e5f6_aea9_4550_53a8_845b,
            0x4e95_c1cd_6dc7_bb85_c67f_cd13_c31b_09f4,
            0x9080_5aa2_2c17_b7a0_36ad_e0ce_a58f_8377,
            // upper_boundary
            0x73a9_e8f7_bd32_83c8_2a9b_ddd0_e5c4_014c,
            0x9843_ab31_a06b_e0df_fe21_3746_28fc_c539,
            0x65b5_be86_da55_40e7_c92b_68e1_6f83_bbb6,
        ];

        for (input, expected) in inputs.zip(expected) {
            let hash = f(input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn oneshot_241_plus_bytes() {
        test_241_plus_bytes(oneshot)
    }

    #[track_caller]
    fn test_241_plus_bytes(mut f: impl FnMut(&[u8]) -> u128) {
        let inputs = bytes![241, 242, 243, 244, 256, 1024, 1025, 2048, 2049, 10240];

        let expected = [
            0x1da1_cb61_bcb8_a2a1_02e8_cd95_421c_6d02,
            0x1623_84cb_44d1_d806_ddcb_33c4_9405_1832,
            0xbd2e_9fcf_378c_35e9_8835_f952_9193_e3dc,
            0x3ff4_93d7_a813_7ab6_bc17_c91e_c3cf_8d7f,
            0x96c3_6c85_d00e_5bc5_44f5_d90d_acde_463a,
            0xd0ac_1f7b_93bf_57b9_e5d7_8baf_a45b_2aa5,
            0x2882_ebca_04ec_915c_e95c_4228_8f28_186e,
            0xa514_1efe_dfef_c1af_2533_9063_db86_1586,
            0x39a5_4bc9_3f74_921b_6c96_00c0_e506_e2ae,
            0x4f63_75cc_a7ec_e1e1_bcd6_3266_df6e_2244,
        ];

        for (input, expected) in inputs.iter().zip(expected) {
            let hash = f(input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn oneshot_many_blocks() {
        let input: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();
        assert_eq!(oneshot(&input), 0x5418_2c58_bbb1_337c_42c2_3aee_ad96_750d);
    }

    #[test]
    fn oneshot_with_seed_matches_c_implementation() {
        let inputs = bytes![0, 1, 4, 9, 17, 129, 241, 1024, 10240];

        let expected = [
            0xf6aa_1949_0101_e0ed_5028_daec_7753_c180,
            0x554b_cdd8_faf3_89ee_78fc_079a_75aa_f3c0,
            0xb319_d445_f095_1cc3_d5a1_0960_a5a7_bb5e,
            0xe594_530f_0dca_88e8_8a3d_95cf_3bc4_f9ab,
            0x43cd_46a2_ab8a_0224_1df4_4566_478b_c5ae,
            0x8149_8606_b84c_328b_01ff_33da_499d_5ce4,
            0x462e_e8d3_edb1_07f0_f984_56bc_25be_0901,
            0xf6e8_342b_2b38_1a02_2483_9f0f_cdf4_d078,
            0x4abf_eaf7_e9dc_79cf_24a4_031b_7e4f_2d61,
        ];

        for (input, expected) in inputs.iter().zip(expected) {
            let hash = oneshot_with_seed(0xdead_cafe, input);
            assert_eq!(hash, expected, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn zero_seed_is_the_default() {
        for input in bytes![0, 3, 16, 100, 200, 1000] {
            assert_eq!(oneshot_with_seed(0, input), oneshot(input));
        }
    }

    #[test]
    fn oneshot_with_secret_is_independent_of_secret_length_for_short_inputs() {
        let inputs = bytes![0, 1, 4, 9, 17, 129];

        let expected = [
            0x3403_c6e3_9f5f_b235_92d6_6663_d497_ec29,
            0x06e5_15ff_c72b_5cd0_33a8_272a_84bb_0b7f,
            0xb293_c4c9_8eb4_d200_ef13_82e8_5532_66ed,
            0x9e13_671e_bb12_daad_8a75_bfac_8087_9746,
            0xec90_cdaf_b317_ec5f_8652_8ed6_c3e8_81d3,
            0xb0ac_ea03_a4c7_5b56_b3f7_a4e7_b7b8_d0f4,
        ];

        let secrets: [&[u8]; 3] = [
            &gen_secret::<136>(),
            &gen_secret::<192>(),
            &gen_secret::<200>(),
        ];

        for secret in secrets {
            for (input, expected) in inputs.iter().zip(expected) {
                let hash = Hasher::oneshot_with_secret(secret, input).map(u128::from);
                assert_eq!(
                    hash,
                    Ok(expected),
                    "input was {} bytes, secret was {} bytes",
                    input.len(),
                    secret.len(),
                );
            }
        }
    }

    #[test]
    fn oneshot_with_secret_long_inputs() {
        let inputs = bytes![241, 577, 1024, 10240];

        let secret_136 = gen_secret::<136>();
        let expected_136 = [
            0xd934_73f6_2323_07a7_2045_a228_fa9e_9e9c,
            0xb348_43c7_0334_c964_4f6c_bbf9_4bc4_072d,
            0xc573_a3fc_ce88_1344_4a88_0bb8_d6fd_0bc7,
            0x7815_6a9e_b72e_ed26_ea7e_cbd2_08fe_365a,
        ];

        let secret_192 = gen_secret::<192>();
        let expected_192 = [
            0x8d67_bbde_a332_8f9f_d1ea_3f7f_6fd8_51d0,
            0x1cd1_e6f9_88d6_ccdc_4c9c_97e8_9888_d137,
            0xccf8_7999_73a9_8055_84fb_94bc_b989_9ff5,
            0xd584_5d96_3602_dcb0_2879_429f_d98c_7b25,
        ];

        let secret_200 = gen_secret::<200>();
        let expected_200 = [
            0x5d31_a12b_a042_046f_ea5c_2873_61bd_5bda,
            0xb3e2_3b0d_4146_0bb7_3b92_2961_8ee9_1e5a,
            0xc65e_f315_460b_1849_a3e9_af7a_d69c_8106,
            0x42ab_730f_8ea7_6943_371e_afe1_b8ab_6eeb,
        ];

        let cases: [(&[u8], [u128; 4]); 3] = [
            (&secret_136, expected_136),
            (&secret_192, expected_192),
            (&secret_200, expected_200),
        ];

        for (secret, expected) in cases {
            for (input, expected) in inputs.iter().zip(expected) {
                let hash = Hasher::oneshot_with_secret(secret, input).map(u128::from);
                assert_eq!(
                    hash,
                    Ok(expected),
                    "input was {} bytes, secret was {} bytes",
                    input.len(),
                    secret.len(),
                );
            }
        }
    }

    #[test]
    fn short_secrets_are_rejected() {
        let secret = [0; SECRET_MINIMUM_LENGTH - 1];

        for input in bytes![0, 16, 240, 241] {
            let e = Hasher::oneshot_with_secret(&secret, input).err();
            assert!(e.is_some(), "input was {} bytes", input.len());

            let e = Hasher::oneshot_with_seed_and_secret(42, &secret, input).err();
            assert!(e.is_some(), "input was {} bytes", input.len());
        }
    }

    #[test]
    fn short_secret_error_is_descriptive() {
        let Err(e) = Hasher::oneshot_with_secret(&[0; 10], &[]) else {
            panic!("a 10 byte secret was accepted");
        };

        assert_eq!(
            std::format!("{e}"),
            "the secret must have at least 136 bytes, but it has 10",
        );
    }

    #[test]
    fn default_secret_as_custom_secret_matches_oneshot() {
        for input in bytes![0, 8, 100, 200, 1000, 5000] {
            let hash = Hasher::oneshot_with_secret(&DEFAULT_SECRET_RAW, input);
            assert_eq!(
                hash,
                Ok(Hasher::oneshot(input)),
                "input was {} bytes",
                input.len()
            );
        }
    }

    #[test]
    fn seed_and_secret_use_both_for_short_inputs() {
        let secret = gen_secret::<192>();

        for input in bytes![0, 3, 8, 16, 128, 240] {
            let plain = Hasher::oneshot_with_secret(&secret, input);
            let seeded = Hasher::oneshot_with_seed_and_secret(0xdead_cafe, &secret, input);
            assert_ne!(plain, seeded, "input was {} bytes", input.len());
        }
    }

    #[test]
    fn nonzero_seed_derives_the_secret_for_long_inputs() {
        let secret = gen_secret::<192>();

        for input in bytes![241, 1024, 10240] {
            let hash = Hasher::oneshot_with_seed_and_secret(0xdead_cafe, &secret, input);
            let expected = Hasher::oneshot_with_seed(0xdead_cafe, input);
            assert_eq!(hash, Ok(expected), "input was {} bytes", input.len());
        }
    }

    #[test]
    fn backends_are_equivalent() {
        let inputs = bytes![241, 255, 256, 511, 1023, 1024, 1025, 1088, 2048, 4095, 10240];

        for seed in [0, 0xdead_cafe] {
            for input in inputs {
                let reference = Hasher::oneshot_with_backend(Backend::Scalar, seed, input);

                for backend in available_backends() {
                    let hash = Hasher::oneshot_with_backend(backend, seed, input);
                    assert_eq!(
                        hash,
                        reference,
                        "{backend} differs for {} bytes with seed {seed:#x}",
                        input.len(),
                    );
                }
            }
        }
    }

    #[test]
    fn backends_match_c_implementation() {
        for backend in available_backends() {
            test_241_plus_bytes(|input| {
                Hasher::oneshot_with_backend(backend, 0, input)
                    .map(u128::from)
                    .unwrap_or_default()
            });
        }
    }

    #[test]
    fn unavailable_backends_are_reported() {
        for backend in Backend::ALL.into_iter().filter(|b| !b.is_available()) {
            let e = Hasher::oneshot_with_backend(backend, 0, &gen_bytes::<300>()).err();
            assert_eq!(e.map(|e| e.backend()), Some(backend));
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        for input in bytes![0, 7, 77, 177, 777] {
            assert_eq!(oneshot_with_seed(99, input), oneshot_with_seed(99, input));
        }
    }

    #[test]
    fn boundaries_use_different_formulas() {
        // Neighbouring lengths share a prefix but are routed to
        // different strategies; their hashes must differ.
        let data = gen_bytes::<242>();

        for len in [0, 3, 8, 16, 128, 240] {
            let below = oneshot(&data[..len]);
            let above = oneshot(&data[..len + 1]);
            assert_ne!(below, above, "{len} and {} bytes collide", len + 1);
        }
    }

    #[test]
    fn different_seeds_produce_different_hashes() {
        let mut rng = StdRng::seed_from_u64(0x5eed_5eed);
        let inputs = bytes![1, 3, 4, 8, 9, 16, 17, 128, 129, 240, 241, 4096];

        for input in inputs {
            for _ in 0..32 {
                let s1: u64 = rng.gen();
                let s2: u64 = rng.gen();
                if s1 == s2 {
                    continue;
                }

                assert_ne!(
                    oneshot_with_seed(s1, input),
                    oneshot_with_seed(s2, input),
                    "seeds {s1:#x} and {s2:#x} collide on {} bytes",
                    input.len(),
                );
            }
        }
    }

    #[test]
    fn hash128_converts_to_and_from_u128() {
        let hash = Hash128 {
            low64: 0x0011_2233_4455_6677,
            high64: 0x8899_aabb_ccdd_eeff,
        };
        let wide = 0x8899_aabb_ccdd_eeff_0011_2233_4455_6677;

        assert_eq!(u128::from(hash), wide);
        assert_eq!(Hash128::from(wide), hash);
    }

    #[test]
    fn hash128_canonical_form_is_big_endian() {
        let hash = Hash128 {
            low64: 0x0011_2233_4455_6677,
            high64: 0x8899_aabb_ccdd_eeff,
        };

        let bytes = hash.to_canonical_bytes();
        assert_eq!(bytes[0], 0x88);
        assert_eq!(bytes[15], 0x77);
        assert_eq!(Hash128::from_canonical_bytes(bytes), hash);
    }

    #[test]
    fn hash128_displays_as_canonical_hex() {
        let hash = Hasher::oneshot(&[]);
        assert_eq!(std::format!("{hash}"), "99aa06d3014798d86001c324468d497f");

        let small = Hash128 {
            low64: 1,
            high64: 0,
        };
        assert_eq!(std::format!("{small:x}"), "00000000000000000000000000000001");
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn hash128_serializes_both_halves() {
        let hash = Hash128 {
            low64: 1,
            high64: 2,
        };

        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, r#"{"low64":1,"high64":2}"#);

        let back: Hash128 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
