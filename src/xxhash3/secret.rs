use core::{fmt, hint::assert_unchecked};

use super::{SECRET_CONSUME_RATE, STRIPE_BYTES};
use crate::SliceBackport as _;

/// The minimum length of a secret.
pub const SECRET_MINIMUM_LENGTH: usize = 136;

/// Offset of the secret used to merge the accumulators into the low
/// half of the result.
const MERGE_ACCUMULATORS_START: usize = 11;

/// Offset from the end of the secret used for the last stripe.
const LAST_STRIPE_START: usize = 7;

const MIDSIZE_START_OFFSET: usize = 3;
const MIDSIZE_LAST_OFFSET: usize = 17;

#[repr(transparent)]
pub struct Secret([u8]);

impl Secret {
    #[inline]
    pub fn new(bytes: &[u8]) -> Result<&Self, Error> {
        // Safety: We check for validity before returning.
        unsafe {
            let this = Self::new_unchecked(bytes);
            if this.is_valid() {
                Ok(this)
            } else {
                Err(Error(bytes.len()))
            }
        }
    }

    /// # Safety
    ///
    /// You must ensure that the secret byte length is >=
    /// SECRET_MINIMUM_LENGTH.
    #[inline]
    pub const unsafe fn new_unchecked(bytes: &[u8]) -> &Self {
        // Safety: We are `#[repr(transparent)]`. It's up to the
        // caller to ensure the length
        unsafe { &*(bytes as *const [u8] as *const Secret) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.len() >= SECRET_MINIMUM_LENGTH
    }

    #[inline]
    fn reassert_preconditions(&self) {
        // Safety: The length of the bytes was checked at value
        // construction time.
        unsafe {
            debug_assert!(self.is_valid());
            assert_unchecked(self.is_valid());
        }
    }

    #[inline]
    fn chunk<const N: usize>(&self, offset: usize) -> &[u8; N] {
        self.reassert_preconditions();

        let (chunks, _) = self.0[offset..].bp_as_chunks();
        &chunks[0]
    }

    #[inline]
    fn words<const N: usize>(&self, offset: usize) -> [u64; N] {
        let bytes = &self.0[offset..];
        let (words, _) = bytes.bp_as_chunks();
        core::array::from_fn(|i| u64::from_le_bytes(words[i]))
    }

    #[inline]
    pub fn words_for_0(&self) -> [u64; 4] {
        self.reassert_preconditions();
        self.words(64)
    }

    #[inline]
    pub fn words_for_1_to_3(&self) -> [u32; 4] {
        self.reassert_preconditions();

        let (words, _) = self.chunk::<16>(0).bp_as_chunks();
        [words[0], words[1], words[2], words[3]].map(u32::from_le_bytes)
    }

    #[inline]
    pub fn words_for_4_to_8(&self) -> [u64; 2] {
        self.reassert_preconditions();
        self.words(16)
    }

    #[inline]
    pub fn words_for_9_to_16(&self) -> [u64; 4] {
        self.reassert_preconditions();
        self.words(32)
    }

    /// The first 128 bytes, as the 32-byte keys of up to four mixing
    /// rounds.
    #[inline]
    pub fn words_for_17_to_128(&self) -> &[[u8; 32]] {
        self.reassert_preconditions();

        let (keys, _) = self.0[..128].bp_as_chunks();
        keys
    }

    /// Keys for the four leading rounds of a 129 to 240 byte input.
    #[inline]
    pub fn words_for_129_to_240_part1(&self) -> &[[u8; 32]] {
        self.words_for_17_to_128()
    }

    /// Keys for the remaining full 32-byte rounds, offset so they
    /// don't line up with the first four.
    #[inline]
    pub fn words_for_129_to_240_part2(&self) -> &[[u8; 32]] {
        self.reassert_preconditions();

        let (keys, _) = self.0[MIDSIZE_START_OFFSET..].bp_as_chunks();
        keys
    }

    /// Key for the round over the last 32 bytes of input.
    #[inline]
    pub fn words_for_129_to_240_part3(&self) -> &[u8; 32] {
        self.chunk(SECRET_MINIMUM_LENGTH - MIDSIZE_LAST_OFFSET - 16)
    }

    #[inline]
    pub fn stripes_per_block(&self) -> usize {
        self.reassert_preconditions();
        (self.len() - STRIPE_BYTES) / SECRET_CONSUME_RATE
    }

    /// The key for the `i`th stripe of a block.
    #[inline]
    pub fn stripe(&self, i: usize) -> &[u8; 64] {
        debug_assert!(i < self.stripes_per_block());
        self.chunk(i * SECRET_CONSUME_RATE)
    }

    /// The key used to scramble the accumulators after each block.
    #[inline]
    pub fn last_stripe(&self) -> &[u8; 64] {
        self.chunk(self.len() - STRIPE_BYTES)
    }

    /// The key for the final stripe of the input.
    #[inline]
    pub fn last_stripe_secret(&self) -> &[u8; 64] {
        self.chunk(self.len() - STRIPE_BYTES - LAST_STRIPE_START)
    }

    #[inline]
    pub fn final_secret_low(&self) -> &[u8; 64] {
        self.chunk(MERGE_ACCUMULATORS_START)
    }

    #[inline]
    pub fn final_secret_high(&self) -> &[u8; 64] {
        self.chunk(self.len() - STRIPE_BYTES - MERGE_ACCUMULATORS_START)
    }
}

/// The secret was shorter than [`SECRET_MINIMUM_LENGTH`][].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error(usize);

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the secret must have at least {SECRET_MINIMUM_LENGTH} bytes, but it has {}",
            self.0,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        let bytes = [0; SECRET_MINIMUM_LENGTH - 1];
        let e = Secret::new(&bytes).err();
        assert_eq!(e, Some(Error(SECRET_MINIMUM_LENGTH - 1)));
    }

    #[test]
    fn minimum_length_secret_is_accepted() {
        let bytes = [0; SECRET_MINIMUM_LENGTH];
        let secret = Secret::new(&bytes).ok();
        assert!(secret.is_some_and(Secret::is_valid));
    }

    #[test]
    fn every_key_fits_in_a_minimum_length_secret() {
        let bytes: [u8; SECRET_MINIMUM_LENGTH] = core::array::from_fn(|i| i as u8);
        let Ok(secret) = Secret::new(&bytes) else {
            panic!("minimum length secret was rejected");
        };

        assert_eq!(secret.stripes_per_block(), 9);
        assert_eq!(secret.words_for_17_to_128().len(), 4);
        assert!(secret.words_for_129_to_240_part2().len() >= 3);
        assert_eq!(secret.words_for_129_to_240_part3()[0], 103);
        assert_eq!(secret.last_stripe()[0], 72);
        assert_eq!(secret.last_stripe_secret()[0], 65);
        assert_eq!(secret.final_secret_low()[0], 11);
        assert_eq!(secret.final_secret_high()[0], 61);
        assert_eq!(secret.stripe(8)[63], 127);
    }
}
