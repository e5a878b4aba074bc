//! Counter DRBG (spec §4.6).
//!
//! Generates output by running the same CTR keystream loop as `ctr-mode`
//! against an implicit all-zero plaintext. A `bytes_since_reseed` policy
//! layer splits any `generate` call that would cross `reseed_interval`
//! blocks, pulls fresh key and counter material from the
//! [`EntropySource`] collaborator, and continues.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use hx_core::block_cipher::{require_initialized, BLOCK_SIZE};
use hx_core::{BlockCipher, CipherDirection, Error};

/// Default reseed interval: 2²⁰ 16-byte blocks, i.e. 16 MiB of output
/// between automatic reseeds (spec §3 "DRBG state").
pub const DEFAULT_RESEED_INTERVAL_BLOCKS: u64 = 1 << 20;

/// External entropy collaborator the DRBG pulls fresh key/counter material
/// from on reseed. Out of scope for this workspace's core (spec §1); only
/// this interface is specified.
pub trait EntropySource {
    /// Fill `out` with fresh entropy.
    ///
    /// # Errors
    /// [`Error::EntropySourceFailed`] if the source cannot produce bytes.
    fn generate(&mut self, out: &mut [u8]) -> Result<(), Error>;
}

/// A counter DRBG wrapping a keyed block cipher and an entropy source.
pub struct CtrDrbg<C, E> {
    cipher: C,
    entropy: E,
    key_len: usize,
    counter: u128,
    reseed_interval: u64,
    blocks_since_reseed: u64,
    /// Most recently generated keystream block.
    keystream: [u8; BLOCK_SIZE],
    /// Bytes of `keystream` already consumed; `BLOCK_SIZE` means empty.
    keystream_pos: usize,
    initialized: bool,
}

impl<C: BlockCipher, E: EntropySource> CtrDrbg<C, E> {
    /// Wraps an unkeyed cipher and an entropy source. Call
    /// [`CtrDrbg::init`] before generating output.
    pub fn new(cipher: C, entropy: E) -> Self {
        Self {
            cipher,
            entropy,
            key_len: 0,
            counter: 0,
            reseed_interval: DEFAULT_RESEED_INTERVAL_BLOCKS,
            blocks_since_reseed: 0,
            keystream: [0u8; BLOCK_SIZE],
            keystream_pos: BLOCK_SIZE,
            initialized: false,
        }
    }

    /// Overrides the default reseed interval, in 16-byte blocks. Must be
    /// called before [`CtrDrbg::init`] to take effect on the first reseed.
    pub fn with_reseed_interval(mut self, blocks: u64) -> Self {
        self.reseed_interval = blocks;
        self
    }

    /// Seeds the cipher with `key` and the counter with `nonce` (16 bytes,
    /// zero if absent). `info` is the cipher's KDF tweak, when the cipher
    /// was constructed with an extended schedule.
    ///
    /// # Errors
    /// [`Error::InvalidKeySize`] from the underlying cipher;
    /// [`Error::InvalidIvSize`] if `nonce` is present but not 16 bytes.
    pub fn init(&mut self, key: &[u8], nonce: Option<&[u8]>, info: Option<&[u8]>) -> Result<(), Error> {
        self.cipher.initialize(CipherDirection::Encrypt, key, info)?;
        self.key_len = key.len();
        self.counter = match nonce {
            Some(n) if n.len() == BLOCK_SIZE => {
                let mut buf = [0u8; BLOCK_SIZE];
                buf.copy_from_slice(n);
                u128::from_le_bytes(buf)
            }
            Some(n) => return Err(Error::InvalidIvSize { expected: BLOCK_SIZE, actual: n.len() }),
            None => 0,
        };
        self.blocks_since_reseed = 0;
        self.keystream_pos = BLOCK_SIZE;
        self.initialized = true;
        log::debug!(target: "ctr-drbg", "DRBG initialized with {}-byte key", self.key_len);
        Ok(())
    }

    /// Re-keys from the entropy source, optionally mixing in
    /// `additional_input`, and resets the reseed counter.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] before [`CtrDrbg::init`];
    /// [`Error::EntropySourceFailed`] if the entropy source fails.
    pub fn reseed(&mut self, additional_input: Option<&[u8]>) -> Result<(), Error> {
        require_initialized(self.initialized, "CTR-DRBG")?;

        let mut fresh_key = vec![0u8; self.key_len];
        self.entropy.generate(&mut fresh_key)?;
        let mut fresh_counter = [0u8; BLOCK_SIZE];
        self.entropy.generate(&mut fresh_counter)?;

        if let Some(additional) = additional_input {
            for (byte, mixin) in fresh_key.iter_mut().zip(additional.iter().cycle()) {
                *byte ^= *mixin;
            }
        }

        self.cipher.initialize(CipherDirection::Encrypt, &fresh_key, None)?;
        self.counter = u128::from_le_bytes(fresh_counter);
        self.blocks_since_reseed = 0;
        self.keystream_pos = BLOCK_SIZE;
        log::debug!(target: "ctr-drbg", "reseeded after reaching reseed_interval");
        Ok(())
    }

    /// Fills `out` with DRBG output, reseeding automatically whenever the
    /// request would cross `reseed_interval` blocks.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] before [`CtrDrbg::init`]; propagates
    /// [`Error::EntropySourceFailed`] from an automatic reseed.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "CTR-DRBG")?;

        let mut offset = 0;
        while offset < out.len() {
            let remaining_blocks = self.reseed_interval.saturating_sub(self.blocks_since_reseed);
            if remaining_blocks == 0 {
                self.reseed(None)?;
                continue;
            }
            let remaining_bytes = (remaining_blocks as usize).saturating_mul(BLOCK_SIZE);
            let chunk_len = remaining_bytes.min(out.len() - offset);
            self.fill_keystream(&mut out[offset..offset + chunk_len])?;
            offset += chunk_len;
        }
        Ok(())
    }

    /// Carries any unconsumed tail of the last generated keystream block
    /// across calls, so splitting a `generate` request into several calls
    /// produces the same bytes as one call for the same total length.
    fn fill_keystream(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let mut offset = 0;
        while offset < out.len() {
            if self.keystream_pos == BLOCK_SIZE {
                let counter_bytes = self.counter.to_le_bytes();
                self.cipher.encrypt_block(&counter_bytes, &mut self.keystream)?;
                self.counter = self.counter.wrapping_add(1);
                self.blocks_since_reseed += 1;
                self.keystream_pos = 0;
            }

            let n = (BLOCK_SIZE - self.keystream_pos).min(out.len() - offset);
            out[offset..offset + n].copy_from_slice(&self.keystream[self.keystream_pos..self.keystream_pos + n]);
            self.keystream_pos += n;
            offset += n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::{OsRng, RngCore};
    use rhx::Rhx;

    struct OsEntropySource;

    impl EntropySource for OsEntropySource {
        fn generate(&mut self, out: &mut [u8]) -> Result<(), Error> {
            let mut rng = OsRng;
            rng.fill_bytes(out);
            Ok(())
        }
    }

    struct FailingEntropySource;

    impl EntropySource for FailingEntropySource {
        fn generate(&mut self, _out: &mut [u8]) -> Result<(), Error> {
            Err(Error::EntropySourceFailed("no entropy available".to_string()))
        }
    }

    #[test]
    fn generate_is_deterministic_for_a_fixed_key_and_nonce() {
        let mut drbg_a = CtrDrbg::new(Rhx::standard(), OsEntropySource);
        drbg_a.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();
        let mut out_a = vec![0u8; 100];
        drbg_a.generate(&mut out_a).unwrap();

        let mut drbg_b = CtrDrbg::new(Rhx::standard(), OsEntropySource);
        drbg_b.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();
        let mut out_b = vec![0u8; 100];
        drbg_b.generate(&mut out_b).unwrap();

        assert_eq!(out_a, out_b);
    }

    #[test]
    fn successive_generate_calls_continue_the_same_stream() {
        let mut whole = CtrDrbg::new(Rhx::standard(), OsEntropySource);
        whole.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();
        let mut out_whole = vec![0u8; 64];
        whole.generate(&mut out_whole).unwrap();

        let mut split = CtrDrbg::new(Rhx::standard(), OsEntropySource);
        split.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();
        let mut out_split = vec![0u8; 64];
        split.generate(&mut out_split[..20]).unwrap();
        split.generate(&mut out_split[20..]).unwrap();

        assert_eq!(out_whole, out_split);
    }

    #[test]
    fn reseed_changes_the_output_stream() {
        let mut drbg = CtrDrbg::new(Rhx::standard(), OsEntropySource);
        drbg.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();
        let mut before = vec![0u8; 32];
        drbg.generate(&mut before).unwrap();

        drbg.reseed(None).unwrap();
        let mut after = vec![0u8; 32];
        drbg.generate(&mut after).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn automatic_reseed_happens_when_the_interval_is_exceeded() {
        let mut drbg = CtrDrbg::new(Rhx::standard(), OsEntropySource).with_reseed_interval(2);
        drbg.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();

        // Three blocks of output with a reseed interval of two blocks
        // forces exactly one automatic reseed mid-request.
        let mut out = vec![0u8; 48];
        drbg.generate(&mut out).unwrap();
        assert_eq!(drbg.blocks_since_reseed, 1);
    }

    #[test]
    fn propagates_entropy_source_failures_from_reseed() {
        let mut drbg = CtrDrbg::new(Rhx::standard(), FailingEntropySource).with_reseed_interval(1);
        drbg.init(&[0x2bu8; 16], Some(&[0u8; 16]), None).unwrap();
        let mut out = vec![0u8; 32];
        let err = drbg.generate(&mut out);
        assert!(matches!(err, Err(Error::EntropySourceFailed(_))));
    }

    #[test]
    fn rejects_use_before_init() {
        let mut drbg = CtrDrbg::new(Rhx::standard(), OsEntropySource);
        let err = drbg.generate(&mut [0u8; 16]);
        assert!(matches!(err, Err(Error::NotInitialized(_))));
    }
}
