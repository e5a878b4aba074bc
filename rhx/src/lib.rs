//! Rijndael Hkdf-eXtended (RHX): the Rijndael/AES block-cipher core, with a
//! standard FIPS-197 key schedule and an HKDF/cSHAKE-driven extended
//! schedule (spec §4.1 "Key-schedule expander", §4.2 "Block cipher core").
//!
//! # Example
//! ```
//! use hx_core::{BlockCipher, CipherDirection};
//! use rhx::Rhx;
//!
//! let mut cipher = Rhx::standard();
//! cipher.initialize(CipherDirection::Encrypt, &[0x2b; 16], None).unwrap();
//! let pt = [0u8; 16];
//! let mut ct = [0u8; 16];
//! cipher.encrypt_block(&pt, &mut ct).unwrap();
//! ```
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

pub mod block;
pub mod schedule;
mod tables;

pub use schedule::{CShakeStrength, HkdfDigest, KeyScheduleKind};

use hx_core::block_cipher::{require_initialized, require_len, BLOCK_SIZE};
use hx_core::{BlockCipher, CipherDirection, Error};

/// Rijndael block cipher, standard or extended key schedule.
pub struct Rhx {
    schedule_kind: KeyScheduleKind,
    rounds: usize,
    encrypt_round_keys: Vec<[u8; 16]>,
    decrypt_round_keys: Vec<[u8; 16]>,
    initialized: bool,
}

impl Rhx {
    /// A cipher instance using the standard FIPS-197 schedule. The round
    /// count is derived from the key size at [`BlockCipher::initialize`].
    #[must_use]
    pub fn standard() -> Self {
        Self {
            schedule_kind: KeyScheduleKind::Standard,
            rounds: 0,
            encrypt_round_keys: Vec::new(),
            decrypt_round_keys: Vec::new(),
            initialized: false,
        }
    }

    /// A cipher instance using an extended, KDF-driven schedule.
    ///
    /// `rounds` must be one of [`schedule::EXTENDED_ROUNDS`]; defaults to
    /// [`schedule::EXTENDED_DEFAULT_ROUNDS`] when `None`.
    #[must_use]
    pub fn extended(kind: KeyScheduleKind, rounds: Option<usize>) -> Self {
        Self {
            schedule_kind: kind,
            rounds: rounds.unwrap_or(schedule::EXTENDED_DEFAULT_ROUNDS),
            encrypt_round_keys: Vec::new(),
            decrypt_round_keys: Vec::new(),
            initialized: false,
        }
    }

    fn is_extended(&self) -> bool {
        !matches!(self.schedule_kind, KeyScheduleKind::Standard)
    }
}

impl BlockCipher for Rhx {
    fn name(&self) -> &'static str {
        "RHX"
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        if self.is_extended() {
            &schedule::EXTENDED_KEY_SIZES
        } else {
            &schedule::STANDARD_KEY_SIZES
        }
    }

    fn legal_rounds(&self) -> &'static [usize] {
        if self.is_extended() {
            &schedule::EXTENDED_ROUNDS
        } else {
            &schedule::STANDARD_ROUNDS
        }
    }

    fn rounds(&self) -> usize {
        self.rounds
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn initialize(
        &mut self,
        _direction: CipherDirection,
        key: &[u8],
        info: Option<&[u8]>,
    ) -> Result<(), Error> {
        if !self.legal_key_sizes().contains(&key.len()) {
            return Err(Error::InvalidKeySize {
                cipher: self.name(),
                actual: key.len(),
            });
        }

        let fwd = if self.is_extended() {
            if !self.legal_rounds().contains(&self.rounds) {
                return Err(Error::InvalidRounds {
                    cipher: self.name(),
                    actual: self.rounds,
                });
            }
            schedule::expand_extended(&self.schedule_kind, key, info, self.rounds)?
        } else {
            let idx = schedule::STANDARD_KEY_SIZES
                .iter()
                .position(|&s| s == key.len())
                .expect("key length already validated against legal_key_sizes");
            self.rounds = schedule::STANDARD_ROUNDS[idx];
            schedule::expand_standard(key, self.rounds)
        };

        self.decrypt_round_keys = block::prepare_decrypt_round_keys(&fwd);
        self.encrypt_round_keys = fwd;
        self.initialized = true;
        log::debug!(target: "rhx", "initialized RHX with {} rounds", self.rounds);
        Ok(())
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "RHX")?;
        require_len(input, BLOCK_SIZE)?;
        require_len(output, BLOCK_SIZE)?;
        let mut block = [0u8; 16];
        block.copy_from_slice(&input[..16]);
        let ct = block::encrypt(&block, &self.encrypt_round_keys);
        output[..16].copy_from_slice(&ct);
        Ok(())
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "RHX")?;
        require_len(input, BLOCK_SIZE)?;
        require_len(output, BLOCK_SIZE)?;
        let mut block = [0u8; 16];
        block.copy_from_slice(&input[..16]);
        let pt = block::decrypt(&block, &self.decrypt_round_keys);
        output[..16].copy_from_slice(&pt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_schedule_picks_rounds_from_key_size() {
        let mut c = Rhx::standard();
        c.initialize(CipherDirection::Encrypt, &[0u8; 24], None).unwrap();
        assert_eq!(c.rounds(), 12);
    }

    #[test]
    fn rejects_invalid_key_size() {
        let mut c = Rhx::standard();
        let err = c.initialize(CipherDirection::Encrypt, &[0u8; 20], None);
        assert!(matches!(err, Err(Error::InvalidKeySize { .. })));
    }

    #[test]
    fn uninitialized_cipher_rejects_transform() {
        let c = Rhx::standard();
        let err = c.encrypt_block(&[0u8; 16], &mut [0u8; 16]);
        assert!(matches!(err, Err(Error::NotInitialized(_))));
    }

    #[test]
    fn scenario_a_rijndael_128_ecb_known_answer() {
        // spec.md Scenario B / AESAVS Variable Key KAT, count=0.
        let mut key = [0u8; 16];
        key[0] = 0x80;
        let mut c = Rhx::standard();
        c.initialize(CipherDirection::Encrypt, &key, None).unwrap();
        let pt = [0u8; 16];
        let mut ct = [0u8; 16];
        c.encrypt_block(&pt, &mut ct).unwrap();
        let expected = hex_literal::hex!("0EDD33D3C621E546455BD8BA1418BEC8");
        assert_eq!(ct, expected);
    }

    #[test]
    fn extended_schedule_round_trip() {
        let key = [0x42u8; 32];
        let mut enc = Rhx::extended(KeyScheduleKind::Hkdf(HkdfDigest::Sha256), Some(22));
        enc.initialize(CipherDirection::Encrypt, &key, None).unwrap();
        let mut dec = Rhx::extended(KeyScheduleKind::Hkdf(HkdfDigest::Sha256), Some(22));
        dec.initialize(CipherDirection::Decrypt, &key, None).unwrap();

        let pt = [0x11u8; 16];
        let mut ct = [0u8; 16];
        enc.encrypt_block(&pt, &mut ct).unwrap();
        let mut recovered = [0u8; 16];
        dec.decrypt_block(&ct, &mut recovered).unwrap();
        assert_eq!(recovered, pt);
    }

    #[test]
    fn batched_transform_matches_single_block_calls() {
        let mut c = Rhx::standard();
        c.initialize(CipherDirection::Encrypt, &[0x77u8; 32], None).unwrap();
        let input: Vec<u8> = (0..64u8).collect();
        let mut batched = vec![0u8; 64];
        c.encrypt_transform_512(&input, &mut batched).unwrap();

        let mut sequential = vec![0u8; 64];
        for i in 0..4 {
            let off = i * 16;
            c.encrypt_block(&input[off..off + 16], &mut sequential[off..off + 16])
                .unwrap();
        }
        assert_eq!(batched, sequential);
    }
}
