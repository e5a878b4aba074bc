//! Twofish Hkdf-eXtended (THX): the Twofish block-cipher core, with a
//! standard h-function-driven key schedule and an HKDF/cSHAKE-driven
//! extended schedule (spec §4.1 "Key-schedule expander", §4.2 "Block cipher
//! core").
//!
//! # Example
//! ```
//! use hx_core::{BlockCipher, CipherDirection};
//! use thx::Thx;
//!
//! let mut cipher = Thx::standard();
//! cipher.initialize(CipherDirection::Encrypt, &[0x2b; 16], None).unwrap();
//! let pt = [0u8; 16];
//! let mut ct = [0u8; 16];
//! cipher.encrypt_block(&pt, &mut ct).unwrap();
//! ```
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

mod block;
mod schedule;
mod tables;

pub use schedule::{CShakeStrength, HkdfDigest, KeyScheduleKind};

use hx_core::block_cipher::{require_initialized, require_len, BLOCK_SIZE};
use hx_core::{BlockCipher, CipherDirection, Error};
use schedule::RoundKeys;

/// Twofish block cipher, standard or extended key schedule.
pub struct Thx {
    schedule_kind: KeyScheduleKind,
    rounds: usize,
    keys: Option<RoundKeys>,
    initialized: bool,
}

impl Thx {
    /// A cipher instance using the standard h-function-driven schedule at
    /// 16 rounds.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            schedule_kind: KeyScheduleKind::Standard,
            rounds: schedule::DEFAULT_ROUNDS,
            keys: None,
            initialized: false,
        }
    }

    /// A cipher instance using an extended, KDF-driven schedule.
    ///
    /// `rounds` must be one of [`schedule::ROUNDS`]; defaults to
    /// [`schedule::DEFAULT_ROUNDS`] when `None`.
    #[must_use]
    pub fn extended(kind: KeyScheduleKind, rounds: Option<usize>) -> Self {
        Self {
            schedule_kind: kind,
            rounds: rounds.unwrap_or(schedule::DEFAULT_ROUNDS),
            keys: None,
            initialized: false,
        }
    }

    fn is_extended(&self) -> bool {
        !matches!(self.schedule_kind, KeyScheduleKind::Standard)
    }
}

impl BlockCipher for Thx {
    fn name(&self) -> &'static str {
        "THX"
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        &schedule::KEY_SIZES
    }

    fn legal_rounds(&self) -> &'static [usize] {
        &schedule::ROUNDS
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
        if !self.legal_rounds().contains(&self.rounds) {
            return Err(Error::InvalidRounds {
                cipher: self.name(),
                actual: self.rounds,
            });
        }

        let keys = if self.is_extended() {
            schedule::expand_extended(&self.schedule_kind, key, info, self.rounds)?
        } else {
            schedule::expand_standard(key, self.rounds)
        };
        self.keys = Some(keys);
        self.initialized = true;
        log::debug!(target: "thx", "initialized THX with {} rounds", self.rounds);
        Ok(())
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "THX")?;
        require_len(input, BLOCK_SIZE)?;
        require_len(output, BLOCK_SIZE)?;
        let mut blk = [0u8; 16];
        blk.copy_from_slice(&input[..16]);
        let keys = self.keys.as_ref().expect("initialized implies keys is Some");
        let ct = block::encrypt(&blk, keys);
        output[..16].copy_from_slice(&ct);
        Ok(())
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "THX")?;
        require_len(input, BLOCK_SIZE)?;
        require_len(output, BLOCK_SIZE)?;
        let mut blk = [0u8; 16];
        blk.copy_from_slice(&input[..16]);
        let keys = self.keys.as_ref().expect("initialized implies keys is Some");
        let pt = block::decrypt(&blk, keys);
        output[..16].copy_from_slice(&pt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_round_trip() {
        let mut enc = Thx::standard();
        enc.initialize(CipherDirection::Encrypt, &[0x5au8; 16], None).unwrap();
        let mut dec = Thx::standard();
        dec.initialize(CipherDirection::Decrypt, &[0x5au8; 16], None).unwrap();

        let pt = [0x22u8; 16];
        let mut ct = [0u8; 16];
        enc.encrypt_block(&pt, &mut ct).unwrap();
        let mut recovered = [0u8; 16];
        dec.decrypt_block(&ct, &mut recovered).unwrap();
        assert_eq!(recovered, pt);
    }

    #[test]
    fn rejects_invalid_key_size() {
        let mut c = Thx::standard();
        let err = c.initialize(CipherDirection::Encrypt, &[0u8; 20], None);
        assert!(matches!(err, Err(Error::InvalidKeySize { .. })));
    }

    #[test]
    fn rejects_invalid_round_count() {
        let mut c = Thx::extended(KeyScheduleKind::Hkdf(HkdfDigest::Sha256), Some(17));
        let err = c.initialize(CipherDirection::Encrypt, &[0u8; 32], None);
        assert!(matches!(err, Err(Error::InvalidRounds { .. })));
    }

    #[test]
    fn uninitialized_cipher_rejects_transform() {
        let c = Thx::standard();
        let err = c.encrypt_block(&[0u8; 16], &mut [0u8; 16]);
        assert!(matches!(err, Err(Error::NotInitialized(_))));
    }

    #[test]
    fn extended_schedule_round_trip() {
        let key = [0x64u8; 24];
        let mut enc = Thx::extended(KeyScheduleKind::CShake(CShakeStrength::Cs128), Some(20));
        enc.initialize(CipherDirection::Encrypt, &key, None).unwrap();
        let mut dec = Thx::extended(KeyScheduleKind::CShake(CShakeStrength::Cs128), Some(20));
        dec.initialize(CipherDirection::Decrypt, &key, None).unwrap();

        let pt = [0x19u8; 16];
        let mut ct = [0u8; 16];
        enc.encrypt_block(&pt, &mut ct).unwrap();
        let mut recovered = [0u8; 16];
        dec.decrypt_block(&ct, &mut recovered).unwrap();
        assert_eq!(recovered, pt);
    }

    #[test]
    fn different_keys_produce_different_ciphertext() {
        let pt = [0x01u8; 16];
        let mut a = Thx::standard();
        a.initialize(CipherDirection::Encrypt, &[0x01u8; 16], None).unwrap();
        let mut b = Thx::standard();
        b.initialize(CipherDirection::Encrypt, &[0x02u8; 16], None).unwrap();

        let mut ct_a = [0u8; 16];
        let mut ct_b = [0u8; 16];
        a.encrypt_block(&pt, &mut ct_a).unwrap();
        b.encrypt_block(&pt, &mut ct_b).unwrap();
        assert_ne!(ct_a, ct_b);
    }
}
