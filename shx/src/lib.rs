//! Serpent Hkdf-eXtended (SHX): the Serpent block-cipher core, with a
//! standard phi-anchored key schedule and an HKDF/cSHAKE-driven extended
//! schedule (spec §4.1 "Key-schedule expander", §4.2 "Block cipher core").
//!
//! # Example
//! ```
//! use hx_core::{BlockCipher, CipherDirection};
//! use shx::Shx;
//!
//! let mut cipher = Shx::standard();
//! cipher.initialize(CipherDirection::Encrypt, &[0x2b; 16], None).unwrap();
//! let pt = [0u8; 16];
//! let mut ct = [0u8; 16];
//! cipher.encrypt_block(&pt, &mut ct).unwrap();
//! ```
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

mod block;
mod linear;
mod sboxes;
mod schedule;

pub use schedule::{CShakeStrength, HkdfDigest, KeyScheduleKind};

use hx_core::block_cipher::{require_initialized, require_len, BLOCK_SIZE};
use hx_core::{BlockCipher, CipherDirection, Error};

/// Serpent block cipher, standard or extended key schedule.
pub struct Shx {
    schedule_kind: KeyScheduleKind,
    rounds: usize,
    round_keys: Vec<[u32; 4]>,
    initialized: bool,
}

impl Shx {
    /// A cipher instance using the standard phi-anchored schedule at 32
    /// rounds.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            schedule_kind: KeyScheduleKind::Standard,
            rounds: schedule::DEFAULT_ROUNDS,
            round_keys: Vec::new(),
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
            round_keys: Vec::new(),
            initialized: false,
        }
    }

    fn is_extended(&self) -> bool {
        !matches!(self.schedule_kind, KeyScheduleKind::Standard)
    }
}

impl BlockCipher for Shx {
    fn name(&self) -> &'static str {
        "SHX"
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

        self.round_keys = if self.is_extended() {
            schedule::expand_extended(&self.schedule_kind, key, info, self.rounds)?
        } else {
            schedule::expand_standard(key, self.rounds)
        };
        self.initialized = true;
        log::debug!(target: "shx", "initialized SHX with {} rounds", self.rounds);
        Ok(())
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "SHX")?;
        require_len(input, BLOCK_SIZE)?;
        require_len(output, BLOCK_SIZE)?;
        let mut blk = [0u8; 16];
        blk.copy_from_slice(&input[..16]);
        let ct = block::encrypt(&blk, &self.round_keys);
        output[..16].copy_from_slice(&ct);
        Ok(())
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        require_initialized(self.initialized, "SHX")?;
        require_len(input, BLOCK_SIZE)?;
        require_len(output, BLOCK_SIZE)?;
        let mut blk = [0u8; 16];
        blk.copy_from_slice(&input[..16]);
        let pt = block::decrypt(&blk, &self.round_keys);
        output[..16].copy_from_slice(&pt);
        Ok(())
    }
}
