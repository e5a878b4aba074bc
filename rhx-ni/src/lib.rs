//! AES-NI-accelerated Rijndael Hkdf-eXtended, sharing its key-schedule and
//! round-key preparation with [`rhx`] but routing the round function
//! through hardware AES instructions when available (spec §4.3 "AES-NI
//! variant").
//!
//! # Example
//! ```
//! use hx_core::{BlockCipher, CipherDirection};
//! use rhx_ni::RhxNi;
//!
//! let mut cipher = RhxNi::standard();
//! cipher.initialize(CipherDirection::Encrypt, &[0x2b; 16], None).unwrap();
//! let pt = [0u8; 16];
//! let mut ct = [0u8; 16];
//! cipher.encrypt_block(&pt, &mut ct).unwrap();
//! ```
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod hardware;

use hx_core::block_cipher::{require_initialized, require_len, BLOCK_SIZE};
use hx_core::{BlockCipher, CipherDirection, Error};
use rhx::{schedule, KeyScheduleKind};

/// Returns true if the running CPU exposes the AES-NI instruction set.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn aes_ni_available() -> bool {
    is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn aes_ni_available() -> bool {
    false
}

enum Inner {
    Software(Box<rhx::Rhx>),
    Hardware(HardwareRhx),
}

struct HardwareRhx {
    schedule_kind: KeyScheduleKind,
    rounds: usize,
    encrypt_round_keys: Vec<[u8; 16]>,
    decrypt_round_keys: Vec<[u8; 16]>,
    initialized: bool,
}

impl HardwareRhx {
    fn is_extended(&self) -> bool {
        !matches!(self.schedule_kind, KeyScheduleKind::Standard)
    }
}

/// Rijndael block cipher with a capability-probed AES-NI fast path.
pub struct RhxNi {
    inner: Inner,
}

impl RhxNi {
    /// A cipher instance using the standard FIPS-197 schedule, routed
    /// through AES-NI when the current CPU supports it.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(KeyScheduleKind::Standard, None)
    }

    /// A cipher instance using an extended, KDF-driven schedule, routed
    /// through AES-NI when the current CPU supports it.
    #[must_use]
    pub fn extended(kind: KeyScheduleKind, rounds: Option<usize>) -> Self {
        Self::new(kind, rounds)
    }

    fn new(kind: KeyScheduleKind, rounds: Option<usize>) -> Self {
        if aes_ni_available() {
            log::debug!(target: "rhx-ni", "AES-NI available, selecting hardware path");
            let is_extended = !matches!(kind, KeyScheduleKind::Standard);
            let rounds = rounds.unwrap_or(if is_extended {
                22 // schedule::EXTENDED_DEFAULT_ROUNDS, duplicated to avoid a private re-export
            } else {
                0
            });
            Self {
                inner: Inner::Hardware(HardwareRhx {
                    schedule_kind: kind,
                    rounds,
                    encrypt_round_keys: Vec::new(),
                    decrypt_round_keys: Vec::new(),
                    initialized: false,
                }),
            }
        } else {
            log::debug!(target: "rhx-ni", "AES-NI unavailable, falling back to software rhx");
            let software = if matches!(kind, KeyScheduleKind::Standard) {
                rhx::Rhx::standard()
            } else {
                rhx::Rhx::extended(kind, rounds)
            };
            Self { inner: Inner::Software(Box::new(software)) }
        }
    }
}

impl BlockCipher for RhxNi {
    fn name(&self) -> &'static str {
        "RHX-NI"
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        match &self.inner {
            Inner::Software(s) => s.legal_key_sizes(),
            Inner::Hardware(h) => {
                if h.is_extended() {
                    &schedule::EXTENDED_KEY_SIZES
                } else {
                    &schedule::STANDARD_KEY_SIZES
                }
            }
        }
    }

    fn legal_rounds(&self) -> &'static [usize] {
        match &self.inner {
            Inner::Software(s) => s.legal_rounds(),
            Inner::Hardware(h) => {
                if h.is_extended() {
                    &schedule::EXTENDED_ROUNDS
                } else {
                    &schedule::STANDARD_ROUNDS
                }
            }
        }
    }

    fn rounds(&self) -> usize {
        match &self.inner {
            Inner::Software(s) => s.rounds(),
            Inner::Hardware(h) => h.rounds,
        }
    }

    fn is_initialized(&self) -> bool {
        match &self.inner {
            Inner::Software(s) => s.is_initialized(),
            Inner::Hardware(h) => h.initialized,
        }
    }

    fn initialize(
        &mut self,
        direction: CipherDirection,
        key: &[u8],
        info: Option<&[u8]>,
    ) -> Result<(), Error> {
        match &mut self.inner {
            Inner::Software(s) => s.initialize(direction, key, info),
            Inner::Hardware(h) => {
                if !self.legal_key_sizes().contains(&key.len()) {
                    return Err(Error::InvalidKeySize { cipher: "RHX-NI", actual: key.len() });
                }
                let fwd = if h.is_extended() {
                    if !schedule::EXTENDED_ROUNDS.contains(&h.rounds) {
                        return Err(Error::InvalidRounds { cipher: "RHX-NI", actual: h.rounds });
                    }
                    schedule::expand_extended(&h.schedule_kind, key, info, h.rounds)?
                } else {
                    let idx = schedule::STANDARD_KEY_SIZES
                        .iter()
                        .position(|&s| s == key.len())
                        .expect("key length already validated");
                    h.rounds = schedule::STANDARD_ROUNDS[idx];
                    schedule::expand_standard(key, h.rounds)
                };
                h.decrypt_round_keys = rhx::block::prepare_decrypt_round_keys(&fwd);
                h.encrypt_round_keys = fwd;
                h.initialized = true;
                log::debug!(target: "rhx-ni", "initialized hardware RHX-NI with {} rounds", h.rounds);
                Ok(())
            }
        }
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        match &self.inner {
            Inner::Software(s) => s.encrypt_block(input, output),
            Inner::Hardware(h) => {
                require_initialized(h.initialized, "RHX-NI")?;
                require_len(input, BLOCK_SIZE)?;
                require_len(output, BLOCK_SIZE)?;
                let mut block = [0u8; 16];
                block.copy_from_slice(&input[..16]);
                #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                let ct = unsafe { hardware::encrypt_block(&block, &h.encrypt_round_keys) };
                #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
                let ct = unreachable!("hardware path is unreachable off x86/x86_64");
                output[..16].copy_from_slice(&ct);
                Ok(())
            }
        }
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        match &self.inner {
            Inner::Software(s) => s.decrypt_block(input, output),
            Inner::Hardware(h) => {
                require_initialized(h.initialized, "RHX-NI")?;
                require_len(input, BLOCK_SIZE)?;
                require_len(output, BLOCK_SIZE)?;
                let mut block = [0u8; 16];
                block.copy_from_slice(&input[..16]);
                #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                let pt = unsafe { hardware::decrypt_block(&block, &h.decrypt_round_keys) };
                #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
                let pt = unreachable!("hardware path is unreachable off x86/x86_64");
                output[..16].copy_from_slice(&pt);
                Ok(())
            }
        }
    }
}
