//! The block-cipher contract shared by `rhx`, `rhx-ni`, `shx`, and `thx`
//! (spec §4.2 "Block cipher core" / §4.3 "AES-NI variant").

use crate::{CipherDirection, Error};

/// Native block size, in bytes, of every cipher in this workspace.
///
/// The spec fixes this at 128 bits; unlike the teacher's `cipher` crate
/// (which is generic over `BlockSize`), HX ciphers only ever operate on
/// 16-byte blocks, so the constant is concrete rather than a type parameter.
pub const BLOCK_SIZE: usize = 16;

/// A keyed 128-bit block permutation with a configurable round count and an
/// optional extended (KDF-driven) key schedule.
///
/// Implementors must reject every operation with [`Error::NotInitialized`]
/// until [`BlockCipher::initialize`] has succeeded, and must validate key
/// length and round count against [`BlockCipher::legal_key_sizes`] /
/// [`BlockCipher::legal_rounds`] at that point.
pub trait BlockCipher {
    /// Human-readable cipher name, e.g. `"RHX"`.
    fn name(&self) -> &'static str;

    /// Key sizes, in bytes, this cipher accepts for the schedule it was
    /// constructed with (standard or extended).
    fn legal_key_sizes(&self) -> &'static [usize];

    /// Round counts this cipher accepts for the schedule it was constructed
    /// with.
    fn legal_rounds(&self) -> &'static [usize];

    /// Number of rounds this instance was initialized with.
    fn rounds(&self) -> usize;

    /// `true` once [`BlockCipher::initialize`] has completed successfully.
    fn is_initialized(&self) -> bool;

    /// Expand `key` (and, for extended schedules, `info`) into this
    /// instance's round-key array.
    ///
    /// # Errors
    /// [`Error::InvalidKeySize`] if `key.len()` is not in
    /// [`BlockCipher::legal_key_sizes`].
    fn initialize(
        &mut self,
        direction: CipherDirection,
        key: &[u8],
        info: Option<&[u8]>,
    ) -> Result<(), Error>;

    /// Encrypt exactly one 16-byte block.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] before init; [`Error::BufferTooShort`] if
    /// either slice is under 16 bytes.
    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error>;

    /// Decrypt exactly one 16-byte block.
    ///
    /// # Errors
    /// Same as [`BlockCipher::encrypt_block`].
    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error>;

    /// Encrypt 4 consecutive blocks (64 bytes). Semantics must be identical
    /// to calling [`BlockCipher::encrypt_block`] four times; implementations
    /// are free to unroll/SIMD this for throughput.
    fn encrypt_transform_512(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.encrypt_chunks(input, output, 4)
    }

    /// Encrypt 8 consecutive blocks (128 bytes).
    fn encrypt_transform_1024(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.encrypt_chunks(input, output, 8)
    }

    /// Encrypt 16 consecutive blocks (256 bytes).
    fn encrypt_transform_2048(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.encrypt_chunks(input, output, 16)
    }

    /// Decrypt 4 consecutive blocks (64 bytes).
    fn decrypt_transform_512(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.decrypt_chunks(input, output, 4)
    }

    /// Decrypt 8 consecutive blocks (128 bytes).
    fn decrypt_transform_1024(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.decrypt_chunks(input, output, 8)
    }

    /// Decrypt 16 consecutive blocks (256 bytes).
    fn decrypt_transform_2048(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.decrypt_chunks(input, output, 16)
    }

    /// Default batched-encrypt fallback: `n_blocks` sequential calls to
    /// [`BlockCipher::encrypt_block`]. Backends with a genuinely batched
    /// instruction sequence (e.g. `rhx-ni`) override the `_512`/`_1024`/
    /// `_2048` methods directly instead of this helper.
    fn encrypt_chunks(&self, input: &[u8], output: &mut [u8], n_blocks: usize) -> Result<(), Error> {
        let len = n_blocks * BLOCK_SIZE;
        require_len(input, len)?;
        require_len(output, len)?;
        for i in 0..n_blocks {
            let off = i * BLOCK_SIZE;
            self.encrypt_block(&input[off..off + BLOCK_SIZE], &mut output[off..off + BLOCK_SIZE])?;
        }
        Ok(())
    }

    /// Default batched-decrypt fallback, mirroring [`BlockCipher::encrypt_chunks`].
    fn decrypt_chunks(&self, input: &[u8], output: &mut [u8], n_blocks: usize) -> Result<(), Error> {
        let len = n_blocks * BLOCK_SIZE;
        require_len(input, len)?;
        require_len(output, len)?;
        for i in 0..n_blocks {
            let off = i * BLOCK_SIZE;
            self.decrypt_block(&input[off..off + BLOCK_SIZE], &mut output[off..off + BLOCK_SIZE])?;
        }
        Ok(())
    }
}

impl<T: BlockCipher + ?Sized> BlockCipher for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        (**self).legal_key_sizes()
    }

    fn legal_rounds(&self) -> &'static [usize] {
        (**self).legal_rounds()
    }

    fn rounds(&self) -> usize {
        (**self).rounds()
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn initialize(&mut self, direction: CipherDirection, key: &[u8], info: Option<&[u8]>) -> Result<(), Error> {
        (**self).initialize(direction, key, info)
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        (**self).encrypt_block(input, output)
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        (**self).decrypt_block(input, output)
    }
}

/// Shared bounds check used by every `BlockCipher` implementation.
pub fn require_len(buf: &[u8], needed: usize) -> Result<(), Error> {
    if buf.len() < needed {
        return Err(Error::BufferTooShort {
            needed,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Shared "used before init" guard.
pub fn require_initialized(is_initialized: bool, who: &'static str) -> Result<(), Error> {
    if !is_initialized {
        return Err(Error::NotInitialized(who));
    }
    Ok(())
}
