//! Output Feedback mode (spec §4.4.4).
//!
//! `O_j = E_K(F_{j-1})`, `F_j = O_j`, `C_j = P_j ⊕ O_j`. Every output block
//! depends on the one before it, so OFB has no parallel fast path in either
//! direction — unlike `ctr-mode` and the decrypt side of `cbc-mode` /
//! `cfb-mode`. Buffers need not be block-aligned; any unconsumed tail of
//! the current keystream block is buffered and picked up by the next call,
//! so splitting a buffer across several `transform` calls produces the
//! same output as one call.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::{BlockCipher, CipherDirection, CipherMode, Error, ParallelOptions};
use zeroize::Zeroize;

/// OFB mode wrapping any [`BlockCipher`].
pub struct Ofb<C> {
    cipher: C,
    direction: CipherDirection,
    /// `F_{j-1}`, the register due to be encrypted for the next fresh
    /// keystream block.
    feedback: [u8; BLOCK_SIZE],
    /// Most recently generated keystream block (`O_j`).
    keystream: [u8; BLOCK_SIZE],
    /// Bytes of `keystream` already consumed; `BLOCK_SIZE` means empty.
    keystream_pos: usize,
    initialized: bool,
}

impl<C> Drop for Ofb<C> {
    fn drop(&mut self) {
        self.feedback.zeroize();
        self.keystream.zeroize();
    }
}

impl<C: BlockCipher> Ofb<C> {
    /// Wraps an already-keyed block cipher. Call [`CipherMode::initialize`]
    /// before transforming data.
    pub fn new(cipher: C) -> Self {
        Self {
            cipher,
            direction: CipherDirection::Encrypt,
            feedback: [0u8; BLOCK_SIZE],
            keystream: [0u8; BLOCK_SIZE],
            keystream_pos: BLOCK_SIZE,
            initialized: false,
        }
    }
}

impl<C: BlockCipher> CipherMode for Ofb<C> {
    fn name(&self) -> &'static str {
        "OFB"
    }

    fn initialize(&mut self, direction: CipherDirection, iv: &[u8]) -> Result<(), Error> {
        if iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvSize { expected: BLOCK_SIZE, actual: iv.len() });
        }
        self.direction = direction;
        self.feedback.copy_from_slice(iv);
        self.keystream_pos = BLOCK_SIZE;
        self.initialized = true;
        log::debug!(target: "ofb-mode", "OFB initialized for {:?}", direction);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized("OFB"));
        }
        if output.len() < input.len() {
            return Err(Error::BufferTooShort { needed: input.len(), actual: output.len() });
        }
        let output = &mut output[..input.len()];

        // Any bytes of `self.keystream` left over from a previous call that
        // stopped mid-block must be consumed before generating a new one,
        // so feeding a buffer in small chunks matches one whole-buffer call.
        let mut offset = 0;
        while offset < input.len() {
            if self.keystream_pos == BLOCK_SIZE {
                self.cipher.encrypt_block(&self.feedback, &mut self.keystream)?;
                self.feedback = self.keystream;
                self.keystream_pos = 0;
            }

            let n = (BLOCK_SIZE - self.keystream_pos).min(input.len() - offset);
            for i in 0..n {
                output[offset + i] = input[offset + i] ^ self.keystream[self.keystream_pos + i];
            }
            self.keystream_pos += n;
            offset += n;
        }

        Ok(())
    }

    fn requires_alignment(&self) -> bool {
        false
    }

    fn parallel_options(&self) -> ParallelOptions {
        ParallelOptions::sequential()
    }

    fn set_parallel_options(&mut self, options: ParallelOptions) -> Result<(), Error> {
        if options.is_parallel {
            return Err(Error::ParallelBlockSizeInvalid {
                actual: options.parallel_block_size,
                required_multiple: BLOCK_SIZE,
                min: hx_core::mode::PARALLEL_MIN,
                max: hx_core::mode::PARALLEL_MAX,
            });
        }
        Ok(())
    }

    fn iv_current(&self) -> &[u8] {
        &self.feedback
    }
}
