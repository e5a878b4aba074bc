//! Cipher Feedback mode (spec §4.4.2).
//!
//! Encryption is always sequential: each ciphertext block is produced by
//! enciphering the previous ciphertext block (the feedback register) and
//! XORing the result with plaintext. Decryption never calls the block
//! cipher's decrypt primitive — it runs the same feedback keystream through
//! the encrypt primitive and XORs it against ciphertext — and is independent
//! per block given its preceding ciphertext, so it fans out across
//! [`hx_parallel`] workers once the buffer crosses the configured parallel
//! threshold, exactly like CBC decrypt.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::{BlockCipher, CipherDirection, CipherMode, Error, ParallelOptions};
use zeroize::Zeroize;

/// CFB mode wrapping any [`BlockCipher`].
pub struct Cfb<C> {
    cipher: C,
    direction: CipherDirection,
    iv_current: [u8; BLOCK_SIZE],
    parallel: ParallelOptions,
    initialized: bool,
}

impl<C> Drop for Cfb<C> {
    fn drop(&mut self) {
        self.iv_current.zeroize();
    }
}

impl<C: BlockCipher> Cfb<C> {
    /// Wraps an already-keyed block cipher. Call [`CipherMode::initialize`]
    /// before transforming data.
    pub fn new(cipher: C) -> Self {
        Self {
            cipher,
            direction: CipherDirection::Encrypt,
            iv_current: [0u8; BLOCK_SIZE],
            parallel: ParallelOptions::default(),
            initialized: false,
        }
    }

    fn encrypt_sequential(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let mut feedback = self.iv_current;
        for (in_block, out_block) in input.chunks_exact(BLOCK_SIZE).zip(output.chunks_exact_mut(BLOCK_SIZE)) {
            let mut keystream = [0u8; BLOCK_SIZE];
            self.cipher.encrypt_block(&feedback, &mut keystream)?;
            for i in 0..BLOCK_SIZE {
                out_block[i] = in_block[i] ^ keystream[i];
            }
            feedback.copy_from_slice(out_block);
        }
        self.iv_current = feedback;
        Ok(())
    }

    fn decrypt_sequential(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let mut feedback = self.iv_current;
        for (in_block, out_block) in input.chunks_exact(BLOCK_SIZE).zip(output.chunks_exact_mut(BLOCK_SIZE)) {
            let mut keystream = [0u8; BLOCK_SIZE];
            self.cipher.encrypt_block(&feedback, &mut keystream)?;
            for i in 0..BLOCK_SIZE {
                out_block[i] = in_block[i] ^ keystream[i];
            }
            feedback.copy_from_slice(in_block);
        }
        self.iv_current = feedback;
        Ok(())
    }

    fn decrypt_parallel(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let segment_size = self.parallel.parallel_block_size / self.parallel.degree;
        let cipher = &self.cipher;
        let initial_iv = self.iv_current;

        hx_parallel::run(
            input,
            output,
            segment_size,
            |worker| {
                if worker == 0 {
                    initial_iv.to_vec()
                } else {
                    let offset = worker * segment_size;
                    input[offset - BLOCK_SIZE..offset].to_vec()
                }
            },
            move |_worker, in_slice, out_slice, local_iv| {
                let mut feedback = [0u8; BLOCK_SIZE];
                feedback.copy_from_slice(local_iv);
                for (in_block, out_block) in
                    in_slice.chunks_exact(BLOCK_SIZE).zip(out_slice.chunks_exact_mut(BLOCK_SIZE))
                {
                    let mut keystream = [0u8; BLOCK_SIZE];
                    cipher
                        .encrypt_block(&feedback, &mut keystream)
                        .expect("block length already validated by the caller");
                    for i in 0..BLOCK_SIZE {
                        out_block[i] = in_block[i] ^ keystream[i];
                    }
                    feedback.copy_from_slice(in_block);
                }
            },
        )?;

        self.iv_current.copy_from_slice(&input[input.len() - BLOCK_SIZE..]);
        Ok(())
    }
}

impl<C: BlockCipher> CipherMode for Cfb<C> {
    fn name(&self) -> &'static str {
        "CFB"
    }

    fn initialize(&mut self, direction: CipherDirection, iv: &[u8]) -> Result<(), Error> {
        if iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvSize { expected: BLOCK_SIZE, actual: iv.len() });
        }
        self.direction = direction;
        self.iv_current.copy_from_slice(iv);
        self.initialized = true;
        log::debug!(target: "cfb-mode", "CFB initialized for {:?}", direction);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized("CFB"));
        }
        if input.len() % BLOCK_SIZE != 0 {
            return Err(Error::BufferMisaligned { alignment: BLOCK_SIZE, actual: input.len() });
        }
        if output.len() < input.len() {
            return Err(Error::BufferTooShort { needed: input.len(), actual: output.len() });
        }
        let output = &mut output[..input.len()];

        match self.direction {
            CipherDirection::Encrypt => self.encrypt_sequential(input, output),
            CipherDirection::Decrypt => {
                if self.parallel.is_parallel && input.len() >= self.parallel.parallel_block_size {
                    self.decrypt_parallel(input, output)
                } else {
                    self.decrypt_sequential(input, output)
                }
            }
        }
    }

    fn parallel_options(&self) -> ParallelOptions {
        self.parallel
    }

    fn set_parallel_options(&mut self, options: ParallelOptions) -> Result<(), Error> {
        options.validate(BLOCK_SIZE)?;
        self.parallel = options;
        Ok(())
    }

    fn iv_current(&self) -> &[u8] {
        &self.iv_current
    }
}
