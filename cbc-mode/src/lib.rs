//! Cipher Block Chaining mode (spec §4.4.1).
//!
//! Encryption is always sequential: each ciphertext block depends on the
//! one before it. Decryption is independent per block given its preceding
//! ciphertext block, so it fans out across [`hx_parallel`] workers once the
//! buffer crosses the configured parallel threshold. [`Cbc::transform_64`]
//! and [`Cbc::transform_128`] offer an opt-in wide-block variant that
//! chains across 4- or 8-subblock lanes instead of single 16-byte blocks.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::{BlockCipher, CipherDirection, CipherMode, Error, ParallelOptions};
use zeroize::Zeroize;

/// Subblocks per wide block for [`Cbc::transform_64`].
const WIDE_64_SUBBLOCKS: usize = 4;
/// Subblocks per wide block for [`Cbc::transform_128`].
const WIDE_128_SUBBLOCKS: usize = 8;

/// CBC mode wrapping any [`BlockCipher`].
pub struct Cbc<C> {
    cipher: C,
    direction: CipherDirection,
    iv_current: [u8; BLOCK_SIZE],
    parallel: ParallelOptions,
    initialized: bool,
}

impl<C> Drop for Cbc<C> {
    fn drop(&mut self) {
        self.iv_current.zeroize();
    }
}

impl<C: BlockCipher> Cbc<C> {
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
        let mut chain = self.iv_current;
        for (in_block, out_block) in input.chunks_exact(BLOCK_SIZE).zip(output.chunks_exact_mut(BLOCK_SIZE)) {
            let mut fed = [0u8; BLOCK_SIZE];
            for i in 0..BLOCK_SIZE {
                fed[i] = in_block[i] ^ chain[i];
            }
            self.cipher.encrypt_block(&fed, out_block)?;
            chain.copy_from_slice(out_block);
        }
        self.iv_current = chain;
        Ok(())
    }

    fn decrypt_sequential(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let mut chain = self.iv_current;
        for (in_block, out_block) in input.chunks_exact(BLOCK_SIZE).zip(output.chunks_exact_mut(BLOCK_SIZE)) {
            self.cipher.decrypt_block(in_block, out_block)?;
            for i in 0..BLOCK_SIZE {
                out_block[i] ^= chain[i];
            }
            chain.copy_from_slice(in_block);
        }
        self.iv_current = chain;
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
                let mut chain = [0u8; BLOCK_SIZE];
                chain.copy_from_slice(local_iv);
                for (in_block, out_block) in
                    in_slice.chunks_exact(BLOCK_SIZE).zip(out_slice.chunks_exact_mut(BLOCK_SIZE))
                {
                    cipher
                        .decrypt_block(in_block, out_block)
                        .expect("block length already validated by the caller");
                    for i in 0..BLOCK_SIZE {
                        out_block[i] ^= chain[i];
                    }
                    chain.copy_from_slice(in_block);
                }
            },
        )?;

        self.iv_current.copy_from_slice(&input[input.len() - BLOCK_SIZE..]);
        Ok(())
    }

    /// CBC-chains across 64-byte wide blocks (4 subblocks XORed as one
    /// lane) instead of 16-byte blocks. Opt-in; encrypt and decrypt must
    /// agree on wide-block width, and are each other's inverse.
    pub fn transform_64(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.transform_wide(WIDE_64_SUBBLOCKS, input, output)
    }

    /// Same as [`Cbc::transform_64`] but chains across 128-byte (8-subblock)
    /// wide blocks.
    pub fn transform_128(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.transform_wide(WIDE_128_SUBBLOCKS, input, output)
    }

    /// Shared wide-block engine. Every subblock of a wide block is XORed
    /// against the same `E_K(chain)` keystream; `chain` for the next wide
    /// block is the XOR of that wide block's ciphertext subblocks, so the
    /// per-block work is identical (and self-inverse) in both directions
    /// and the next chain value depends only on ciphertext, matching the
    /// parallel-decrypt dependency CBC already relies on.
    fn transform_wide(&mut self, subblocks: usize, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized("CBC"));
        }
        let wide_size = subblocks * BLOCK_SIZE;
        if input.len() % wide_size != 0 {
            return Err(Error::BufferMisaligned { alignment: wide_size, actual: input.len() });
        }
        if output.len() < input.len() {
            return Err(Error::BufferTooShort { needed: input.len(), actual: output.len() });
        }
        let output = &mut output[..input.len()];

        let mut chain = self.iv_current;
        for (in_wide, out_wide) in input.chunks_exact(wide_size).zip(output.chunks_exact_mut(wide_size)) {
            let mut keystream = [0u8; BLOCK_SIZE];
            self.cipher.encrypt_block(&chain, &mut keystream)?;

            let mut next_chain = [0u8; BLOCK_SIZE];
            for (in_block, out_block) in in_wide.chunks_exact(BLOCK_SIZE).zip(out_wide.chunks_exact_mut(BLOCK_SIZE)) {
                for i in 0..BLOCK_SIZE {
                    out_block[i] = in_block[i] ^ keystream[i];
                }
                let ciphertext_block = match self.direction {
                    CipherDirection::Encrypt => &*out_block,
                    CipherDirection::Decrypt => in_block,
                };
                for i in 0..BLOCK_SIZE {
                    next_chain[i] ^= ciphertext_block[i];
                }
            }
            chain = next_chain;
        }
        self.iv_current = chain;
        Ok(())
    }
}

impl<C: BlockCipher> CipherMode for Cbc<C> {
    fn name(&self) -> &'static str {
        "CBC"
    }

    fn initialize(&mut self, direction: CipherDirection, iv: &[u8]) -> Result<(), Error> {
        if iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvSize { expected: BLOCK_SIZE, actual: iv.len() });
        }
        self.direction = direction;
        self.iv_current.copy_from_slice(iv);
        self.initialized = true;
        log::debug!(target: "cbc-mode", "CBC initialized for {:?}", direction);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized("CBC"));
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

#[cfg(test)]
mod tests {
    use super::*;
    use hx_core::BlockCipher;
    use rhx::Rhx;

    fn keyed_cipher() -> Rhx {
        let mut c = Rhx::standard();
        c.initialize(CipherDirection::Encrypt, &[0x2bu8; 16], None).unwrap();
        c
    }

    #[test]
    fn encrypt_then_decrypt_sequential_round_trips() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..64u8).collect();

        let mut enc = Cbc::new(keyed_cipher());
        enc.set_parallel_options(ParallelOptions::sequential()).unwrap();
        enc.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct = vec![0u8; 64];
        enc.transform(&pt, &mut ct).unwrap();

        let mut dec = Cbc::new(keyed_cipher());
        dec.set_parallel_options(ParallelOptions::sequential()).unwrap();
        dec.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut recovered = vec![0u8; 64];
        dec.transform(&ct, &mut recovered).unwrap();

        assert_eq!(recovered, pt);
    }

    #[test]
    fn parallel_decrypt_matches_sequential_decrypt() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let mut enc = Cbc::new(keyed_cipher());
        enc.set_parallel_options(ParallelOptions::sequential()).unwrap();
        enc.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct = vec![0u8; pt.len()];
        enc.transform(&pt, &mut ct).unwrap();

        let mut dec_seq = Cbc::new(keyed_cipher());
        dec_seq.set_parallel_options(ParallelOptions::sequential()).unwrap();
        dec_seq.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut out_seq = vec![0u8; ct.len()];
        dec_seq.transform(&ct, &mut out_seq).unwrap();

        let mut dec_par = Cbc::new(keyed_cipher());
        dec_par
            .set_parallel_options(ParallelOptions { is_parallel: true, degree: 4, parallel_block_size: 1024 })
            .unwrap();
        dec_par.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut out_par = vec![0u8; ct.len()];
        dec_par.transform(&ct, &mut out_par).unwrap();

        assert_eq!(out_seq, pt);
        assert_eq!(out_par, pt);
    }

    #[test]
    fn rejects_misaligned_buffer() {
        let mut mode = Cbc::new(keyed_cipher());
        mode.initialize(CipherDirection::Encrypt, &[0u8; 16]).unwrap();
        let err = mode.transform(&[0u8; 17], &mut [0u8; 32]);
        assert!(matches!(err, Err(Error::BufferMisaligned { .. })));
    }

    #[test]
    fn rejects_wrong_iv_size() {
        let mut mode = Cbc::new(keyed_cipher());
        let err = mode.initialize(CipherDirection::Encrypt, &[0u8; 8]);
        assert!(matches!(err, Err(Error::InvalidIvSize { .. })));
    }

    #[test]
    fn wide_block_128_round_trips() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..=255u8).cycle().take(256).collect();

        let mut enc = Cbc::new(keyed_cipher());
        enc.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct = vec![0u8; pt.len()];
        enc.transform_128(&pt, &mut ct).unwrap();

        let mut dec = Cbc::new(keyed_cipher());
        dec.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut recovered = vec![0u8; pt.len()];
        dec.transform_128(&ct, &mut recovered).unwrap();

        assert_eq!(recovered, pt);
        assert_ne!(ct, pt);
    }

    #[test]
    fn wide_block_64_round_trips_across_multiple_wide_blocks() {
        let iv = [0x11u8; 16];
        let pt: Vec<u8> = (0..=255u8).cycle().take(192).collect();

        let mut enc = Cbc::new(keyed_cipher());
        enc.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct = vec![0u8; pt.len()];
        enc.transform_64(&pt, &mut ct).unwrap();

        let mut dec = Cbc::new(keyed_cipher());
        dec.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut recovered = vec![0u8; pt.len()];
        dec.transform_64(&ct, &mut recovered).unwrap();

        assert_eq!(recovered, pt);
    }

    #[test]
    fn rejects_input_not_a_multiple_of_the_wide_block_size() {
        let mut mode = Cbc::new(keyed_cipher());
        mode.initialize(CipherDirection::Encrypt, &[0u8; 16]).unwrap();
        let err = mode.transform_128(&[0u8; 100], &mut [0u8; 112]);
        assert!(matches!(err, Err(Error::BufferMisaligned { .. })));
    }
}
