//! CTR / ICM counter mode (spec §4.4.3).
//!
//! Encrypt and decrypt are the same transform: XOR the data against
//! `E_K(counter)`, incrementing the counter once per 16-byte block. Unlike
//! the chaining modes this is a genuine stream cipher — buffers need not be
//! block-aligned, and any unconsumed tail of the current keystream block is
//! buffered and picked up by the next call, so splitting a buffer across
//! several `transform` calls produces the same output as one call.
//! Block-aligned buffers above the parallel threshold, with no such
//! leftover buffered, fan out across [`hx_parallel`] workers, each seeded
//! with its own slice of the counter space.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::{BlockCipher, CipherDirection, CipherMode, Error, ParallelOptions};
use zeroize::Zeroize;

/// Counter increment convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrVariant {
    /// "CTR": counter increments as a little-endian 128-bit integer.
    Ctr,
    /// "ICM": integer counter mode, counter increments big-endian.
    Icm,
}

fn counter_to_bytes(counter: u128, variant: CtrVariant) -> [u8; BLOCK_SIZE] {
    match variant {
        CtrVariant::Ctr => counter.to_le_bytes(),
        CtrVariant::Icm => counter.to_be_bytes(),
    }
}

fn bytes_to_counter(bytes: &[u8], variant: CtrVariant) -> u128 {
    let mut buf = [0u8; BLOCK_SIZE];
    buf.copy_from_slice(bytes);
    match variant {
        CtrVariant::Ctr => u128::from_le_bytes(buf),
        CtrVariant::Icm => u128::from_be_bytes(buf),
    }
}

/// CTR/ICM mode wrapping any [`BlockCipher`].
pub struct Ctr<C> {
    cipher: C,
    direction: CipherDirection,
    variant: CtrVariant,
    counter: u128,
    cached_iv: [u8; BLOCK_SIZE],
    /// Keystream block most recently generated by [`Ctr::transform_sequential`].
    keystream: [u8; BLOCK_SIZE],
    /// Bytes of `keystream` already consumed; `BLOCK_SIZE` means empty.
    keystream_pos: usize,
    parallel: ParallelOptions,
    initialized: bool,
}

impl<C> Drop for Ctr<C> {
    fn drop(&mut self) {
        self.cached_iv.zeroize();
        self.keystream.zeroize();
    }
}

impl<C: BlockCipher> Ctr<C> {
    /// Wraps an already-keyed block cipher using the little-endian ("CTR")
    /// counter convention. Call [`CipherMode::initialize`] before
    /// transforming data.
    pub fn new(cipher: C) -> Self {
        Self::with_variant(cipher, CtrVariant::Ctr)
    }

    /// Wraps an already-keyed block cipher with an explicit counter
    /// convention.
    pub fn with_variant(cipher: C, variant: CtrVariant) -> Self {
        Self {
            cipher,
            direction: CipherDirection::Encrypt,
            variant,
            counter: 0,
            cached_iv: [0u8; BLOCK_SIZE],
            keystream: [0u8; BLOCK_SIZE],
            keystream_pos: BLOCK_SIZE,
            parallel: ParallelOptions::default(),
            initialized: false,
        }
    }

    fn sync_cached_iv(&mut self) {
        self.cached_iv = counter_to_bytes(self.counter, self.variant);
    }

    /// XORs `input` against the keystream, carrying any unconsumed tail of
    /// the last generated block across calls so that feeding a buffer in
    /// arbitrary-sized chunks matches feeding it in one call.
    fn transform_sequential(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let mut offset = 0;
        while offset < input.len() {
            if self.keystream_pos == BLOCK_SIZE {
                let counter_bytes = counter_to_bytes(self.counter, self.variant);
                self.cipher.encrypt_block(&counter_bytes, &mut self.keystream)?;
                self.counter = self.counter.wrapping_add(1);
                self.keystream_pos = 0;
            }

            let n = (BLOCK_SIZE - self.keystream_pos).min(input.len() - offset);
            for i in 0..n {
                output[offset + i] = input[offset + i] ^ self.keystream[self.keystream_pos + i];
            }
            self.keystream_pos += n;
            offset += n;
        }

        self.sync_cached_iv();
        Ok(())
    }

    fn transform_parallel(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let segment_size = self.parallel.parallel_block_size / self.parallel.degree;
        let cipher = &self.cipher;
        let variant = self.variant;
        let base_counter = self.counter;

        hx_parallel::run(
            input,
            output,
            segment_size,
            |worker| {
                let block_offset = (worker * segment_size / BLOCK_SIZE) as u128;
                counter_to_bytes(base_counter.wrapping_add(block_offset), variant).to_vec()
            },
            move |_worker, in_slice, out_slice, local_iv| {
                let mut counter = bytes_to_counter(local_iv, variant);
                for (in_block, out_block) in
                    in_slice.chunks_exact(BLOCK_SIZE).zip(out_slice.chunks_exact_mut(BLOCK_SIZE))
                {
                    let counter_bytes = counter_to_bytes(counter, variant);
                    let mut keystream = [0u8; BLOCK_SIZE];
                    cipher
                        .encrypt_block(&counter_bytes, &mut keystream)
                        .expect("block length already validated by the caller");
                    for i in 0..BLOCK_SIZE {
                        out_block[i] = in_block[i] ^ keystream[i];
                    }
                    counter = counter.wrapping_add(1);
                }
            },
        )?;

        self.counter = base_counter.wrapping_add((input.len() / BLOCK_SIZE) as u128);
        self.keystream_pos = BLOCK_SIZE;
        self.sync_cached_iv();
        Ok(())
    }
}

impl<C: BlockCipher> CipherMode for Ctr<C> {
    fn name(&self) -> &'static str {
        "CTR"
    }

    fn initialize(&mut self, direction: CipherDirection, iv: &[u8]) -> Result<(), Error> {
        if iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvSize { expected: BLOCK_SIZE, actual: iv.len() });
        }
        self.direction = direction;
        self.counter = bytes_to_counter(iv, self.variant);
        self.cached_iv.copy_from_slice(iv);
        self.keystream_pos = BLOCK_SIZE;
        self.initialized = true;
        log::debug!(target: "ctr-mode", "CTR initialized for {:?} ({:?})", direction, self.variant);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized("CTR"));
        }
        if output.len() < input.len() {
            return Err(Error::BufferTooShort { needed: input.len(), actual: output.len() });
        }
        let output = &mut output[..input.len()];

        if self.parallel.is_parallel
            && self.keystream_pos == BLOCK_SIZE
            && input.len() % BLOCK_SIZE == 0
            && input.len() >= self.parallel.parallel_block_size
        {
            self.transform_parallel(input, output)
        } else {
            self.transform_sequential(input, output)
        }
    }

    fn requires_alignment(&self) -> bool {
        false
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
        &self.cached_iv
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
    fn encrypt_then_decrypt_round_trips_with_block_aligned_input() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..64u8).collect();

        let mut enc = Ctr::new(keyed_cipher());
        enc.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct = vec![0u8; 64];
        enc.transform(&pt, &mut ct).unwrap();

        let mut dec = Ctr::new(keyed_cipher());
        dec.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut recovered = vec![0u8; 64];
        dec.transform(&ct, &mut recovered).unwrap();

        assert_eq!(recovered, pt);
    }

    #[test]
    fn handles_buffers_that_are_not_block_aligned() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..37u8).collect();

        let mut enc = Ctr::new(keyed_cipher());
        enc.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct = vec![0u8; 37];
        enc.transform(&pt, &mut ct).unwrap();

        let mut dec = Ctr::new(keyed_cipher());
        dec.initialize(CipherDirection::Decrypt, &iv).unwrap();
        let mut recovered = vec![0u8; 37];
        dec.transform(&ct, &mut recovered).unwrap();

        assert_eq!(recovered, pt);
    }

    #[test]
    fn streaming_in_small_chunks_matches_a_single_call() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..=255u8).cycle().take(100).collect();

        let mut whole = Ctr::new(keyed_cipher());
        whole.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct_whole = vec![0u8; pt.len()];
        whole.transform(&pt, &mut ct_whole).unwrap();

        let mut chunked = Ctr::new(keyed_cipher());
        chunked.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut ct_chunked = vec![0u8; pt.len()];
        for chunk_start in (0..pt.len()).step_by(7) {
            let end = (chunk_start + 7).min(pt.len());
            chunked.transform(&pt[chunk_start..end], &mut ct_chunked[chunk_start..end]).unwrap();
        }

        assert_eq!(ct_whole, ct_chunked);
    }

    #[test]
    fn parallel_transform_matches_sequential_transform() {
        let iv = [0x00u8; 16];
        let pt: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let mut seq = Ctr::new(keyed_cipher());
        seq.set_parallel_options(ParallelOptions::sequential()).unwrap();
        seq.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut out_seq = vec![0u8; pt.len()];
        seq.transform(&pt, &mut out_seq).unwrap();

        let mut par = Ctr::new(keyed_cipher());
        par.set_parallel_options(ParallelOptions { is_parallel: true, degree: 4, parallel_block_size: 1024 })
            .unwrap();
        par.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut out_par = vec![0u8; pt.len()];
        par.transform(&pt, &mut out_par).unwrap();

        assert_eq!(out_seq, out_par);
    }

    #[test]
    fn ctr_and_icm_produce_different_ciphertext_for_a_nonzero_counter() {
        let iv = {
            let mut iv = [0u8; 16];
            iv[15] = 1;
            iv
        };
        let pt: Vec<u8> = (0..32u8).collect();

        let mut ctr = Ctr::with_variant(keyed_cipher(), CtrVariant::Ctr);
        ctr.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut out_ctr = vec![0u8; 32];
        ctr.transform(&pt, &mut out_ctr).unwrap();

        let mut icm = Ctr::with_variant(keyed_cipher(), CtrVariant::Icm);
        icm.initialize(CipherDirection::Encrypt, &iv).unwrap();
        let mut out_icm = vec![0u8; 32];
        icm.transform(&pt, &mut out_icm).unwrap();

        assert_ne!(out_ctr, out_icm);
    }

    #[test]
    fn rejects_wrong_iv_size() {
        let mut mode = Ctr::new(keyed_cipher());
        let err = mode.initialize(CipherDirection::Encrypt, &[0u8; 8]);
        assert!(matches!(err, Err(Error::InvalidIvSize { .. })));
    }
}
