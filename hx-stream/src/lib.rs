//! End-to-end streaming cipher driver (spec §4.8).
//!
//! Wraps any [`CipherMode`] and an optional [`Padding`] scheme and moves
//! bytes through `read -> (pad?) -> transform -> write`, chunked by the
//! mode's own `parallel_options().parallel_block_size` (any parallel
//! fan-out happens inside the mode; this crate adds no threading of its
//! own). Block-chaining modes (CBC, CFB) pad the final residual block on
//! encrypt and strip it on decrypt; genuine stream modes (CTR, OFB) pass
//! the tail straight through, relying on the mode's own partial-block
//! handling.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use std::io::{Read, Write};

use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::{CipherDirection, CipherMode, Padding};
use thiserror::Error;

/// Errors produced by [`CipherStream`]: either the underlying I/O failed, or
/// the wrapped mode/padding rejected the data.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The reader or writer returned an I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The wrapped cipher mode or padding scheme rejected the operation.
    #[error(transparent)]
    Cipher(#[from] hx_core::Error),
}

const FALLBACK_CHUNK_SIZE: usize = 64 * 1024;

/// A streaming driver over a [`CipherMode`], with optional padding for
/// block-chaining modes.
pub struct CipherStream<M: CipherMode> {
    mode: M,
    padding: Option<Box<dyn Padding>>,
    direction: CipherDirection,
}

impl<M: CipherMode> CipherStream<M> {
    /// Wraps `mode`. `padding` is required for CBC/CFB if the caller wants
    /// the final residual block padded/stripped automatically; it is
    /// ignored for stream-style modes (`mode.requires_alignment() ==
    /// false`), since those rely on the mode's own partial-tail handling.
    pub fn new(mode: M, padding: Option<Box<dyn Padding>>) -> Self {
        Self { mode, padding, direction: CipherDirection::Encrypt }
    }

    /// Seeds the wrapped mode's IV/feedback/counter register and direction.
    ///
    /// # Errors
    /// Propagates [`hx_core::Error::InvalidIvSize`] from the mode.
    pub fn initialize(&mut self, direction: CipherDirection, iv: &[u8]) -> Result<(), StreamError> {
        self.mode.initialize(direction, iv)?;
        self.direction = direction;
        Ok(())
    }

    fn chunk_size(&self) -> usize {
        self.mode.parallel_options().parallel_block_size.max(FALLBACK_CHUNK_SIZE)
    }

    fn uses_padding(&self) -> bool {
        self.padding.is_some() && self.mode.requires_alignment()
    }

    /// Runs the full `read -> (pad?) -> transform -> write` pipeline from
    /// `reader` to `writer`.
    ///
    /// # Errors
    /// [`StreamError::Io`] if the reader or writer fails;
    /// [`StreamError::Cipher`] if the mode or padding rejects the data (for
    /// example `InvalidPadding` on a corrupt decrypt, or `NotInitialized`
    /// if [`CipherStream::initialize`] was never called).
    pub fn process<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), StreamError> {
        if self.uses_padding() {
            self.process_with_padding(reader, writer)
        } else {
            self.process_pass_through(reader, writer)
        }
    }

    /// In-memory convenience wrapper over [`CipherStream::process`]: runs
    /// the pipeline over `input` and returns the transformed bytes.
    ///
    /// # Errors
    /// Same as [`CipherStream::process`].
    pub fn process_buf(&mut self, input: &[u8]) -> Result<Vec<u8>, StreamError> {
        let mut reader = std::io::Cursor::new(input);
        let mut out = Vec::with_capacity(input.len() + BLOCK_SIZE);
        self.process(&mut reader, &mut out)?;
        Ok(out)
    }

    /// Stream modes (and block modes used without padding): every chunk,
    /// including a short final one, goes straight to `mode.transform`. For
    /// CBC/CFB without padding configured this still requires
    /// block-aligned total input; a misaligned tail surfaces as
    /// `Error::BufferMisaligned` from the mode itself.
    fn process_pass_through<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), StreamError> {
        let chunk_size = self.chunk_size();
        let mut buf = vec![0u8; chunk_size];
        let mut out = vec![0u8; chunk_size];
        loop {
            let n = fill_or_eof(reader, &mut buf)?;
            if n == 0 {
                return Ok(());
            }
            self.mode.transform(&buf[..n], &mut out[..n])?;
            writer.write_all(&out[..n])?;
            if n < chunk_size {
                return Ok(());
            }
        }
    }

    /// Block-chaining modes with padding configured: holds one chunk back
    /// so the true final chunk (the one immediately preceding EOF) can be
    /// split into whole blocks plus a padded/stripped residual block.
    fn process_with_padding<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), StreamError> {
        let chunk_size = self.chunk_size();
        let mut buf = vec![0u8; chunk_size];
        let mut held: Option<Vec<u8>> = None;

        loop {
            let n = fill_or_eof(reader, &mut buf)?;
            if n == chunk_size {
                if let Some(full) = held.replace(buf[..n].to_vec()) {
                    self.transform_whole(&full, writer)?;
                }
                continue;
            }

            let mut tail = held.take().unwrap_or_default();
            tail.extend_from_slice(&buf[..n]);
            return self.transform_final(&tail, writer);
        }
    }

    fn transform_whole<W: Write>(&mut self, data: &[u8], writer: &mut W) -> Result<(), StreamError> {
        let mut out = vec![0u8; data.len()];
        self.mode.transform(data, &mut out)?;
        writer.write_all(&out)?;
        Ok(())
    }

    fn transform_final<W: Write>(&mut self, data: &[u8], writer: &mut W) -> Result<(), StreamError> {
        let padding = self.padding.as_ref().expect("uses_padding() checked before dispatch");

        match self.direction {
            CipherDirection::Encrypt => {
                let whole_len = (data.len() / BLOCK_SIZE) * BLOCK_SIZE;
                if whole_len > 0 {
                    self.transform_whole(&data[..whole_len], writer)?;
                }

                let residual_len = data.len() - whole_len;
                let mut block = [0u8; BLOCK_SIZE];
                block[..residual_len].copy_from_slice(&data[whole_len..]);
                padding.add_padding(&mut block, residual_len);

                let mut out = [0u8; BLOCK_SIZE];
                self.mode.transform(&block, &mut out)?;
                writer.write_all(&out)?;
                Ok(())
            }
            CipherDirection::Decrypt => {
                if data.is_empty() {
                    return Ok(());
                }
                if data.len() % BLOCK_SIZE != 0 {
                    return Err(StreamError::Cipher(hx_core::Error::BufferMisaligned {
                        alignment: BLOCK_SIZE,
                        actual: data.len(),
                    }));
                }

                let last_block_start = data.len() - BLOCK_SIZE;
                if last_block_start > 0 {
                    self.transform_whole(&data[..last_block_start], writer)?;
                }

                let mut out = [0u8; BLOCK_SIZE];
                self.mode.transform(&data[last_block_start..], &mut out)?;
                let pad_len = padding.pad_length(&out)?;
                writer.write_all(&out[..BLOCK_SIZE - pad_len])?;
                Ok(())
            }
        }
    }
}

/// Reads into `buf` until it is full or the reader reaches true EOF,
/// looping over short reads rather than treating them as EOF (a single
/// short `Read::read` is not itself an end-of-stream signal).
fn fill_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
