//! The padding-scheme contract shared by `hx-padding`'s four implementors
//! (spec §4.7 "Padding algorithms").

use crate::{block_cipher::BLOCK_SIZE, Error};

/// A block padding scheme: fills a residual block's trailing bytes, and can
/// later determine unambiguously how many of those bytes were padding.
///
/// Implementations are stateless; every method operates on a single 16-byte
/// working buffer (spec §3 "Padding state").
pub trait Padding {
    /// Human-readable scheme name, e.g. `"PKCS7"`.
    fn name(&self) -> &'static str;

    /// Fill `block[data_len..BLOCK_SIZE]` with this scheme's padding.
    ///
    /// # Panics
    /// If `data_len > BLOCK_SIZE` or `block.len() != BLOCK_SIZE`.
    fn add_padding(&self, block: &mut [u8], data_len: usize);

    /// Determine the padding length encoded in `block` and return it.
    ///
    /// # Errors
    /// [`Error::InvalidPadding`] if `block`'s trailing bytes are not a valid
    /// encoding of this scheme.
    fn pad_length(&self, block: &[u8]) -> Result<usize, Error>;
}

/// Shared precondition check for [`Padding::add_padding`] implementations.
pub fn check_add_preconditions(block: &[u8], data_len: usize) {
    assert_eq!(block.len(), BLOCK_SIZE, "padding operates on a 16-byte block");
    assert!(data_len <= BLOCK_SIZE, "data_len exceeds the block size");
}
