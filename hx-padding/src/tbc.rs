use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::padding::check_add_preconditions;
use hx_core::{Error, Padding};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Trailing-bit-complement padding: fill with the complement of the last
/// data bit, repeated (spec §4.7).
///
/// Like the original scheme, this cannot distinguish padding from data that
/// happens to already end in a run of the fill byte; callers that need an
/// unambiguous strip should prefer [`crate::Pkcs7`] or [`crate::X923`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Tbc;

impl Padding for Tbc {
    fn name(&self) -> &'static str {
        "TBC"
    }

    fn add_padding(&self, block: &mut [u8], data_len: usize) {
        check_add_preconditions(block, data_len);
        if data_len == BLOCK_SIZE {
            return;
        }
        let last_bit = if data_len == 0 { 0 } else { block[data_len - 1] & 1 };
        let fill = if last_bit == 0 { 0xFFu8 } else { 0x00u8 };
        for b in &mut block[data_len..] {
            *b = fill;
        }
    }

    fn pad_length(&self, block: &[u8]) -> Result<usize, Error> {
        assert_eq!(block.len(), BLOCK_SIZE, "padding operates on a 16-byte block");

        let fill = block[BLOCK_SIZE - 1];
        let mut still_matching = Choice::from(1u8);
        let mut length = 0u32;
        for &byte in block.iter().rev() {
            still_matching &= byte.ct_eq(&fill);
            length += u32::conditional_select(&0, &1, still_matching);
        }

        Ok(length as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_all_ones_when_the_last_data_bit_is_zero() {
        let mut block = [0u8; 16];
        block[..10].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        Tbc.add_padding(&mut block, 10);
        assert_eq!(&block[10..], &[0xFFu8; 6]);
        assert_eq!(Tbc.pad_length(&block).unwrap(), 6);
    }

    #[test]
    fn pads_with_all_zeros_when_the_last_data_bit_is_one() {
        let mut block = [0u8; 16];
        block[..10].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 11]);
        Tbc.add_padding(&mut block, 10);
        assert_eq!(&block[10..], &[0x00u8; 6]);
        assert_eq!(Tbc.pad_length(&block).unwrap(), 6);
    }

    #[test]
    fn pads_a_full_block_with_a_whole_pad_block() {
        let mut block = [0u8; 16];
        block[15] = 11;
        let original = block;
        Tbc.add_padding(&mut block, 16);
        assert_eq!(block, original);
    }
}
