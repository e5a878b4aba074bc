use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::padding::check_add_preconditions;
use hx_core::{Error, Padding};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};

/// ANSI X9.23 padding: zeros, then a final byte giving the pad length
/// (spec §4.7).
#[derive(Debug, Default, Clone, Copy)]
pub struct X923;

impl Padding for X923 {
    fn name(&self) -> &'static str {
        "X923"
    }

    fn add_padding(&self, block: &mut [u8], data_len: usize) {
        check_add_preconditions(block, data_len);
        let pad_len = BLOCK_SIZE - data_len;
        if pad_len == 0 {
            return;
        }
        for b in &mut block[data_len..BLOCK_SIZE - 1] {
            *b = 0;
        }
        block[BLOCK_SIZE - 1] = pad_len as u8;
    }

    fn pad_length(&self, block: &[u8]) -> Result<usize, Error> {
        assert_eq!(block.len(), BLOCK_SIZE, "padding operates on a 16-byte block");

        let raw = block[BLOCK_SIZE - 1];
        let oversize = raw.ct_gt(&(BLOCK_SIZE as u8));
        let is_zero = raw.ct_eq(&0u8);
        let clamped = u8::conditional_select(&raw, &1u8, oversize);
        let valid_range = !(oversize | is_zero);

        let threshold = BLOCK_SIZE as u8 - clamped;
        let mut all_zero = Choice::from(1u8);
        for (i, &byte) in block[..BLOCK_SIZE - 1].iter().enumerate() {
            let in_pad_region = (i as u8 + 1).ct_gt(&threshold);
            let eq = byte.ct_eq(&0u8);
            let ok_here = Choice::conditional_select(&Choice::from(1u8), &eq, in_pad_region);
            all_zero &= ok_here;
        }

        if bool::from(valid_range & all_zero) {
            Ok(clamped as usize)
        } else {
            Err(Error::InvalidPadding)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_strips_a_partial_block() {
        let mut block = [0xAAu8; 16];
        block[..10].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        X923.add_padding(&mut block, 10);
        assert_eq!(&block[10..15], &[0u8; 5]);
        assert_eq!(block[15], 6);
        assert_eq!(X923.pad_length(&block).unwrap(), 6);
    }

    #[test]
    fn pads_a_full_block_with_a_whole_pad_block() {
        let mut block = [0xFFu8; 16];
        X923.add_padding(&mut block, 0);
        let mut expected = [0u8; 16];
        expected[15] = 16;
        assert_eq!(block, expected);
        assert_eq!(X923.pad_length(&block).unwrap(), 16);
    }

    #[test]
    fn rejects_nonzero_bytes_in_the_pad_region() {
        let mut block = [0u8; 16];
        block[15] = 4;
        block[13] = 0x11;
        assert!(matches!(X923.pad_length(&block), Err(Error::InvalidPadding)));
    }

    #[test]
    fn rejects_a_zero_pad_length() {
        let block = [0u8; 16];
        assert!(matches!(X923.pad_length(&block), Err(Error::InvalidPadding)));
    }
}
