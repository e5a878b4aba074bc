use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::padding::check_add_preconditions;
use hx_core::{Error, Padding};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};

/// PKCS#7 padding: fill with the pad length repeated (spec §4.7).
#[derive(Debug, Default, Clone, Copy)]
pub struct Pkcs7;

impl Padding for Pkcs7 {
    fn name(&self) -> &'static str {
        "PKCS7"
    }

    fn add_padding(&self, block: &mut [u8], data_len: usize) {
        check_add_preconditions(block, data_len);
        let pad_len = (BLOCK_SIZE - data_len) as u8;
        for b in &mut block[data_len..] {
            *b = pad_len;
        }
    }

    fn pad_length(&self, block: &[u8]) -> Result<usize, Error> {
        assert_eq!(block.len(), BLOCK_SIZE, "padding operates on a 16-byte block");

        let raw = block[BLOCK_SIZE - 1];
        let oversize = raw.ct_gt(&(BLOCK_SIZE as u8));
        let is_zero = raw.ct_eq(&0u8);
        let clamped = u8::conditional_select(&raw, &1u8, oversize);
        let valid_range = !(oversize | is_zero);

        let threshold = BLOCK_SIZE as u8 - clamped;
        let mut all_match = Choice::from(1u8);
        for (i, &byte) in block.iter().enumerate() {
            let in_pad_region = (i as u8 + 1).ct_gt(&threshold);
            let eq = byte.ct_eq(&clamped);
            let ok_here = Choice::conditional_select(&Choice::from(1u8), &eq, in_pad_region);
            all_match &= ok_here;
        }

        if bool::from(valid_range & all_match) {
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
        let mut block = [0u8; 16];
        block[..10].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        Pkcs7.add_padding(&mut block, 10);
        assert_eq!(&block[10..], &[6u8; 6]);
        assert_eq!(Pkcs7.pad_length(&block).unwrap(), 6);
    }

    #[test]
    fn pads_a_full_block_with_a_whole_pad_block() {
        let mut block = [0xFFu8; 16];
        Pkcs7.add_padding(&mut block, 0);
        assert_eq!(block, [16u8; 16]);
        assert_eq!(Pkcs7.pad_length(&block).unwrap(), 16);
    }

    #[test]
    fn rejects_a_zero_pad_length() {
        let block = [0u8; 16];
        assert!(matches!(Pkcs7.pad_length(&block), Err(Error::InvalidPadding)));
    }

    #[test]
    fn rejects_inconsistent_pad_bytes() {
        let mut block = [5u8; 16];
        block[12] = 0xAA;
        assert!(matches!(Pkcs7.pad_length(&block), Err(Error::InvalidPadding)));
    }

    #[test]
    fn rejects_a_pad_length_above_the_block_size() {
        let block = [200u8; 16];
        assert!(matches!(Pkcs7.pad_length(&block), Err(Error::InvalidPadding)));
    }
}
