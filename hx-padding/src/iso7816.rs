use hx_core::block_cipher::BLOCK_SIZE;
use hx_core::padding::check_add_preconditions;
use hx_core::{Error, Padding};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// ISO/IEC 7816-4 padding: `0x80` followed by zeros (spec §4.7).
#[derive(Debug, Default, Clone, Copy)]
pub struct Iso7816;

impl Padding for Iso7816 {
    fn name(&self) -> &'static str {
        "ISO7816-4"
    }

    fn add_padding(&self, block: &mut [u8], data_len: usize) {
        check_add_preconditions(block, data_len);
        if data_len == BLOCK_SIZE {
            return;
        }
        block[data_len] = 0x80;
        for b in &mut block[data_len + 1..] {
            *b = 0;
        }
    }

    fn pad_length(&self, block: &[u8]) -> Result<usize, Error> {
        assert_eq!(block.len(), BLOCK_SIZE, "padding operates on a 16-byte block");

        let mut found = Choice::from(0u8);
        let mut marker_ok = Choice::from(0u8);
        let mut length = 0u32;
        for i in (0..BLOCK_SIZE).rev() {
            let is_nonzero = !block[i].ct_eq(&0u8);
            let first_hit = is_nonzero & !found;
            let eq_marker = block[i].ct_eq(&0x80u8);
            marker_ok = Choice::conditional_select(&marker_ok, &eq_marker, first_hit);
            let candidate_len = (BLOCK_SIZE - i) as u32;
            length = u32::conditional_select(&length, &candidate_len, first_hit);
            found |= is_nonzero;
        }

        if bool::from(found & marker_ok) {
            Ok(length as usize)
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
        Iso7816.add_padding(&mut block, 10);
        assert_eq!(block[10], 0x80);
        assert_eq!(&block[11..], &[0u8; 5]);
        assert_eq!(Iso7816.pad_length(&block).unwrap(), 6);
    }

    #[test]
    fn pads_a_full_block_with_a_whole_pad_block() {
        let mut block = [0xFFu8; 16];
        Iso7816.add_padding(&mut block, 0);
        let mut expected = [0u8; 16];
        expected[0] = 0x80;
        assert_eq!(block, expected);
        assert_eq!(Iso7816.pad_length(&block).unwrap(), 16);
    }

    #[test]
    fn rejects_an_all_zero_block() {
        let block = [0u8; 16];
        assert!(matches!(Iso7816.pad_length(&block), Err(Error::InvalidPadding)));
    }

    #[test]
    fn rejects_a_rightmost_nonzero_byte_that_is_not_the_marker() {
        let mut block = [0u8; 16];
        block[13] = 0x42;
        assert!(matches!(Iso7816.pad_length(&block), Err(Error::InvalidPadding)));
    }
}
