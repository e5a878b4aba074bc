//! `CipherDescriptor`: the wire encoding for a persisted cipher/mode
//! configuration (spec §6 "Byte format on the wire").
//!
//! The core library adds no framing to ciphertext; this struct is for
//! callers who want to persist *which* cipher/mode/padding/KDF produced a
//! ciphertext alongside it. Every field is a plain numeric tag, not an
//! enum, since the mapping from tag to cipher/mode/padding kind is a
//! higher-level caller's concern.

use hx_core::Error;

/// Number of bytes a [`CipherDescriptor`] occupies on the wire: 1 + 2 + 1 +
/// 1 + 1 + 1 + 1 + 1 + 2 + 1, one field after another in declaration order.
pub const DESCRIPTOR_LEN: usize = 12;

/// A fixed-size, little-endian descriptor of a cipher/mode/padding
/// configuration (spec §6).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct CipherDescriptor {
    /// Tag identifying the block cipher (Rijndael/Serpent/Twofish/...).
    pub cipher_kind: u8,
    /// Key size, in bytes.
    pub key_size: u16,
    /// IV size, in bytes.
    pub iv_size: u8,
    /// Tag identifying the cipher mode (CBC/CFB/CTR/OFB/...).
    pub mode: u8,
    /// Tag identifying the padding scheme, or 0 for none.
    pub padding: u8,
    /// Block size, in bytes (16 for every cipher in this workspace).
    pub block_size: u8,
    /// Round count the cipher was initialized with.
    pub rounds: u8,
    /// Tag identifying the key-schedule/KDF used, or 0 for standard.
    pub kdf: u8,
    /// MAC key size, in bytes, or 0 if unauthenticated.
    pub mac_key_size: u16,
    /// Tag identifying the MAC algorithm, or 0 if unauthenticated.
    pub mac: u8,
}

impl CipherDescriptor {
    /// Packs the descriptor into its 12-byte little-endian wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; DESCRIPTOR_LEN] {
        let mut out = [0u8; DESCRIPTOR_LEN];
        out[0] = self.cipher_kind;
        out[1..3].copy_from_slice(&self.key_size.to_le_bytes());
        out[3] = self.iv_size;
        out[4] = self.mode;
        out[5] = self.padding;
        out[6] = self.block_size;
        out[7] = self.rounds;
        out[8] = self.kdf;
        out[9..11].copy_from_slice(&self.mac_key_size.to_le_bytes());
        out[11] = self.mac;
        out
    }

    /// Unpacks a descriptor from its 12-byte little-endian wire form.
    ///
    /// # Errors
    /// [`Error::BufferTooShort`] if `bytes` is shorter than
    /// [`DESCRIPTOR_LEN`].
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < DESCRIPTOR_LEN {
            return Err(Error::BufferTooShort { needed: DESCRIPTOR_LEN, actual: bytes.len() });
        }
        Ok(Self {
            cipher_kind: bytes[0],
            key_size: u16::from_le_bytes([bytes[1], bytes[2]]),
            iv_size: bytes[3],
            mode: bytes[4],
            padding: bytes[5],
            block_size: bytes[6],
            rounds: bytes[7],
            kdf: bytes[8],
            mac_key_size: u16::from_le_bytes([bytes[9], bytes[10]]),
            mac: bytes[11],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_round_trips() {
        let descriptor = CipherDescriptor {
            cipher_kind: 1,
            key_size: 32,
            iv_size: 16,
            mode: 2,
            padding: 1,
            block_size: 16,
            rounds: 14,
            kdf: 0,
            mac_key_size: 0,
            mac: 0,
        };

        let bytes = descriptor.encode();
        assert_eq!(bytes.len(), DESCRIPTOR_LEN);
        assert_eq!(CipherDescriptor::decode(&bytes).unwrap(), descriptor);
    }

    #[test]
    fn rejects_a_short_buffer() {
        let err = CipherDescriptor::decode(&[0u8; 4]);
        assert!(matches!(err, Err(Error::BufferTooShort { .. })));
    }
}
