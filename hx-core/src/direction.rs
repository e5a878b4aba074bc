/// Direction a cipher or mode was initialized for.
///
/// Some modes (CTR/OFB) do not branch on this at transform time, but every
/// `initialize` call still records it: it selects which round-key ordering a
/// block cipher uses, and which state-machine transitions are legal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CipherDirection {
    /// Encrypting plaintext into ciphertext.
    Encrypt,
    /// Decrypting ciphertext into plaintext.
    Decrypt,
}

impl CipherDirection {
    /// `true` for [`CipherDirection::Encrypt`].
    #[must_use]
    pub const fn is_encryption(self) -> bool {
        matches!(self, CipherDirection::Encrypt)
    }
}
