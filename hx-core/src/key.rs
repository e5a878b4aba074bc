//! Symmetric key material (spec §3 "Symmetric key material").

use zeroize::Zeroize;

/// A key bundle: the primary key, an IV/nonce/counter seed, and an optional
/// tweak (`info`) consumed by extended (KDF-driven) key schedules.
///
/// The bundle owns its bytes and clears them on drop. It performs no length
/// validation itself; each consumer (block cipher, mode) validates lengths
/// against its own legal-size sets at `initialize` time.
#[derive(Clone)]
pub struct KeyBundle {
    key: Vec<u8>,
    iv: Option<Vec<u8>>,
    info: Option<Vec<u8>>,
}

impl KeyBundle {
    /// Build a bundle from a raw key with no IV or tweak.
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv: None,
            info: None,
        }
    }

    /// Attach an IV/nonce/counter seed.
    #[must_use]
    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.iv = Some(iv.into());
        self
    }

    /// Attach an `info` tweak for an extended (KDF-driven) key schedule.
    #[must_use]
    pub fn with_info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// The primary key bytes.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The IV/nonce/counter seed, if one was supplied.
    #[must_use]
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    /// The KDF tweak, if one was supplied.
    #[must_use]
    pub fn info(&self) -> Option<&[u8]> {
        self.info.as_deref()
    }
}

impl Drop for KeyBundle {
    fn drop(&mut self) {
        self.key.zeroize();
        if let Some(iv) = self.iv.as_mut() {
            iv.zeroize();
        }
    }
}

impl std::fmt::Debug for KeyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBundle")
            .field("key", &"<redacted>")
            .field("iv", &self.iv.as_ref().map(|_| "<redacted>"))
            .field("info", &self.info)
            .finish()
    }
}
