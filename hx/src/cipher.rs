//! `new_block_cipher` factory (spec §6 "Cipher factory").
//!
//! Each concrete cipher crate (`rhx`, `shx`, `thx`) defines its own
//! `KeyScheduleKind` because their extended-schedule options aren't
//! identical (RHX alone offers a cSHAKE1024 path for its widest extended
//! key sizes, see `DESIGN.md`). This factory exposes the common subset —
//! standard, HKDF-SHA256/512, cSHAKE128/256 — as one cipher-agnostic enum;
//! callers who need RHX's cSHAKE1024 construct `rhx::Rhx::extended`
//! directly instead of going through `hx`.

use hx_core::BlockCipher;

/// Which cipher family to construct.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CipherKind {
    /// Rijndael/AES (`rhx`/`rhx-ni`).
    Rijndael,
    /// Serpent (`shx`).
    Serpent,
    /// Twofish (`thx`).
    Twofish,
}

/// Digest backing an HKDF-driven extended schedule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HkdfDigest {
    /// HKDF over SHA-256.
    Sha256,
    /// HKDF over SHA-512.
    Sha512,
}

/// Strength of a cSHAKE-driven extended schedule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CShakeStrength {
    /// cSHAKE128-flavored.
    Cs128,
    /// cSHAKE256-flavored.
    Cs256,
}

/// Which key-schedule path to construct a cipher with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyScheduleKind {
    /// The cipher's published standard schedule.
    Standard,
    /// HKDF-Extract-then-Expand over the given digest.
    Hkdf(HkdfDigest),
    /// cSHAKE of the given strength.
    CShake(CShakeStrength),
}

fn to_rhx_schedule(kind: KeyScheduleKind) -> rhx::KeyScheduleKind {
    match kind {
        KeyScheduleKind::Standard => rhx::KeyScheduleKind::Standard,
        KeyScheduleKind::Hkdf(HkdfDigest::Sha256) => rhx::KeyScheduleKind::Hkdf(rhx::HkdfDigest::Sha256),
        KeyScheduleKind::Hkdf(HkdfDigest::Sha512) => rhx::KeyScheduleKind::Hkdf(rhx::HkdfDigest::Sha512),
        KeyScheduleKind::CShake(CShakeStrength::Cs128) => rhx::KeyScheduleKind::CShake(rhx::CShakeStrength::Cs128),
        KeyScheduleKind::CShake(CShakeStrength::Cs256) => rhx::KeyScheduleKind::CShake(rhx::CShakeStrength::Cs256),
    }
}

fn to_shx_schedule(kind: KeyScheduleKind) -> shx::KeyScheduleKind {
    match kind {
        KeyScheduleKind::Standard => shx::KeyScheduleKind::Standard,
        KeyScheduleKind::Hkdf(HkdfDigest::Sha256) => shx::KeyScheduleKind::Hkdf(shx::HkdfDigest::Sha256),
        KeyScheduleKind::Hkdf(HkdfDigest::Sha512) => shx::KeyScheduleKind::Hkdf(shx::HkdfDigest::Sha512),
        KeyScheduleKind::CShake(CShakeStrength::Cs128) => shx::KeyScheduleKind::CShake(shx::CShakeStrength::Cs128),
        KeyScheduleKind::CShake(CShakeStrength::Cs256) => shx::KeyScheduleKind::CShake(shx::CShakeStrength::Cs256),
    }
}

fn to_thx_schedule(kind: KeyScheduleKind) -> thx::KeyScheduleKind {
    match kind {
        KeyScheduleKind::Standard => thx::KeyScheduleKind::Standard,
        KeyScheduleKind::Hkdf(HkdfDigest::Sha256) => thx::KeyScheduleKind::Hkdf(thx::HkdfDigest::Sha256),
        KeyScheduleKind::Hkdf(HkdfDigest::Sha512) => thx::KeyScheduleKind::Hkdf(thx::HkdfDigest::Sha512),
        KeyScheduleKind::CShake(CShakeStrength::Cs128) => thx::KeyScheduleKind::CShake(thx::CShakeStrength::Cs128),
        KeyScheduleKind::CShake(CShakeStrength::Cs256) => thx::KeyScheduleKind::CShake(thx::CShakeStrength::Cs256),
    }
}

/// Builds an unkeyed block cipher. Call [`hx_core::BlockCipher::initialize`]
/// before use.
///
/// Rijndael is always constructed via `rhx-ni`, which probes AES-NI
/// availability at construction and falls back to the software path
/// transparently (spec §4.3: "callers never see a functional difference").
#[must_use]
pub fn new_block_cipher(
    cipher_kind: CipherKind,
    key_schedule_kind: KeyScheduleKind,
    rounds: Option<usize>,
) -> Box<dyn BlockCipher> {
    match cipher_kind {
        CipherKind::Rijndael => match key_schedule_kind {
            KeyScheduleKind::Standard => Box::new(rhx_ni::RhxNi::standard()),
            other => Box::new(rhx_ni::RhxNi::extended(to_rhx_schedule(other), rounds)),
        },
        CipherKind::Serpent => match key_schedule_kind {
            KeyScheduleKind::Standard => Box::new(shx::Shx::standard()),
            other => Box::new(shx::Shx::extended(to_shx_schedule(other), rounds)),
        },
        CipherKind::Twofish => match key_schedule_kind {
            KeyScheduleKind::Standard => Box::new(thx::Thx::standard()),
            other => Box::new(thx::Thx::extended(to_thx_schedule(other), rounds)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hx_core::CipherDirection;

    #[test]
    fn builds_and_round_trips_each_standard_cipher() {
        for kind in [CipherKind::Rijndael, CipherKind::Serpent, CipherKind::Twofish] {
            let mut cipher = new_block_cipher(kind, KeyScheduleKind::Standard, None);
            let key = vec![0x2bu8; cipher.legal_key_sizes()[0]];
            cipher.initialize(CipherDirection::Encrypt, &key, None).unwrap();

            let pt = [0x11u8; 16];
            let mut ct = [0u8; 16];
            cipher.encrypt_block(&pt, &mut ct).unwrap();
            assert_ne!(ct, pt);
        }
    }

    #[test]
    fn builds_an_extended_schedule_cipher() {
        let mut cipher = new_block_cipher(
            CipherKind::Rijndael,
            KeyScheduleKind::Hkdf(HkdfDigest::Sha256),
            None,
        );
        let key = vec![0x2bu8; cipher.legal_key_sizes()[0]];
        cipher.initialize(CipherDirection::Encrypt, &key, None).unwrap();

        let pt = [0x11u8; 16];
        let mut ct = [0u8; 16];
        cipher.encrypt_block(&pt, &mut ct).unwrap();
        assert_ne!(ct, pt);
    }
}
