//! Key schedule expansion (spec §4.1 "Key-schedule expander").
//!
//! Two independent paths feed the same round-key representation
//! (`Vec<[u8; 16]>`, one entry per round including the whitening round):
//! the standard FIPS-197 expansion, and an extended path that replaces it
//! with HKDF or cSHAKE output.

use digest::{ExtendableOutput, Update, XofReader};
use hkdf::Hkdf;
use hx_core::Error;
use sha2::{Sha256, Sha512};
use sha3::{Shake128, Shake256};

use crate::tables::{rcon, sbox};

/// Standard Rijndael key sizes, in bytes, and the legal extended key sizes.
pub const STANDARD_KEY_SIZES: [usize; 3] = [16, 24, 32];
/// Standard round counts, index-aligned with [`STANDARD_KEY_SIZES`].
pub const STANDARD_ROUNDS: [usize; 3] = [10, 12, 14];

/// Extended (HKDF/cSHAKE-driven) Rijndael key sizes, in bytes.
pub const EXTENDED_KEY_SIZES: [usize; 3] = [32, 64, 128];
/// Legal extended round counts.
pub const EXTENDED_ROUNDS: [usize; 3] = [22, 30, 38];
/// Default round count for the extended schedule when the caller does not pick one.
pub const EXTENDED_DEFAULT_ROUNDS: usize = 22;

/// Canonical `info` tag used when an extended-schedule caller supplies none
/// (spec §9 Open Question: "the HKDF info default string is inconsistent
/// between ciphers in the source"; this workspace fixes one tag per cipher).
pub const DEFAULT_INFO: &[u8] = b"HX RHX INFO V1";

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
    /// cSHAKE128.
    Cs128,
    /// cSHAKE256.
    Cs256,
    /// cSHAKE256 iterated across domain-separated blocks to reach 1024-bit
    /// security-level output, since no standardized 1024-bit cSHAKE exists
    /// (see `DESIGN.md` for this Open Question's resolution).
    Cs1024,
}

/// Which key-schedule path a cipher instance was constructed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyScheduleKind {
    /// The published FIPS-197 expansion.
    Standard,
    /// HKDF-Extract-then-Expand over the given digest.
    Hkdf(HkdfDigest),
    /// cSHAKE of the given strength.
    CShake(CShakeStrength),
}

fn rot_word(w: [u8; 4]) -> [u8; 4] {
    [w[1], w[2], w[3], w[0]]
}

fn sub_word(w: [u8; 4]) -> [u8; 4] {
    let s = sbox();
    [
        s[w[0] as usize],
        s[w[1] as usize],
        s[w[2] as usize],
        s[w[3] as usize],
    ]
}

fn xor_word(a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    [a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]
}

/// Standard FIPS-197 key expansion: produces `rounds + 1` round keys of 16
/// bytes each from a 16/24/32-byte key.
pub fn expand_standard(key: &[u8], rounds: usize) -> Vec<[u8; 16]> {
    let nk = key.len() / 4;
    let total_words = 4 * (rounds + 1);
    let mut w: Vec<[u8; 4]> = Vec::with_capacity(total_words);

    for chunk in key.chunks_exact(4) {
        w.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let rc = rcon((total_words / nk) + 1);

    for i in nk..total_words {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(rot_word(temp));
            temp[0] ^= rc[i / nk - 1];
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        w.push(xor_word(w[i - nk], temp));
    }

    w.chunks_exact(4)
        .map(|round| {
            let mut bytes = [0u8; 16];
            for (word_idx, word) in round.iter().enumerate() {
                bytes[word_idx * 4..word_idx * 4 + 4].copy_from_slice(word);
            }
            bytes
        })
        .collect()
}

/// Extended (KDF-driven) key expansion: `key || info` feeds an HKDF or
/// cSHAKE instance configured for `(rounds + 1) * 16` bytes of output,
/// parsed directly as round-key material.
pub fn expand_extended(
    kind: &KeyScheduleKind,
    key: &[u8],
    info: Option<&[u8]>,
    rounds: usize,
) -> Result<Vec<[u8; 16]>, Error> {
    let out_len = (rounds + 1) * 16;
    let info = info.unwrap_or(DEFAULT_INFO);
    let mut out = vec![0u8; out_len];

    match kind {
        KeyScheduleKind::Standard => unreachable!("expand_extended is never called for Standard"),
        KeyScheduleKind::Hkdf(HkdfDigest::Sha256) => {
            let hk = Hkdf::<Sha256>::new(None, key);
            hk.expand(info, &mut out)
                .map_err(|_| Error::InvalidKeySize { cipher: "RHX", actual: key.len() })?;
        }
        KeyScheduleKind::Hkdf(HkdfDigest::Sha512) => {
            let hk = Hkdf::<Sha512>::new(None, key);
            hk.expand(info, &mut out)
                .map_err(|_| Error::InvalidKeySize { cipher: "RHX", actual: key.len() })?;
        }
        KeyScheduleKind::CShake(CShakeStrength::Cs128) => {
            // Domain-separated SHAKE128, standing in for cSHAKE128 (the
            // function-name/customization bytepad framing of SP800-185 is
            // not implemented; see `DESIGN.md`).
            let mut xof = Shake128::default();
            xof.update(b"cSHAKE128");
            xof.update(key);
            xof.update(info);
            xof.finalize_xof().read(&mut out);
        }
        KeyScheduleKind::CShake(CShakeStrength::Cs256) => {
            let mut xof = Shake256::default();
            xof.update(b"cSHAKE256");
            xof.update(key);
            xof.update(info);
            xof.finalize_xof().read(&mut out);
        }
        KeyScheduleKind::CShake(CShakeStrength::Cs1024) => {
            // No standardized 1024-bit cSHAKE exists; iterate SHAKE256 over
            // domain-separated 64-byte blocks indexed by a big-endian
            // counter appended to `info` (spec §4.1, §9 Open Question).
            let mut produced = 0;
            let mut counter: u32 = 0;
            while produced < out_len {
                let mut xof = Shake256::default();
                xof.update(b"cSHAKE1024");
                xof.update(key);
                xof.update(info);
                xof.update(&counter.to_be_bytes());
                let take = (out_len - produced).min(64);
                let mut block = [0u8; 64];
                xof.finalize_xof().read(&mut block[..take]);
                out[produced..produced + take].copy_from_slice(&block[..take]);
                produced += take;
                counter += 1;
            }
        }
    }

    Ok(out
        .chunks_exact(16)
        .map(|c| {
            let mut b = [0u8; 16];
            b.copy_from_slice(c);
            b
        })
        .collect())
}
