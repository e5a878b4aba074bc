//! Twofish key schedule: the classic h-function/PHT-driven expansion and an
//! extended HKDF/cSHAKE-driven path (spec §4.1).

use digest::{ExtendableOutput, Update, XofReader};
use hkdf::Hkdf;
use hx_core::Error;
use sha2::{Sha256, Sha512};
use sha3::{Shake128, Shake256};

use crate::tables::{mds_multiply, q0, q1, rs_encode};

/// Legal key sizes, in bytes, shared by the standard and extended schedules.
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];
/// Legal round counts (spec §3: `{16..32 step 4}`).
pub const ROUNDS: [usize; 5] = [16, 20, 24, 28, 32];
/// Default round count.
pub const DEFAULT_ROUNDS: usize = 16;

/// Golden-ratio-style constant used to derive the A/B schedule inputs.
const RHO: u32 = 0x0101_0101;

/// Canonical extended-schedule `info` tag.
pub const DEFAULT_INFO: &[u8] = b"HX THX INFO V1";

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

/// Which key-schedule path a cipher instance was constructed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyScheduleKind {
    /// The published h-function-driven schedule.
    Standard,
    /// HKDF-Extract-then-Expand over the given digest.
    Hkdf(HkdfDigest),
    /// SHAKE-based domain-separated expansion standing in for cSHAKE.
    CShake(CShakeStrength),
}

/// Round-key material: whitening/round words plus the key-dependent S-box
/// words consumed by `g`.
#[derive(Clone)]
pub struct RoundKeys {
    /// `2*rounds + 8` round-key words (spec §3: 40 words at the default 16
    /// rounds).
    pub words: Vec<u32>,
    /// Key-dependent S-box words fed to `g` (`key_len / 8` of them).
    pub sbox_words: Vec<u32>,
}

fn word_bytes_le(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// The h-function: substitutes each byte of `x` through `q0`/`q1` in an
/// alternating pattern, XORing against each key word from the last to the
/// first, then mixes the result through the MDS matrix.
pub fn h(x: u32, l: &[u32]) -> u32 {
    let mut bytes = x.to_le_bytes();
    for lw in l.iter().rev() {
        let lb = lw.to_le_bytes();
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = if i % 2 == 0 { q0(*b) } else { q1(*b) };
            *b ^= lb[i];
        }
    }
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = if i % 2 == 0 { q0(*b) } else { q1(*b) };
    }
    u32::from_le_bytes(mds_multiply(bytes))
}

/// `g(x) = h(x, sbox_words)`, the round function's per-half transform.
pub fn g(x: u32, sbox_words: &[u32]) -> u32 {
    h(x, sbox_words)
}

/// Derives the standard key schedule from raw key bytes.
pub fn expand_standard(key: &[u8], rounds: usize) -> RoundKeys {
    let k = key.len() / 8;
    let words = word_bytes_le(key);
    let me: Vec<u32> = words.iter().step_by(2).copied().collect();
    let mo: Vec<u32> = words.iter().skip(1).step_by(2).copied().collect();

    let mut sbox_words = Vec::with_capacity(k);
    for i in 0..k {
        let mut chunk = [0u8; 8];
        chunk.copy_from_slice(&key[8 * i..8 * i + 8]);
        sbox_words.push(u32::from_le_bytes(rs_encode(&chunk)));
    }
    sbox_words.reverse();

    let word_count = 2 * (rounds + 4);
    let mut round_words = Vec::with_capacity(word_count);
    for i in 0..(rounds + 4) {
        let a = h((2 * i as u32).wrapping_mul(RHO), &me);
        let b = h(((2 * i + 1) as u32).wrapping_mul(RHO), &mo).rotate_left(8);
        let k0 = a.wrapping_add(b);
        let k1 = a.wrapping_add(b.wrapping_mul(2)).rotate_left(9);
        round_words.push(k0);
        round_words.push(k1);
    }

    RoundKeys { words: round_words, sbox_words }
}

/// Extended (KDF-driven) key expansion, directly parsed as schedule words.
pub fn expand_extended(
    kind: &KeyScheduleKind,
    key: &[u8],
    info: Option<&[u8]>,
    rounds: usize,
) -> Result<RoundKeys, Error> {
    let k = key.len() / 8;
    let word_count = 2 * (rounds + 4);
    let out_len = (word_count + k) * 4;
    let info = info.unwrap_or(DEFAULT_INFO);
    let mut out = vec![0u8; out_len];

    match kind {
        KeyScheduleKind::Standard => unreachable!("expand_extended is never called for Standard"),
        KeyScheduleKind::Hkdf(HkdfDigest::Sha256) => {
            let hk = Hkdf::<Sha256>::new(None, key);
            hk.expand(info, &mut out)
                .map_err(|_| Error::InvalidKeySize { cipher: "THX", actual: key.len() })?;
        }
        KeyScheduleKind::Hkdf(HkdfDigest::Sha512) => {
            let hk = Hkdf::<Sha512>::new(None, key);
            hk.expand(info, &mut out)
                .map_err(|_| Error::InvalidKeySize { cipher: "THX", actual: key.len() })?;
        }
        KeyScheduleKind::CShake(CShakeStrength::Cs128) => {
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
    }

    let all_words = word_bytes_le(&out);
    let (round_words, sbox_words) = all_words.split_at(word_count);
    Ok(RoundKeys {
        words: round_words.to_vec(),
        sbox_words: sbox_words.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_expansion_produces_correct_word_count() {
        let rk = expand_standard(&[0u8; 16], 16);
        assert_eq!(rk.words.len(), 40);
        assert_eq!(rk.sbox_words.len(), 2);
    }

    #[test]
    fn extended_expansion_is_deterministic() {
        let key = [0x7au8; 32];
        let a = expand_extended(&KeyScheduleKind::Hkdf(HkdfDigest::Sha256), &key, None, 16).unwrap();
        let b = expand_extended(&KeyScheduleKind::Hkdf(HkdfDigest::Sha256), &key, None, 16).unwrap();
        assert_eq!(a.words, b.words);
        assert_eq!(a.sbox_words, b.sbox_words);
    }
}
