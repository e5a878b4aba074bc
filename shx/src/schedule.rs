//! Serpent key schedule: standard phi-anchored expansion and an extended
//! HKDF/cSHAKE-driven path (spec §4.1).

use digest::{ExtendableOutput, Update, XofReader};
use hkdf::Hkdf;
use hx_core::Error;
use sha2::{Sha256, Sha512};
use sha3::{Shake128, Shake256};

use crate::sboxes::apply_sbox;

/// Golden-ratio constant used by the standard Serpent key schedule.
const PHI: u32 = 0x9E37_79B9;

/// Legal key sizes, in bytes, for both the standard and extended schedules.
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];
/// Legal round counts (spec §3: `{32..64 step 8}`).
pub const ROUNDS: [usize; 5] = [32, 40, 48, 56, 64];
/// Default round count.
pub const DEFAULT_ROUNDS: usize = 32;

/// Canonical extended-schedule `info` tag.
pub const DEFAULT_INFO: &[u8] = b"HX SHX INFO V1";

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
    /// The published phi-anchored schedule.
    Standard,
    /// HKDF-Extract-then-Expand over the given digest.
    Hkdf(HkdfDigest),
    /// SHAKE-based domain-separated expansion standing in for cSHAKE.
    CShake(CShakeStrength),
}

/// Pads `key` to 32 bytes with a single `1` bit followed by zero bits, the
/// way the published Serpent schedule pads keys shorter than 256 bits.
fn pad_key(key: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[..key.len()].copy_from_slice(key);
    if key.len() < 32 {
        padded[key.len()] = 0x01;
    }
    padded
}

fn words_le(bytes: &[u8; 32]) -> [u32; 8] {
    let mut words = [0u32; 8];
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        words[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

/// Produces `rounds + 1` round keys, each four 32-bit words (spec §3:
/// `4*(rounds+1)` of 32 bits), from the standard phi-anchored schedule.
pub fn expand_standard(key: &[u8], rounds: usize) -> Vec<[u32; 4]> {
    let padded = pad_key(key);
    let seed = words_le(&padded);

    let prekey_count = 4 * (rounds + 1);
    let mut w = vec![0u32; prekey_count];
    w[..8].copy_from_slice(&seed);
    for i in 8..prekey_count {
        w[i] = (w[i - 8] ^ w[i - 5] ^ w[i - 3] ^ w[i - 1] ^ PHI ^ (i as u32)).rotate_left(11);
    }

    w.chunks_exact(4)
        .enumerate()
        .map(|(j, chunk)| {
            let (o0, o1, o2, o3) = apply_sbox(j % 8, chunk[0], chunk[1], chunk[2], chunk[3]);
            [o0, o1, o2, o3]
        })
        .collect()
}

/// Extended (KDF-driven) key expansion, directly parsed as round-key words.
pub fn expand_extended(
    kind: &KeyScheduleKind,
    key: &[u8],
    info: Option<&[u8]>,
    rounds: usize,
) -> Result<Vec<[u32; 4]>, Error> {
    let out_len = (rounds + 1) * 16;
    let info = info.unwrap_or(DEFAULT_INFO);
    let mut out = vec![0u8; out_len];

    match kind {
        KeyScheduleKind::Standard => unreachable!("expand_extended is never called for Standard"),
        KeyScheduleKind::Hkdf(HkdfDigest::Sha256) => {
            let hk = Hkdf::<Sha256>::new(None, key);
            hk.expand(info, &mut out)
                .map_err(|_| Error::InvalidKeySize { cipher: "SHX", actual: key.len() })?;
        }
        KeyScheduleKind::Hkdf(HkdfDigest::Sha512) => {
            let hk = Hkdf::<Sha512>::new(None, key);
            hk.expand(info, &mut out)
                .map_err(|_| Error::InvalidKeySize { cipher: "SHX", actual: key.len() })?;
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

    Ok(out
        .chunks_exact(16)
        .map(|chunk| {
            let mut words = [0u32; 4];
            for (i, w) in chunk.chunks_exact(4).enumerate() {
                words[i] = u32::from_le_bytes([w[0], w[1], w[2], w[3]]);
            }
            words
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_expansion_produces_correct_round_key_count() {
        let rk = expand_standard(&[0u8; 16], 32);
        assert_eq!(rk.len(), 33);
    }

    #[test]
    fn extended_expansion_is_deterministic() {
        let key = [0x5au8; 32];
        let a = expand_extended(&KeyScheduleKind::Hkdf(HkdfDigest::Sha256), &key, None, 32).unwrap();
        let b = expand_extended(&KeyScheduleKind::Hkdf(HkdfDigest::Sha256), &key, None, 32).unwrap();
        assert_eq!(a, b);
    }
}
