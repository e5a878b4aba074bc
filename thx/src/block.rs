//! The Twofish Feistel round function over two 32-bit halves per side, with
//! PHT mixing and 1-bit rotations (spec §4.2).

use crate::schedule::{g, RoundKeys};

fn load_words(input: &[u8; 16]) -> (u32, u32, u32, u32) {
    let w = |i: usize| {
        u32::from_le_bytes([input[4 * i], input[4 * i + 1], input[4 * i + 2], input[4 * i + 3]])
    };
    (w(0), w(1), w(2), w(3))
}

fn store_words(x0: u32, x1: u32, x2: u32, x3: u32) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..4].copy_from_slice(&x0.to_le_bytes());
    out[4..8].copy_from_slice(&x1.to_le_bytes());
    out[8..12].copy_from_slice(&x2.to_le_bytes());
    out[12..16].copy_from_slice(&x3.to_le_bytes());
    out
}

/// Encrypts one 16-byte block with the given schedule.
pub fn encrypt(input: &[u8; 16], keys: &RoundKeys) -> [u8; 16] {
    let rounds = keys.words.len() / 2 - 4;
    let (w0, w1, w2, w3) = load_words(input);

    let mut x0 = w0 ^ keys.words[0];
    let mut x1 = w1 ^ keys.words[1];
    let mut x2 = w2 ^ keys.words[2];
    let mut x3 = w3 ^ keys.words[3];

    for r in 0..rounds {
        let t0 = g(x0, &keys.sbox_words);
        let t1 = g(x1.rotate_left(8), &keys.sbox_words);
        let f0 = t0.wrapping_add(t1);
        let f1 = t0.wrapping_add(t1.wrapping_mul(2));

        let new2 = (x2 ^ f0.wrapping_add(keys.words[2 * r + 8])).rotate_right(1);
        let new3 = x3.rotate_left(1) ^ f1.wrapping_add(keys.words[2 * r + 9]);

        if r != rounds - 1 {
            let (old0, old1) = (x0, x1);
            x0 = new2;
            x1 = new3;
            x2 = old0;
            x3 = old1;
        } else {
            x2 = new2;
            x3 = new3;
        }
    }

    store_words(
        x0 ^ keys.words[4],
        x1 ^ keys.words[5],
        x2 ^ keys.words[6],
        x3 ^ keys.words[7],
    )
}

/// Decrypts one 16-byte block with the same schedule used to encrypt it.
pub fn decrypt(input: &[u8; 16], keys: &RoundKeys) -> [u8; 16] {
    let rounds = keys.words.len() / 2 - 4;
    let (w0, w1, w2, w3) = load_words(input);

    let mut x0 = w0 ^ keys.words[4];
    let mut x1 = w1 ^ keys.words[5];
    let mut x2 = w2 ^ keys.words[6];
    let mut x3 = w3 ^ keys.words[7];

    for r in (0..rounds).rev() {
        let is_last = r == rounds - 1;
        let (gin0, gin1) = if is_last { (x0, x1) } else { (x2, x3) };
        let t0 = g(gin0, &keys.sbox_words);
        let t1 = g(gin1.rotate_left(8), &keys.sbox_words);
        let f0 = t0.wrapping_add(t1);
        let f1 = t0.wrapping_add(t1.wrapping_mul(2));

        if is_last {
            let new2 = x2.rotate_left(1) ^ f0.wrapping_add(keys.words[2 * r + 8]);
            let new3 = (x3 ^ f1.wrapping_add(keys.words[2 * r + 9])).rotate_right(1);
            x2 = new2;
            x3 = new3;
        } else {
            let new2 = x0.rotate_left(1) ^ f0.wrapping_add(keys.words[2 * r + 8]);
            let new3 = (x1 ^ f1.wrapping_add(keys.words[2 * r + 9])).rotate_right(1);
            x0 = x2;
            x1 = x3;
            x2 = new2;
            x3 = new3;
        }
    }

    store_words(
        x0 ^ keys.words[0],
        x1 ^ keys.words[1],
        x2 ^ keys.words[2],
        x3 ^ keys.words[3],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::expand_standard;

    #[test]
    fn encrypt_then_decrypt_recovers_plaintext() {
        let key = [0x13u8; 16];
        let rk = expand_standard(&key, 16);
        let pt = [0x42u8; 16];
        let ct = encrypt(&pt, &rk);
        assert_ne!(ct, pt);
        assert_eq!(decrypt(&ct, &rk), pt);
    }

    #[test]
    fn round_trip_holds_for_every_legal_round_count() {
        let key = [0x77u8; 32];
        let pt = [0x05u8; 16];
        for &rounds in &crate::schedule::ROUNDS {
            let rk = expand_standard(&key, rounds);
            let ct = encrypt(&pt, &rk);
            assert_eq!(decrypt(&ct, &rk), pt, "round-trip failed at {rounds} rounds");
        }
    }

    #[test]
    fn zero_key_zero_block_round_trips() {
        let rk = expand_standard(&[0u8; 24], 20);
        let pt = [0u8; 16];
        let ct = encrypt(&pt, &rk);
        assert_eq!(decrypt(&ct, &rk), pt);
    }
}
