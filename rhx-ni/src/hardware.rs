//! AES-NI round functions. Callers are responsible for verifying the `aes`
//! target feature is present before invoking these; each function is marked
//! `unsafe` and `#[target_feature(enable = "aes")]` accordingly.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
pub unsafe fn encrypt_block(input: &[u8; 16], round_keys: &[[u8; 16]]) -> [u8; 16] {
    let rounds = round_keys.len() - 1;
    let mut state = _mm_loadu_si128(input.as_ptr().cast());
    state = _mm_xor_si128(state, _mm_loadu_si128(round_keys[0].as_ptr().cast()));
    for rk in &round_keys[1..rounds] {
        state = _mm_aesenc_si128(state, _mm_loadu_si128(rk.as_ptr().cast()));
    }
    state = _mm_aesenclast_si128(state, _mm_loadu_si128(round_keys[rounds].as_ptr().cast()));
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), state);
    out
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
pub unsafe fn decrypt_block(input: &[u8; 16], decrypt_round_keys: &[[u8; 16]]) -> [u8; 16] {
    let rounds = decrypt_round_keys.len() - 1;
    let mut state = _mm_loadu_si128(input.as_ptr().cast());
    state = _mm_xor_si128(state, _mm_loadu_si128(decrypt_round_keys[rounds].as_ptr().cast()));
    for rk in decrypt_round_keys[1..rounds].iter().rev() {
        state = _mm_aesdec_si128(state, _mm_loadu_si128(rk.as_ptr().cast()));
    }
    state = _mm_aesdeclast_si128(state, _mm_loadu_si128(decrypt_round_keys[0].as_ptr().cast()));
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), state);
    out
}
