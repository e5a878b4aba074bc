//! Shared vocabulary for the HX symmetric-cipher workspace: the
//! [`BlockCipher`], [`CipherMode`], and [`Padding`] traits, the [`Error`]
//! taxonomy, and the [`KeyBundle`]/[`CipherDirection`] types that flow
//! between them.
//!
//! This crate is pure plumbing; see `rhx`, `shx`, `thx` for the ciphers,
//! `cbc-mode`/`cfb-mode`/`ctr-mode`/`ofb-mode` for the modes, `hx-padding`
//! for padding, `hx-parallel` for the fork-join scheduler, `ctr-drbg` for the
//! counter DRBG, `hx-stream` for the streaming driver, and `hx` for the
//! top-level factories tying all of the above together.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]

pub mod block_cipher;
mod direction;
mod error;
mod key;
pub mod mode;
pub mod padding;

pub use block_cipher::BlockCipher;
pub use direction::CipherDirection;
pub use error::Error;
pub use key::KeyBundle;
pub use mode::{CipherMode, ParallelOptions};
pub use padding::Padding;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bundle_builder_roundtrip() {
        let bundle = KeyBundle::new(vec![0u8; 32])
            .with_iv(vec![1u8; 16])
            .with_info(vec![2u8; 8]);
        assert_eq!(bundle.key().len(), 32);
        assert_eq!(bundle.iv(), Some(&[1u8; 16][..]));
        assert_eq!(bundle.info(), Some(&[2u8; 8][..]));
    }

    #[test]
    fn parallel_options_validate_rejects_misalignment() {
        let opts = ParallelOptions {
            is_parallel: true,
            degree: 4,
            parallel_block_size: 100,
        };
        assert!(opts.validate(16).is_err());
    }

    #[test]
    fn parallel_options_validate_accepts_default() {
        let opts = ParallelOptions::with_degree(4);
        assert!(opts.validate(16).is_ok());
    }

    #[test]
    fn direction_is_encryption() {
        assert!(CipherDirection::Encrypt.is_encryption());
        assert!(!CipherDirection::Decrypt.is_encryption());
    }
}
