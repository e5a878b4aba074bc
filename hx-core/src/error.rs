//! Error taxonomy shared by every crate in the workspace.
//!
//! Every fallible operation in the HX ciphers returns one of these variants;
//! nothing is retried internally and nothing is swallowed (see spec §7 of the
//! design notes carried in `DESIGN.md`). The single exception is the counter
//! DRBG's scheduled reseed, which is not a retry of a failed call but a
//! policy-driven event of its own.

use thiserror::Error;

/// Errors produced by the HX block ciphers, cipher modes, padding schemes,
/// parallel scheduler, and counter DRBG.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A key was supplied whose length is not in the cipher's legal key-size set.
    #[error("invalid key size: {actual} bytes is not a legal key size for {cipher}")]
    InvalidKeySize {
        /// Cipher or KDF name reporting the error.
        cipher: &'static str,
        /// Length actually supplied.
        actual: usize,
    },

    /// An IV/nonce/counter was supplied with the wrong length.
    #[error("invalid IV size: expected {expected} bytes, got {actual}")]
    InvalidIvSize {
        /// Length required by the mode.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A round count outside the cipher's legal round set was requested.
    #[error("invalid round count: {actual} is not a legal round count for {cipher}")]
    InvalidRounds {
        /// Cipher name reporting the error.
        cipher: &'static str,
        /// Round count actually requested.
        actual: usize,
    },

    /// An operation was attempted on a cipher, mode, or DRBG before `initialize`.
    #[error("{0} used before initialization")]
    NotInitialized(&'static str),

    /// A caller-supplied buffer is shorter than the operation requires.
    #[error("buffer too short: need at least {needed} bytes, got {actual}")]
    BufferTooShort {
        /// Minimum length required.
        needed: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A caller-supplied buffer length is not a multiple of the required alignment.
    #[error("buffer misaligned: length {actual} is not a multiple of {alignment}")]
    BufferMisaligned {
        /// Required alignment (normally the cipher's block size).
        alignment: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The user-configured parallel block size is out of range or misaligned.
    #[error(
        "invalid parallel block size {actual}: must be a multiple of {required_multiple} \
         within [{min}, {max}]"
    )]
    ParallelBlockSizeInvalid {
        /// Value the caller attempted to set.
        actual: usize,
        /// `block_size * worker_count` the value must be a multiple of.
        required_multiple: usize,
        /// Lower bound of the legal range.
        min: usize,
        /// Upper bound of the legal range.
        max: usize,
    },

    /// Padding could not be stripped: the trailing bytes do not form a valid
    /// encoding of the configured padding scheme.
    #[error("invalid padding")]
    InvalidPadding,

    /// The external entropy collaborator failed to produce bytes.
    #[error("entropy source failed: {0}")]
    EntropySourceFailed(String),

    /// A parallel worker task failed; this is the first error observed
    /// across the joined worker set (see spec §4.5 "Cancellation").
    #[error("parallel worker failed: {0}")]
    WorkerFailed(String),
}
