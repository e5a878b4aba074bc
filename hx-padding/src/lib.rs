//! Residual-block padding schemes (spec §4.7).
//!
//! Each scheme is a stateless, zero-sized [`hx_core::Padding`] implementor.
//! Strip verification loops over the full 16-byte block regardless of the
//! candidate pad length, so the number of matching pad bytes never shows up
//! as a timing signal; only the final accept/reject decision branches,
//! which is not itself secret (every caller needs to know whether stripping
//! succeeded).
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

mod iso7816;
mod pkcs7;
mod tbc;
mod x923;

pub use iso7816::Iso7816;
pub use pkcs7::Pkcs7;
pub use tbc::Tbc;
pub use x923::X923;
