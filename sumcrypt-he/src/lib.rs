#![warn(missing_docs, unused_imports)]

//! _This is a part of **sumcrypt**. For more information, head to the
//! [sumcrypt](https://crates.io/crates/sumcrypt) crate homepage._
//!
//! Additively homomorphic cryptosystems.

/// Partially homomorphic cryptosystems with one key.
pub mod cryptosystems;

pub use sumcrypt_traits;
