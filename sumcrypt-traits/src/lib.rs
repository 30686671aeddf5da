#![warn(missing_docs, unused_imports)]

//! _This is a part of **sumcrypt**. For more information, head to the
//! [sumcrypt](https://crates.io/crates/sumcrypt) crate homepage._
//!
//! General traits for additively homomorphic cryptosystems, together with the randomness,
//! security-level and error types that every sumcrypt crate shares.

/// Random number generation that is consistent with the dependencies' requirements.
pub mod randomness;

/// Concepts expressing the security level or setting of a given primitive or protocol.
pub mod security;

/// General notion of a cryptosystem
pub mod cryptosystems;

/// Homomorphic operations on ciphertexts, including operator overloading.
pub mod homomorphic;

mod error;

pub use error::Error;
