#![doc = include_str!("../README.md")]
#![warn(missing_docs, unused_imports)]

pub use sumcrypt_he::cryptosystems;
pub use sumcrypt_numbertheory;
pub use sumcrypt_traits;
