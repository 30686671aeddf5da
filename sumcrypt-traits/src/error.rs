/// Everything that can go wrong while generating keys, encrypting, decrypting or combining
/// ciphertexts. Errors are always returned to the caller; nothing is retried at this level.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested parameters are unusable, e.g. a modulus below the minimum bit length.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The injected entropy source reported a failure.
    #[error("entropy source failed")]
    Randomness(#[from] rand_core::Error),

    /// No acceptable prime pair was found within the configured number of attempts.
    #[error("no acceptable prime pair found after {attempts} attempts")]
    PrimeSelectionExhausted {
        /// The attempt bound that was hit.
        attempts: u32,
    },

    /// The plaintext is negative or not smaller than the modulus `n`.
    #[error("plaintext must lie in [0, n)")]
    PlaintextOutOfRange,

    /// The ciphertext is negative or not smaller than `n^2`.
    #[error("ciphertext must lie in [0, n^2)")]
    CiphertextOutOfRange,

    /// An explicitly supplied blinding factor is not an element of `Z*_n`.
    #[error("blinding factor must be a unit modulo n")]
    InvalidNonce,

    /// A required modular inverse does not exist. During precomputation this means the key
    /// material is corrupted and unusable, or that no random generator with an invertible
    /// `L(g^λ)` was found within the attempt bound. From scalar multiplication by a negative
    /// scalar it means the ciphertext is not a unit modulo `n^2`.
    #[error("modular inverse does not exist")]
    NotInvertible,
}
