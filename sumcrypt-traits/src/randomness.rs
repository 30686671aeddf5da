use crate::Error;
use rug::rand::{ThreadRandGen, ThreadRandState};

/// A cryptographically secure source of randomness.
pub trait SecureRng: rand_core::RngCore + rand_core::CryptoRng {}

impl<R: rand_core::RngCore + rand_core::CryptoRng> SecureRng for R {}

/// General RNG that can be used for all dependencies.
///
/// Bytes are drawn through `try_fill_bytes`, so a failing source never panics. Instead the first
/// failure is remembered and reported by [`GeneralRng::check`], which every sampling routine calls
/// after drawing.
pub struct GeneralRng<R: SecureRng> {
    rng_wrapper: RngWrapper<R>,
}

impl<R: SecureRng> GeneralRng<R> {
    /// Creates a new `GeneralRng` based on an RNG that implements both `RngCore` and `CryptoRng` to
    /// ensure that the underlying RNG is indeed cryptographically secure.
    pub fn new(rng: R) -> Self {
        GeneralRng {
            rng_wrapper: RngWrapper { rng, error: None },
        }
    }

    /// Exposes the underlying RNG.
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng_wrapper.rng
    }

    /// Creates a RNG for the `rug` crate that is only suitable for a single thread.
    pub fn rug_rng(&mut self) -> ThreadRandState<'_> {
        ThreadRandState::new_custom(&mut self.rng_wrapper)
    }

    /// Returns the first failure of the underlying source since the last check, if any.
    pub fn check(&mut self) -> Result<(), Error> {
        match self.rng_wrapper.error.take() {
            Some(error) => Err(Error::Randomness(error)),
            None => Ok(()),
        }
    }
}

struct RngWrapper<R: SecureRng> {
    rng: R,
    error: Option<rand_core::Error>,
}

impl<R: SecureRng> ThreadRandGen for RngWrapper<R> {
    fn gen(&mut self) -> u32 {
        // Once the source has failed, stop touching it until the failure is collected.
        if self.error.is_some() {
            return 0;
        }

        let mut bytes = [0u8; 4];
        match self.rng.try_fill_bytes(&mut bytes) {
            Ok(()) => u32::from_le_bytes(bytes),
            Err(error) => {
                self.error = Some(error);
                0
            }
        }
    }
}
