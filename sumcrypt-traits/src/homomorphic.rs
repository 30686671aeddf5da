use std::ops::{Add, Mul};

use crate::cryptosystems::{Associable, AssociatedCiphertext, EncryptionKey};
use crate::Error;

/// Cryptosystems whose ciphertexts can be combined into a ciphertext of the sum of their
/// plaintexts, without decrypting.
pub trait HomomorphicAddition: EncryptionKey {
    /// Combines two ciphertexts into an encryption of the sum of their plaintexts.
    fn add(
        &self,
        ciphertext_a: &Self::Ciphertext,
        ciphertext_b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, Error>;

    /// Multiplies the plaintext inside `ciphertext` by the scalar `input`.
    fn mul(
        &self,
        ciphertext: &Self::Ciphertext,
        input: &Self::Input,
    ) -> Result<Self::Ciphertext, Error>;
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition> Add
    for AssociatedCiphertext<'pk, C, PK>
{
    type Output = Result<AssociatedCiphertext<'pk, C, PK>, Error>;

    fn add(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.public_key, rhs.public_key);
        Ok(self
            .public_key
            .add(&self.ciphertext, &rhs.ciphertext)?
            .associate(self.public_key))
    }
}

impl<'pk, I, C: Associable<PK>, PK: EncryptionKey<Input = I, Ciphertext = C> + HomomorphicAddition>
    Mul<I> for AssociatedCiphertext<'pk, C, PK>
{
    type Output = Result<AssociatedCiphertext<'pk, C, PK>, Error>;

    fn mul(self, rhs: I) -> Self::Output {
        Ok(self
            .public_key
            .mul(&self.ciphertext, &rhs)?
            .associate(self.public_key))
    }
}
