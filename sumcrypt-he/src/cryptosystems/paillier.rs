use once_cell::sync::OnceCell;
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::ops::Rem;
use sumcrypt_numbertheory::{gen_coprime, select_prime_pair};
use sumcrypt_traits::cryptosystems::{
    Associable, AsymmetricCryptosystem, DecryptionKey, EncryptionKey,
};
use sumcrypt_traits::homomorphic::HomomorphicAddition;
use sumcrypt_traits::randomness::GeneralRng;
use sumcrypt_traits::randomness::SecureRng;
use sumcrypt_traits::security::{BitsOfSecurity, MIN_MODULUS_BITS};
use sumcrypt_traits::Error;
use tracing::{debug, info, trace};

/// Default bound on the number of prime pairs (or random generators) that key generation samples
/// before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Strategy for choosing the public generator $g$.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Generator {
    /// $g = n + 1$, which needs no randomness and allows faster encryption.
    Simple,
    /// A random element of $\mathbb{Z}^*_{n^2}$ whose order is a multiple of $n$.
    Random,
}

impl Default for Generator {
    fn default() -> Self {
        Self::Simple
    }
}

/// The Paillier cryptosystem.
///
/// The configured size is the bit length of the modulus $n$. Both primes get exactly half of
/// those bits, so $n$ has exactly the configured bit length.
#[derive(Copy, Clone, Debug)]
pub struct Paillier {
    modulus_size: u32,
    max_attempts: u32,
    generator: Generator,
}

impl Paillier {
    /// Bounds the number of sampling attempts during key generation.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Selects how the public generator is chosen.
    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = generator;
        self
    }

    /// The bit length of generated moduli.
    pub fn modulus_size(&self) -> u32 {
        self.modulus_size
    }

    fn validate(&self) -> Result<(), Error> {
        if self.modulus_size < MIN_MODULUS_BITS {
            return Err(Error::InvalidParameters(format!(
                "a modulus of {} bits is below the minimum of {} bits",
                self.modulus_size, MIN_MODULUS_BITS
            )));
        }

        if self.modulus_size % 2 != 0 {
            return Err(Error::InvalidParameters(format!(
                "the modulus bit length must be even, got {}",
                self.modulus_size
            )));
        }

        if self.max_attempts == 0 {
            return Err(Error::InvalidParameters(
                "at least one sampling attempt is required".to_string(),
            ));
        }

        Ok(())
    }

    // Resamples g until L(g^λ mod n²) is invertible, at most `max_attempts` times.
    fn key_with_random_generator<R: SecureRng>(
        &self,
        n: Integer,
        n_squared: Integer,
        lambda: Integer,
        rng: &mut GeneralRng<R>,
    ) -> Result<PaillierSK, Error> {
        for attempt in 1..=self.max_attempts {
            let g = gen_coprime(&n_squared, rng)?;

            let secret_key = PaillierSK {
                public_key: PaillierPK {
                    n: n.clone(),
                    n_squared: n_squared.clone(),
                    g,
                },
                lambda: lambda.clone(),
                precomputed: Precomputed::default(),
            };

            let outcome = secret_key.precompute().map(|_| ());
            match outcome {
                Ok(()) => return Ok(secret_key),
                Err(Error::NotInvertible) => {
                    debug!(attempt, "order of random generator is not a multiple of n, resampling")
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::NotInvertible)
    }
}

/// Public key for the Paillier cryptosystem.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(try_from = "PublicKeyParts", into = "PublicKeyParts")]
pub struct PaillierPK {
    n: Integer,
    n_squared: Integer,
    g: Integer,
}

/// The serialized form of a [`PaillierPK`]. Only `n` and `g` are stored; `n^2` is recomputed and
/// the parts are validated again when reading a key back.
#[derive(Serialize, Deserialize)]
pub struct PublicKeyParts {
    n: Integer,
    g: Integer,
}

impl From<PaillierPK> for PublicKeyParts {
    fn from(public_key: PaillierPK) -> Self {
        PublicKeyParts {
            n: public_key.n,
            g: public_key.g,
        }
    }
}

impl TryFrom<PublicKeyParts> for PaillierPK {
    type Error = Error;

    fn try_from(parts: PublicKeyParts) -> Result<Self, Error> {
        PaillierPK::new(parts.n, parts.g)
    }
}

impl PaillierPK {
    /// Builds a public key from a modulus `n` and generator `g`. The modulus must be odd and
    /// larger than 2, and the generator must lie in $[1, n^2)$.
    pub fn new(n: Integer, g: Integer) -> Result<Self, Error> {
        if n < 3 || n.is_even() {
            return Err(Error::InvalidParameters(
                "the modulus must be an odd integer larger than 2".to_string(),
            ));
        }

        let n_squared = Integer::from(n.square_ref());

        if g < 1 || g >= n_squared {
            return Err(Error::InvalidParameters(
                "the generator must lie in [1, n^2)".to_string(),
            ));
        }

        Ok(PaillierPK { n, n_squared, g })
    }

    /// Public modulus $n$.
    pub fn n(&self) -> &Integer {
        &self.n
    }

    /// The ciphertext modulus $n^2$.
    pub fn n_squared(&self) -> &Integer {
        &self.n_squared
    }

    /// Public generator $g$.
    pub fn g(&self) -> &Integer {
        &self.g
    }

    /// Checks that a plaintext lies in $[0, n)$.
    pub fn validate_plaintext(&self, plaintext: &Integer) -> Result<(), Error> {
        if *plaintext < 0 || plaintext >= &self.n {
            return Err(Error::PlaintextOutOfRange);
        }

        Ok(())
    }

    /// Checks that a ciphertext lies in $[0, n^2)$.
    pub fn validate_ciphertext(&self, ciphertext: &PaillierCiphertext) -> Result<(), Error> {
        if ciphertext.c < 0 || ciphertext.c >= self.n_squared {
            return Err(Error::CiphertextOutOfRange);
        }

        Ok(())
    }

    /// Encrypts `plaintext` with an explicitly chosen blinding factor `nonce`, which must be a
    /// unit modulo $n$. The result is $g^m \cdot r^n \bmod n^2$.
    ///
    /// Reusing a nonce for different plaintexts breaks the semantic security of the scheme; prefer
    /// [`EncryptionKey::encrypt`] unless the nonce is known to be fresh.
    /// ```
    /// # use rug::Integer;
    /// # use sumcrypt_he::cryptosystems::paillier::PaillierPK;
    /// let public_key = PaillierPK::new(Integer::from(77), Integer::from(5652)).unwrap();
    /// let ciphertext = public_key
    ///     .encrypt_with_nonce(&Integer::from(42), &Integer::from(23))
    ///     .unwrap();
    /// assert_eq!(ciphertext.c, 4624);
    /// ```
    pub fn encrypt_with_nonce(
        &self,
        plaintext: &Integer,
        nonce: &Integer,
    ) -> Result<PaillierCiphertext, Error> {
        self.validate_plaintext(plaintext)?;

        if *nonce <= 0 || nonce >= &self.n || Integer::from(nonce.gcd_ref(&self.n)) != 1 {
            return Err(Error::InvalidNonce);
        }

        let first = if self.has_simple_generator() {
            // (n + 1)^m = 1 + m * n (mod n^2)
            (Integer::from(plaintext * &self.n) + 1i32).rem(&self.n_squared)
        } else {
            pow_mod(&self.g, plaintext, &self.n_squared)?
        };
        let second = pow_mod(nonce, &self.n, &self.n_squared)?;

        Ok(PaillierCiphertext {
            c: (first * second).rem(&self.n_squared),
        })
    }

    fn has_simple_generator(&self) -> bool {
        Integer::from(&self.g - &self.n) == 1
    }
}

/// Decryption key for the Paillier cryptosystem. It contains its public key, which is available
/// through [`DecryptionKey::public_key`].
pub struct PaillierSK {
    public_key: PaillierPK,
    lambda: Integer,
    precomputed: Precomputed,
}

/// Values derived from the secret key that speed up decryption. They are computed at most once.
#[derive(Default)]
struct Precomputed {
    mu: OnceCell<Integer>,
}

impl PaillierSK {
    /// Builds a secret key from its public key and $\lambda = \mathrm{lcm}(p - 1, q - 1)$. The
    /// decryption accelerator is computed lazily, on the first decryption or an explicit call to
    /// [`PaillierSK::precompute`].
    pub fn from_parts(public_key: PaillierPK, lambda: Integer) -> Result<Self, Error> {
        if lambda < 1 {
            return Err(Error::InvalidParameters("lambda must be positive".to_string()));
        }

        Ok(PaillierSK {
            public_key,
            lambda,
            precomputed: Precomputed::default(),
        })
    }

    /// Computes $\mu = L(g^\lambda \bmod n^2)^{-1} \bmod n$ if that has not happened yet, and
    /// returns it. Concurrent callers all observe the same, fully computed value.
    ///
    /// Fails with [`Error::NotInvertible`] when the key material is corrupted.
    pub fn precompute(&self) -> Result<&Integer, Error> {
        self.precomputed.mu.get_or_try_init(|| {
            trace!("computing decryption accelerator");

            let public_key = &self.public_key;
            let u = Integer::from(
                public_key
                    .g
                    .secure_pow_mod_ref(&self.lambda, &public_key.n_squared),
            );

            l_function(u, &public_key.n)
                .invert(&public_key.n)
                .map_err(|_| Error::NotInvertible)
        })
    }

    /// Whether the decryption accelerator has been computed.
    pub fn is_precomputed(&self) -> bool {
        self.precomputed.mu.get().is_some()
    }
}

/// Ciphertext of the Paillier cryptosystem, which is additively homomorphic.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct PaillierCiphertext {
    /// Encrypted message (Ciphertext)
    pub c: Integer,
}

impl Associable<PaillierPK> for PaillierCiphertext {}

impl AsymmetricCryptosystem for Paillier {
    type PublicKey = PaillierPK;
    type SecretKey = PaillierSK;

    fn setup(security_param: &BitsOfSecurity) -> Self {
        Paillier {
            modulus_size: security_param.to_public_key_bit_length(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            generator: Generator::default(),
        }
    }

    /// Generates a fresh Paillier keypair. The secret key is returned fully precomputed.
    /// ```
    /// # use sumcrypt_traits::randomness::GeneralRng;
    /// # use sumcrypt_he::cryptosystems::paillier::Paillier;
    /// # use sumcrypt_traits::security::BitsOfSecurity;
    /// # use sumcrypt_traits::cryptosystems::AsymmetricCryptosystem;
    /// # use rand_core::OsRng;
    /// let mut rng = GeneralRng::new(OsRng);
    /// let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// ```
    fn generate_keys<R: SecureRng>(
        &self,
        rng: &mut GeneralRng<R>,
    ) -> Result<(PaillierPK, PaillierSK), Error> {
        self.validate()?;

        let (p, q) = select_prime_pair(self.modulus_size / 2, self.max_attempts, rng)?;

        let n = Integer::from(&p * &q);
        let n_squared = Integer::from(n.square_ref());

        let lambda = carmichael(p, q);

        let secret_key = match self.generator {
            Generator::Simple => {
                let g = Integer::from(&n + 1);
                let secret_key = PaillierSK {
                    public_key: PaillierPK { n, n_squared, g },
                    lambda,
                    precomputed: Precomputed::default(),
                };
                secret_key.precompute()?;
                secret_key
            }
            Generator::Random => self.key_with_random_generator(n, n_squared, lambda, rng)?,
        };

        info!(
            modulus_bits = secret_key.public_key.n.significant_bits(),
            generator = ?self.generator,
            "generated Paillier key pair"
        );

        Ok((secret_key.public_key.clone(), secret_key))
    }
}

impl EncryptionKey for PaillierPK {
    type Input = Integer;
    type Plaintext = Integer;
    type Ciphertext = PaillierCiphertext;

    /// Encrypts a plaintext integer using the Paillier public key. Every call draws a fresh
    /// blinding factor, so encrypting the same plaintext twice gives different ciphertexts.
    /// ```
    /// # use sumcrypt_traits::randomness::GeneralRng;
    /// # use sumcrypt_he::cryptosystems::paillier::Paillier;
    /// # use sumcrypt_traits::security::BitsOfSecurity;
    /// # use sumcrypt_traits::cryptosystems::{AsymmetricCryptosystem, EncryptionKey};
    /// # use rug::Integer;
    /// # use rand_core::OsRng;
    /// # let mut rng = GeneralRng::new(OsRng);
    /// # let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// # let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// let ciphertext = public_key.encrypt(&Integer::from(5), &mut rng).unwrap();
    /// ```
    fn encrypt_raw<R: SecureRng>(
        &self,
        plaintext: &Integer,
        rng: &mut GeneralRng<R>,
    ) -> Result<PaillierCiphertext, Error> {
        self.validate_plaintext(plaintext)?;

        let r = gen_coprime(&self.n, rng)?;

        self.encrypt_with_nonce(plaintext, &r)
    }
}

impl DecryptionKey<PaillierPK> for PaillierSK {
    fn public_key(&self) -> &PaillierPK {
        &self.public_key
    }

    /// Decrypts a Paillier ciphertext using the secret key.
    /// ```
    /// # use sumcrypt_traits::randomness::GeneralRng;
    /// # use sumcrypt_he::cryptosystems::paillier::Paillier;
    /// # use sumcrypt_traits::security::BitsOfSecurity;
    /// # use sumcrypt_traits::cryptosystems::{AsymmetricCryptosystem, EncryptionKey, DecryptionKey};
    /// # use rug::Integer;
    /// # use rand_core::OsRng;
    /// # let mut rng = GeneralRng::new(OsRng);
    /// # let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// # let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// # let ciphertext = public_key.encrypt(&Integer::from(5), &mut rng).unwrap();
    /// println!("The decrypted message is {}", secret_key.decrypt(&ciphertext).unwrap());
    /// // Prints: "The decrypted message is 5".
    /// ```
    fn decrypt_raw(&self, ciphertext: &PaillierCiphertext) -> Result<Integer, Error> {
        let public_key = &self.public_key;
        public_key.validate_ciphertext(ciphertext)?;

        let mu = self.precompute()?;

        let u = Integer::from(
            ciphertext
                .c
                .secure_pow_mod_ref(&self.lambda, &public_key.n_squared),
        );
        let mut inner = l_function(u, &public_key.n);
        inner *= mu;

        Ok(inner.rem(&public_key.n))
    }
}

impl HomomorphicAddition for PaillierPK {
    fn add(
        &self,
        ciphertext_a: &PaillierCiphertext,
        ciphertext_b: &PaillierCiphertext,
    ) -> Result<PaillierCiphertext, Error> {
        self.validate_ciphertext(ciphertext_a)?;
        self.validate_ciphertext(ciphertext_b)?;

        Ok(PaillierCiphertext {
            c: Integer::from(&ciphertext_a.c * &ciphertext_b.c).rem(&self.n_squared),
        })
    }

    /// Raises the ciphertext to the power `input` modulo $n^2$. A negative `input` negates the
    /// plaintext, which requires inverting the ciphertext: this fails with
    /// [`Error::NotInvertible`] when the ciphertext is in range but not a unit modulo $n^2$.
    fn mul(
        &self,
        ciphertext: &PaillierCiphertext,
        input: &Integer,
    ) -> Result<PaillierCiphertext, Error> {
        self.validate_ciphertext(ciphertext)?;

        Ok(PaillierCiphertext {
            c: pow_mod(&ciphertext.c, input, &self.n_squared)?,
        })
    }
}

/// Computes $\lambda(pq) = \mathrm{lcm}(p - 1, q - 1)$ for distinct primes $p$ and $q$.
fn carmichael(p: Integer, q: Integer) -> Integer {
    let p_minus_1: Integer = p - 1;
    let q_minus_1 = q - 1;

    // phi(n) = gcd(p - 1, q - 1) * lcm(p - 1, q - 1), so dividing by the gcd is exact
    let phi = Integer::from(&p_minus_1 * &q_minus_1);
    let gcd = Integer::from(p_minus_1.gcd_ref(&q_minus_1));

    phi / gcd
}

/// $L(u) = (u - 1) / n$
fn l_function(mut u: Integer, n: &Integer) -> Integer {
    u -= 1;
    u /= n;
    u
}

// A negative exponent needs the inverse of the base, which may not exist.
fn pow_mod(base: &Integer, exponent: &Integer, modulus: &Integer) -> Result<Integer, Error> {
    base.pow_mod_ref(exponent, modulus)
        .map(Integer::from)
        .ok_or(Error::NotInvertible)
}
