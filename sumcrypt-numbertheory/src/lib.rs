#![warn(missing_docs, unused_imports)]

//! _This is a part of **sumcrypt**. For more information, head to the
//! [sumcrypt](https://crates.io/crates/sumcrypt) crate homepage._
//!
//! Number theoretic algorithms: random prime generation, selection of prime pairs suitable for a
//! Paillier modulus, and sampling of units modulo an integer.

use rug::Integer;
use sumcrypt_traits::randomness::{GeneralRng, SecureRng};
use sumcrypt_traits::Error;
use tracing::debug;

/// The smallest prime size, in bits, that [`gen_prime`] and [`select_prime_pair`] accept.
pub const MIN_PRIME_BITS: u32 = 8;

fn check_prime_bits(bit_length: u32) -> Result<(), Error> {
    if bit_length < MIN_PRIME_BITS {
        return Err(Error::InvalidParameters(format!(
            "primes of {} bits are below the minimum of {} bits",
            bit_length, MIN_PRIME_BITS
        )));
    }

    Ok(())
}

// Returns `None` when the search ran past 2^bit_length.
fn draw_prime<R: SecureRng>(
    bit_length: u32,
    rng: &mut GeneralRng<R>,
) -> Result<Option<Integer>, Error> {
    let mut candidate = Integer::from(Integer::random_bits(bit_length, &mut rng.rug_rng()));
    rng.check()?;

    candidate
        .set_bit(bit_length - 1, true)
        .set_bit(bit_length - 2, true)
        .set_bit(0, true);

    let prime = candidate.next_prime();
    if prime.significant_bits() == bit_length {
        Ok(Some(prime))
    } else {
        Ok(None)
    }
}

/// Generates a random prime number of exactly `bit_length` bits, of which the two most significant
/// bits are always 1. The product of two such primes therefore has exactly `2 * bit_length` bits.
///
/// A random odd starting point is drawn and the next prime above it is returned, so the result is
/// not uniform: primes that follow a large prime gap are more likely. When the search runs past
/// $2^{bit\_length}$ a new starting point is drawn. A source that keeps producing such starting
/// points makes this loop forever; [`select_prime_pair`] counts them as failed attempts instead.
///
/// Fails with [`Error::InvalidParameters`] when `bit_length` is below [`MIN_PRIME_BITS`].
pub fn gen_prime<R: SecureRng>(bit_length: u32, rng: &mut GeneralRng<R>) -> Result<Integer, Error> {
    check_prime_bits(bit_length)?;

    loop {
        if let Some(prime) = draw_prime(bit_length, rng)? {
            return Ok(prime);
        }
    }
}

/// Returns whether `p <= q` form an acceptable pair of primes for a Paillier modulus. The primes
/// must be distinct, and $p - 1$ must not divide $q$.
pub fn is_acceptable_pair(p: &Integer, q: &Integer) -> bool {
    if p == q {
        return false;
    }

    !q.is_divisible(&Integer::from(p - 1))
}

/// Selects two distinct random primes of `bit_length` bits each, ordered so that `p <= q`. Pairs
/// that are not acceptable according to [`is_acceptable_pair`], or where a prime search overshot
/// the bit length, are discarded entirely and sampled again, at most `max_attempts` times.
///
/// Fails with [`Error::InvalidParameters`] when `bit_length` is below [`MIN_PRIME_BITS`].
pub fn select_prime_pair<R: SecureRng>(
    bit_length: u32,
    max_attempts: u32,
    rng: &mut GeneralRng<R>,
) -> Result<(Integer, Integer), Error> {
    check_prime_bits(bit_length)?;

    select_pair_from(max_attempts, || draw_prime(bit_length, rng))
}

fn select_pair_from<F>(max_attempts: u32, mut draw: F) -> Result<(Integer, Integer), Error>
where
    F: FnMut() -> Result<Option<Integer>, Error>,
{
    for attempt in 1..=max_attempts {
        let (first, second) = match (draw()?, draw()?) {
            (Some(first), Some(second)) => (first, second),
            _ => {
                debug!(attempt, "prime search overshot the bit length, resampling");
                continue;
            }
        };

        let (p, q) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };

        if is_acceptable_pair(&p, &q) {
            return Ok((p, q));
        }

        debug!(attempt, "rejected prime pair, resampling");
    }

    Err(Error::PrimeSelectionExhausted {
        attempts: max_attempts,
    })
}

/// Generates a uniformly random coprime $x$ to the `other` integer $y$, with $0 \leq x < y$. This
/// means that $\gcd(x, y) = 1$.
pub fn gen_coprime<R: SecureRng>(other: &Integer, rng: &mut GeneralRng<R>) -> Result<Integer, Error> {
    loop {
        let candidate = Integer::from(other.random_below_ref(&mut rng.rug_rng()));
        rng.check()?;

        if Integer::from(candidate.gcd_ref(other)) == 1 {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        gen_coprime, gen_prime, is_acceptable_pair, select_pair_from, select_prime_pair,
        MIN_PRIME_BITS,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_core::{CryptoRng, OsRng, RngCore};
    use rug::integer::IsPrime;
    use rug::Integer;
    use sumcrypt_traits::randomness::GeneralRng;
    use sumcrypt_traits::Error;

    /// Always yields zero bytes, so every prime drawn from it is the same.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.iter_mut().for_each(|b| *b = 0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.iter_mut().for_each(|b| *b = 0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for BrokenRng {}

    fn assert_primality_100_000_factors(integer: &Integer) {
        let (_, hi) = primal::estimate_nth_prime(100_000);
        for prime in primal::Sieve::new(hi as usize).primes_from(0) {
            assert!(
                !integer.is_divisible_u(prime as u32),
                "{} is divisible by {}",
                integer,
                prime
            );
        }
    }

    #[test]
    fn test_gen_prime_for_factors() {
        let mut rng = GeneralRng::new(OsRng);
        let generated_prime = gen_prime(256, &mut rng).unwrap();

        assert_primality_100_000_factors(&generated_prime);
        assert_ne!(generated_prime.is_probably_prime(30), IsPrime::No);
    }

    #[test]
    fn test_gen_prime_has_exact_size() {
        let mut rng = GeneralRng::new(OsRng);

        for bit_length in [64u32, 127, 128, 256].iter() {
            let prime = gen_prime(*bit_length, &mut rng).unwrap();

            assert_eq!(prime.significant_bits(), *bit_length);
            assert!(prime.get_bit(bit_length - 2));
        }
    }

    #[test]
    fn test_acceptable_pairs() {
        assert!(is_acceptable_pair(&Integer::from(5), &Integer::from(7)));
        assert!(is_acceptable_pair(&Integer::from(7), &Integer::from(11)));
    }

    #[test]
    fn test_equal_primes_are_rejected() {
        assert!(!is_acceptable_pair(&Integer::from(7), &Integer::from(7)));
    }

    #[test]
    fn test_p_minus_one_dividing_q_is_rejected() {
        // 2 - 1 divides every q
        assert!(!is_acceptable_pair(&Integer::from(2), &Integer::from(3)));
    }

    #[test]
    fn test_select_prime_pair_is_ordered_and_distinct() {
        let mut rng = GeneralRng::new(OsRng);
        let (p, q) = select_prime_pair(256, 100, &mut rng).unwrap();

        assert!(p < q);
        assert_eq!(p.significant_bits(), 256);
        assert_eq!(q.significant_bits(), 256);

        let n = Integer::from(&p * &q);
        assert_eq!(n.significant_bits(), 512);
    }

    #[test]
    fn test_select_prime_pair_is_reproducible() {
        let mut rng_a = GeneralRng::new(StdRng::seed_from_u64(7));
        let mut rng_b = GeneralRng::new(StdRng::seed_from_u64(7));

        let pair_a = select_prime_pair(128, 100, &mut rng_a).unwrap();
        let pair_b = select_prime_pair(128, 100, &mut rng_b).unwrap();

        assert_eq!(pair_a, pair_b);
    }

    #[test]
    fn test_degenerate_source_exhausts_attempts() {
        let mut rng = GeneralRng::new(ZeroRng);

        match select_prime_pair(128, 3, &mut rng) {
            Err(Error::PrimeSelectionExhausted { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_source_is_reported() {
        let mut rng = GeneralRng::new(BrokenRng);

        assert!(matches!(
            select_prime_pair(128, 3, &mut rng),
            Err(Error::Randomness(_))
        ));
    }

    #[test]
    fn test_small_bit_lengths_are_rejected() {
        let mut rng = GeneralRng::new(OsRng);

        for bit_length in [0u32, 1, 2, MIN_PRIME_BITS - 1].iter() {
            assert!(matches!(
                select_prime_pair(*bit_length, 10, &mut rng),
                Err(Error::InvalidParameters(_))
            ));
            assert!(matches!(
                gen_prime(*bit_length, &mut rng),
                Err(Error::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_smallest_bit_length_is_accepted() {
        let mut rng = GeneralRng::new(OsRng);
        let (p, q) = select_prime_pair(MIN_PRIME_BITS, 1000, &mut rng).unwrap();

        assert!(p < q);
        assert_eq!(p.significant_bits(), MIN_PRIME_BITS);
        assert_eq!(q.significant_bits(), MIN_PRIME_BITS);
    }

    fn scripted(draws: &[Option<i32>]) -> impl FnMut() -> Result<Option<Integer>, Error> {
        let mut draws = draws
            .iter()
            .map(|draw| draw.map(Integer::from))
            .collect::<Vec<_>>()
            .into_iter();

        move || Ok(draws.next().expect("script ran out of draws"))
    }

    #[test]
    fn test_rejected_pairs_are_resampled() {
        // equal primes, then 2 - 1 dividing 3, then an overshoot, then an acceptable pair
        let draws = [
            Some(7),
            Some(7),
            Some(2),
            Some(3),
            None,
            Some(5),
            Some(11),
            Some(5),
        ];

        let (p, q) = select_pair_from(10, scripted(&draws)).unwrap();

        assert_eq!(p, 5);
        assert_eq!(q, 11);
    }

    #[test]
    fn test_rejected_pairs_count_against_attempts() {
        let draws = [Some(7), Some(7), None, Some(5), Some(5), Some(11)];

        match select_pair_from(2, scripted(&draws)) {
            Err(Error::PrimeSelectionExhausted { attempts }) => assert_eq!(attempts, 2),
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_gen_coprime() {
        let mut rng = GeneralRng::new(OsRng);
        let modulus = Integer::from(77);

        for _ in 0..100 {
            let x = gen_coprime(&modulus, &mut rng).unwrap();
            assert!(x > 0 && x < modulus);
            assert_eq!(Integer::from(x.gcd_ref(&modulus)), 1);
        }
    }
}
