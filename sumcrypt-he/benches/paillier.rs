use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand_core::OsRng;
use rug::Integer;
use sumcrypt_he::cryptosystems::paillier::{Generator, Paillier};
use sumcrypt_traits::cryptosystems::{AsymmetricCryptosystem, DecryptionKey, EncryptionKey};
use sumcrypt_traits::homomorphic::HomomorphicAddition;
use sumcrypt_traits::randomness::GeneralRng;
use sumcrypt_traits::security::BitsOfSecurity;

fn paillier_benchmark_with(name: &str, generator: Generator, c: &mut Criterion) {
    // Ignore noise up to 5%
    let mut group = c.benchmark_group(name);
    group.noise_threshold(0.05);

    let mut rng = GeneralRng::new(OsRng);
    let paillier = Paillier::setup(&BitsOfSecurity::AES112).with_generator(generator);
    let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();

    let plaintext = Integer::from(123456789u64);

    group.bench_function("encrypt", |b| {
        b.iter(|| black_box(public_key.encrypt_raw(&plaintext, &mut rng)))
    });

    let ciphertext_a = public_key.encrypt_raw(&plaintext, &mut rng).unwrap();
    let ciphertext_b = public_key.encrypt_raw(&plaintext, &mut rng).unwrap();

    group.bench_function("decrypt", |b| {
        b.iter(|| black_box(secret_key.decrypt_raw(&ciphertext_a)))
    });

    group.bench_function("add", |b| {
        b.iter(|| black_box(public_key.add(&ciphertext_a, &ciphertext_b)))
    });

    group.finish();
}

fn paillier_benchmark(c: &mut Criterion) {
    paillier_benchmark_with("paillier_simple_generator", Generator::Simple, c);
    paillier_benchmark_with("paillier_random_generator", Generator::Random, c);
}

criterion_group!(paillier, paillier_benchmark);
criterion_main!(paillier);
