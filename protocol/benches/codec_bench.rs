// Codec & signing benchmarks for the uPow transaction engine.
//
// Covers P-256 signing and verification, full encoding, decoding with and
// without signer grouping, and transaction hashing at various input counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use upow_protocol::crypto::{AddressFormat, PrivateKey};
use upow_protocol::transaction::{
    check_signatures, decode, decode_unchecked, Amount, MemoryResolver, OutputType, Transaction,
    TxInput, TxOutput,
};

const SIZES: [usize; 3] = [1, 16, 128];

/// A signed transaction spending `inputs` outputs owned by two keys, with
/// a resolver that knows the funding transaction.
fn signed_transaction(inputs: usize) -> (Transaction, MemoryResolver) {
    let keys = [PrivateKey::generate(), PrivateKey::generate()];
    let owner = |i: usize| &keys[i % keys.len()];
    let one = Amount::from_coins(1).unwrap();

    let funding = Transaction::builder()
        .outputs((0..inputs).map(|i| {
            TxOutput::from_public_key(
                &owner(i).public_key(),
                AddressFormat::Compressed,
                one,
                OutputType::Regular,
            )
        }))
        .build()
        .unwrap();
    let resolver = MemoryResolver::new();
    let funding_hash = resolver.insert(funding);

    let mut tx = Transaction::builder()
        .inputs((0..inputs).map(|i| {
            TxInput::from_hex_hash(&funding_hash, i as u8)
                .unwrap()
                .with_public_key(owner(i).public_key())
        }))
        .output(TxOutput::from_public_key(
            &keys[0].public_key(),
            AddressFormat::Compressed,
            one,
            OutputType::Regular,
        ))
        .message(b"bench".to_vec())
        .build()
        .unwrap();
    tx.sign(&keys).unwrap();
    (tx, resolver)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn bench_sign_message(c: &mut Criterion) {
    let key = PrivateKey::generate();
    let message = b"send 5 to Dbf1 with change to self";

    c.bench_function("p256/sign_message", |b| {
        b.iter(|| key.sign(message));
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let key = PrivateKey::generate();
    let message = b"send 5 to Dbf1 with change to self";
    let signature = key.sign(message);
    let public_key = key.public_key();

    c.bench_function("p256/verify_signature", |b| {
        b.iter(|| public_key.verify(message, &signature));
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/encode");
    for size in SIZES {
        let (tx, _) = signed_transaction(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tx, |b, tx| {
            b.iter(|| tx.to_hex(true));
        });
    }
    group.finish();
}

fn bench_decode_unchecked(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/decode_unchecked");
    for size in SIZES {
        let (tx, _) = signed_transaction(size);
        let hex = tx.to_hex(true);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &hex, |b, hex| {
            b.iter(|| decode_unchecked(hex).unwrap());
        });
    }
    group.finish();
}

fn bench_decode_grouped(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("codec/decode_grouped");
    // One input has a single signature; grouping starts at two.
    for size in [16, 128] {
        let (tx, resolver) = signed_transaction(size);
        let hex = tx.to_hex(true);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &hex, |b, hex| {
            b.iter(|| rt.block_on(decode(hex, true, &resolver)).unwrap());
        });
    }
    group.finish();
}

fn bench_sign_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction/sign");
    for size in SIZES {
        let (tx, _) = signed_transaction(size);
        let keys: Vec<PrivateKey> = tx
            .inputs()
            .iter()
            .filter_map(|input| input.signing_key().cloned())
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tx, |b, tx| {
            b.iter(|| {
                let mut tx = tx.clone();
                tx.sign(&keys).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_check_signatures(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("transaction/check_signatures");
    for size in SIZES {
        let (tx, resolver) = signed_transaction(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tx, |b, tx| {
            b.iter(|| rt.block_on(check_signatures(tx, &resolver)).unwrap());
        });
    }
    group.finish();
}

fn bench_hash(c: &mut Criterion) {
    let (tx, _) = signed_transaction(16);
    let hex = tx.to_hex(true);

    c.bench_function("transaction/hash_uncached", |b| {
        b.iter(|| decode_unchecked(&hex).unwrap().hash());
    });
}

criterion_group!(
    benches,
    bench_sign_message,
    bench_verify_signature,
    bench_encode,
    bench_decode_unchecked,
    bench_decode_grouped,
    bench_sign_transaction,
    bench_check_signatures,
    bench_hash,
);
criterion_main!(benches);
