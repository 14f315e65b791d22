use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use lexgraph_rs::dedup::signature_similarity;
use lexgraph_rs::fingerprint::{FingerprintGenerator, MinHashConfig};

const SAMPLE: &str = "The Authority hereby issues guidance on the conduct of regulated \
                      firms operating in wholesale markets, including requirements on \
                      record keeping, disclosure and the fair treatment of clients.";

fn fingerprint_benchmarks(c: &mut Criterion) {
    let generator = FingerprintGenerator::new(MinHashConfig::default());

    c.bench_function("minhash_generate_256", |b| {
        b.iter(|| generator.generate(black_box(SAMPLE)));
    });

    let a = generator.generate(SAMPLE);
    let mut revised = SAMPLE.to_string();
    revised.push_str(" This notice takes effect immediately.");
    let b_fp = generator.generate(&revised);

    c.bench_function("signature_cosine_256", |b| {
        b.iter(|| signature_similarity(black_box(&a), black_box(&b_fp)));
    });
}

criterion_group!(benches, fingerprint_benchmarks);
criterion_main!(benches);
