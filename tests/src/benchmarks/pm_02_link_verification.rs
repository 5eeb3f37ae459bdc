//! # PM-02 Link Verification Benchmarks
//!
//! Every checker verifies every feed link, so verification cost multiplies
//! by the number of subscriptions. The common case is a mismatch that stops
//! after stage 1.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};

use pm_02_link_verification::{compose_link, meta_tag, verify, LinkVerifier, LinkVerifierApi};
use shared_types::{Address, Credential, CredentialParts, CurrencyTag, SharedSecret};

const HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
const TS: i64 = 1_714_555_800_000_000_000;

fn credential(seed: u8) -> Credential {
    Credential::from_parts(CredentialParts {
        wif: format!("bench-{seed}"),
        secret_scalar: [seed; 32],
        public_key: vec![0x02; 33],
        address: Address::new(format!("mBenchAddress{seed:03}")),
        currency: CurrencyTag::Testnet,
        shared_secret: SharedSecret::new(vec![seed; 65]),
    })
}

/// Stage-1 only versus the full two-stage match.
pub fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("pm-02-verify");
    let owner = credential(1);
    let ts = TS.to_string();
    let tag = meta_tag(owner.shared_secret(), owner.address(), HASH, &ts);

    group.bench_function("matched", |b| {
        b.iter(|| {
            black_box(verify(
                owner.shared_secret(),
                owner.address(),
                black_box(&tag),
                HASH,
                &ts,
            ))
        })
    });

    let other = credential(2);
    group.bench_function("not_matched", |b| {
        b.iter(|| {
            black_box(verify(
                other.shared_secret(),
                other.address(),
                black_box(&tag),
                HASH,
                &ts,
            ))
        })
    });

    group.finish();
}

/// One link checked by N subscribers, parse included.
pub fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("pm-02-fan-out");
    let owner = credential(1);
    let link = compose_link(
        "https://rss.pubkemail.com/item",
        owner.shared_secret(),
        owner.address(),
        HASH,
        TS,
    )
    .expect("bench link composes");
    let verifier = LinkVerifier;

    for subscribers in [1u8, 10, 100] {
        let credentials: Vec<Credential> = (1..=subscribers).map(credential).collect();
        group.throughput(Throughput::Elements(u64::from(subscribers)));
        group.bench_with_input(
            BenchmarkId::new("verify_link", subscribers),
            &credentials,
            |b, credentials| {
                b.iter(|| {
                    let matched = credentials
                        .iter()
                        .filter_map(|c| verifier.verify_link(c, black_box(&link)).ok())
                        .filter(|verdict| verdict.outcome.matched)
                        .count();
                    black_box(matched)
                })
            },
        );
    }

    group.finish();
}
