//! # Pubkey-Mail Checker Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | pm-02 Link Verification | stage-1 mismatch | < 10µs |
//! | pm-02 Link Verification | full match | < 20µs |

use criterion::{criterion_group, criterion_main};

use pm_tests::benchmarks::pm_02_link_verification::{bench_fan_out, bench_verify};

criterion_group!(link_verification, bench_verify, bench_fan_out);
criterion_main!(link_verification);
