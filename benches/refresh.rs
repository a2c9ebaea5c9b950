//! Refresh and lookup benchmarks.
//!
//! Run with: `cargo bench --bench refresh`
//!
//! - `refresh`: full copy + sort + index rebuild per column and peer count
//! - `lookup`: `row_of` and `record_at` against a populated snapshot

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use peertable::policy::sort::{SortOrder, SortPolicy};
use peertable::record::{PeerColumn, PeerRecord};
use peertable::registry::LockedRegistry;
use peertable::snapshot::SnapshotCache;

const PEER_COUNTS: [usize; 3] = [8, 125, 1024];

fn peers(count: usize) -> Vec<PeerRecord> {
    (0..count)
        .map(|i| {
            let scrambled = (i * 7919) % 1021;
            let record = PeerRecord::new(
                i as i64,
                format!("10.{}.{}.{}:8333", scrambled % 256, i % 256, scrambled / 4),
                format!("/Satoshi:0.{}.{}/", scrambled % 10, i % 4),
            );
            if i % 9 == 0 {
                record
            } else {
                record.with_ping(scrambled as f64 / 1000.0)
            }
        })
        .collect()
}

// ============================================================================
// Refresh
// ============================================================================

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");

    for count in PEER_COUNTS {
        let registry = LockedRegistry::with_peers(peers(count));
        group.throughput(Throughput::Elements(count as u64));

        let policies = [
            ("unsorted", SortPolicy::UNSORTED),
            ("address", SortPolicy::by(PeerColumn::Address, SortOrder::Ascending)),
            ("ping_desc", SortPolicy::by(PeerColumn::Ping, SortOrder::Descending)),
        ];
        for (name, policy) in policies {
            group.bench_with_input(BenchmarkId::new(name, count), &policy, |b, &policy| {
                let mut cache = SnapshotCache::with_sort(&registry, policy);
                b.iter(|| black_box(cache.refresh()));
            });
        }
    }

    group.finish();
}

// ============================================================================
// Lookups
// ============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in PEER_COUNTS {
        let registry = LockedRegistry::with_peers(peers(count));
        let mut cache =
            SnapshotCache::with_sort(&registry, SortPolicy::by(PeerColumn::Ping, SortOrder::Ascending));
        let _ = cache.refresh();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(BenchmarkId::new("row_of", count), |b| {
            b.iter(|| {
                for id in 0..count as i64 {
                    black_box(cache.row_of(id));
                }
            });
        });

        group.bench_function(BenchmarkId::new("record_at", count), |b| {
            b.iter(|| {
                for row in 0..count {
                    black_box(cache.record_at(row));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_refresh, bench_lookup);
criterion_main!(benches);
