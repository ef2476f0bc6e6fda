use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use snowflake_gen::{Clock, Generator, IdGenStatus, Options};
use std::thread::scope;

struct FixedMockTime {
    millis: i64,
}

impl Clock for FixedMockTime {
    fn now_millis(&self) -> i64 {
        self.millis
    }
}

// Fits in one millisecond of the default 12-bit sequence.
const TOTAL_IDS: usize = 4096;

fn bench_hot_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_clock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            let generator = Generator::with_clock(
                Options::with_node(1),
                FixedMockTime {
                    millis: 1_700_000_000_000,
                },
            )
            .unwrap();
            for _ in 0..TOTAL_IDS {
                match generator.try_next_id().unwrap() {
                    IdGenStatus::Ready(id) => {
                        black_box(id);
                    }
                    IdGenStatus::Pending(_) => unreachable!(),
                }
            }
        });
    });

    group.finish();
}

fn bench_system_clock(c: &mut Criterion) {
    let generator = Generator::with_defaults(1).unwrap();

    let mut group = c.benchmark_group("system_clock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function("next_id", |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.next_id().unwrap());
            }
        });
    });

    group.bench_function("next_id_bulk", |b| {
        b.iter(|| black_box(generator.next_id_bulk(TOTAL_IDS).unwrap()));
    });

    group.bench_function("contended/4_threads", |b| {
        b.iter(|| {
            scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        for _ in 0..TOTAL_IDS / 4 {
                            black_box(generator.next_id().unwrap());
                        }
                    });
                }
            });
        });
    });

    group.finish();
}

criterion_group!(benches, bench_hot_path, bench_system_clock);
criterion_main!(benches);
