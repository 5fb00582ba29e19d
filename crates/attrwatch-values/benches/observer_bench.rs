//! Benchmarks for token dispatch through `ValueListObserver`.
//!
//! Run with: cargo bench -p attrwatch-values -- observer

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use attrwatch_core::{Element, Token};
use attrwatch_values::{FnDelegate, ValueListObserver, parse_from_str};

fn attribute_value(count: usize) -> String {
    (0..count)
        .map(|i| if i % 7 == 0 { "bad".to_string() } else { i.to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// 1. Inbound handlers with a warm cache
// ---------------------------------------------------------------------------

fn bench_repeat_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("observer/repeat_dispatch");

    for count in [16usize, 256, 4_096] {
        group.throughput(Throughput::Elements(count as u64));
        let el = Element::new("div");
        let tokens: Vec<Token> = (0..count)
            .map(|i| Token::new(&el, "data-n", i, i.to_string()))
            .collect();
        let mut obs = ValueListObserver::new(
            el.clone(),
            "data-n",
            FnDelegate::new(parse_from_str::<u32>),
        );

        group.bench_with_input(BenchmarkId::new("match_unmatch", count), &(), |b, _| {
            b.iter(|| {
                for token in &tokens {
                    obs.token_matched(black_box(token));
                }
                for token in &tokens {
                    obs.token_unmatched(black_box(token));
                }
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Full refresh cycle through the bundled notifier
// ---------------------------------------------------------------------------

fn bench_refresh_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("observer/refresh_churn");

    for count in [16usize, 256] {
        group.throughput(Throughput::Elements(count as u64));
        let full = attribute_value(count);
        let root = Element::new("div").with_attribute("data-n", full.as_str());
        let mut obs = ValueListObserver::new(
            root.clone(),
            "data-n",
            FnDelegate::new(parse_from_str::<u32>),
        );
        obs.start();

        group.bench_with_input(BenchmarkId::new("clear_and_restore", count), &(), |b, _| {
            b.iter(|| {
                root.set_attribute("data-n", "");
                obs.refresh();
                root.set_attribute("data-n", full.as_str());
                obs.refresh();
                black_box(obs.matched_count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_repeat_dispatch, bench_refresh_churn);
criterion_main!(benches);
