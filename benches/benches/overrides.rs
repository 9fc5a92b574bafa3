// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_override` resolution and binding.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::string::String;

use understory_override::{
    Component, Defaults, OverrideBinder, OverrideRecord, Overrides, Props, Style, resolve,
    with_overrides,
};

fn leaf(name: String) -> Component<usize> {
    Component::named(name, |props: &Props<usize>| props.len())
}

/// `width` top-level components plus one namespace of `width` more.
fn defaults(width: usize) -> Defaults<usize> {
    let mut nested = Defaults::new();
    let mut root = Defaults::new();
    for i in 0..width {
        nested = nested.with_component(format!("Inner{i}"), leaf(format!("Inner{i}")));
        root = root.with_component(format!("Part{i}"), leaf(format!("Part{i}")));
    }
    root.with_namespace("Nested", nested)
}

fn red() -> OverrideRecord<usize> {
    OverrideRecord::builder()
        .style(Style::new().with("color", "red"))
        .props(Props::new().with("title", "bench"))
        .build()
}

fn bench_overrides(c: &mut Criterion) {
    let mut group = c.benchmark_group("override/resolve");

    for width in [4_usize, 16, 64] {
        let defaults = defaults(width);
        let overrides = Overrides::new()
            .with("Part0", red())
            .with_namespace("Nested", Overrides::new().with("Inner1", red()));

        group.bench_function(BenchmarkId::new("cold/none", width), |b| {
            b.iter(|| black_box(resolve(&defaults, None)))
        });

        group.bench_function(BenchmarkId::new("cold/two_records", width), |b| {
            b.iter(|| black_box(resolve(&defaults, Some(&overrides))))
        });

        group.bench_function(BenchmarkId::new("memo/hit", width), |b| {
            let mut binder = OverrideBinder::new(defaults.clone());
            binder.bind(Some(&overrides)).unwrap();
            b.iter(|| black_box(binder.bind(Some(&overrides))))
        });

        group.bench_function(BenchmarkId::new("memo/one_changed", width), |b| {
            let shared = red();
            b.iter_batched(
                || {
                    let mut binder = OverrideBinder::new(defaults.clone());
                    binder
                        .bind(Some(&Overrides::new().with("Part1", shared.clone())))
                        .unwrap();
                    binder
                },
                |mut binder| {
                    let next = Overrides::new()
                        .with("Part1", shared.clone())
                        .with("Part0", red());
                    black_box(binder.bind(Some(&next)))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();

    let mut group = c.benchmark_group("override/render");

    let defaults = defaults(16);
    let resolved = resolve(&defaults, Some(&Overrides::new().with("Part0", red()))).unwrap();
    let incoming = Props::new()
        .with("open", true)
        .with("style", Style::new().with("margin", 1).with("color", "blue"));

    group.bench_function("passthrough", |b| {
        b.iter(|| black_box(resolved.render("Part1", &incoming)))
    });

    group.bench_function("record", |b| {
        b.iter(|| black_box(resolved.render("Part0", &incoming)))
    });

    let card = with_overrides(defaults, |parts, props| {
        parts.render("Part0", props).unwrap_or_default()
    });
    let with_tree = incoming
        .clone()
        .with("overrides", Overrides::new().with("Part0", red()));

    group.bench_function("adapter/memo_hit", |b| {
        b.iter(|| black_box(card.render(&with_tree)))
    });

    group.finish();
}

criterion_group!(benches, bench_overrides);
criterion_main!(benches);
