use criterion::{black_box, criterion_group, criterion_main, Criterion};

use waitertrain_core::catalog::ScenarioCatalog;
use waitertrain_core::parser::parse_catalog_str;
use waitertrain_core::selection::{suggest_next, RandomSelector};

fn bench_parse_builtin(c: &mut Criterion) {
    let path = std::path::Path::new("restaurant.toml");
    c.bench_function("parse_builtin_catalog", |b| {
        b.iter(|| {
            parse_catalog_str(
                black_box(waitertrain_core::catalog::BUILTIN_CATALOG),
                path,
            )
        })
    });
}

fn bench_prompt_lookup(c: &mut Criterion) {
    let catalog = ScenarioCatalog::builtin().unwrap();
    let mut group = c.benchmark_group("prompt_for");

    group.bench_function("configured_pair", |b| {
        b.iter(|| catalog.prompt_for(black_box("order_taking"), black_box("advanced")))
    });
    group.bench_function("difficulty_fallback", |b| {
        b.iter(|| catalog.prompt_for(black_box("order_taking"), black_box("expert")))
    });
    group.bench_function("generic_fallback", |b| {
        b.iter(|| catalog.prompt_for(black_box("karaoke"), black_box("beginner")))
    });

    group.finish();
}

fn bench_suggestion(c: &mut Criterion) {
    let catalog = ScenarioCatalog::builtin().unwrap();
    let selector = RandomSelector::seeded(11);
    let completed: Vec<String> = catalog.categories()[..3].to_vec();

    c.bench_function("suggest_next_half_done", |b| {
        b.iter(|| suggest_next(&selector, &catalog, black_box(&completed)))
    });
}

criterion_group!(benches, bench_parse_builtin, bench_prompt_lookup, bench_suggestion);
criterion_main!(benches);
