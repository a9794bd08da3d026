//! Benchmarks for building and evaluating extraction chains.
//!
//! Compares hand-written parsing of a settings map against the same checks
//! expressed as chains, and separates chain construction from evaluation.

use criterion::{criterion_group, criterion_main, Criterion};
use sluice::prelude::*;
use std::hint::black_box;

// =============================================================================
// Manual Parsing (Baseline)
// =============================================================================

mod manual {
    use super::*;

    #[allow(dead_code)]
    pub struct Settings {
        pub port: i64,
        pub ratio: f64,
        pub debug: bool,
        pub api_key: String,
    }

    pub fn load<L: Lookup>(source: &L) -> Result<Settings, String> {
        let port: i64 = source
            .lookup("PORT")
            .ok_or("PORT is required")?
            .parse()
            .map_err(|_| "PORT must be an integer")?;
        if !(1..=65535).contains(&port) {
            return Err("PORT out of range".to_string());
        }

        let ratio: f64 = source
            .lookup("RATIO")
            .ok_or("RATIO is required")?
            .parse()
            .map_err(|_| "RATIO must be a number")?;
        if ratio <= 0.0 || ratio >= 1.0 {
            return Err("RATIO out of range".to_string());
        }

        let debug = source
            .lookup("DEBUG")
            .and_then(|v| v.chars().next())
            .is_some_and(|c| matches!(c, 'Y' | 'y' | 'T' | 't' | '1'..='9'));

        let api_key = source.lookup("API_KEY").ok_or("API_KEY is required")?;
        if api_key.chars().count() < 16 {
            return Err("API_KEY too short".to_string());
        }

        Ok(Settings {
            port,
            ratio,
            debug,
            api_key,
        })
    }
}

// =============================================================================
// Chains
// =============================================================================

struct Chains {
    port: ConversionStep<i64, i64>,
    ratio: ConversionStep<f64, f64>,
    debug: ConversionStep<String, bool>,
    api_key: ConversionStep<String, String>,
}

fn build<L: Lookup>(source: &Extractor<L>) -> Chains {
    Chains {
        port: source.extract("PORT").as_int().range(1..=65535),
        ratio: source
            .extract("RATIO")
            .as_double()
            .greater_than(0.0)
            .less_than(1.0),
        debug: source.extract("DEBUG").as_bool(),
        api_key: source.extract("API_KEY").min_length(16),
    }
}

fn evaluate(chains: &Chains) -> ConversionResult<(i64, f64, bool, String)> {
    Ok((
        chains.port.required()?,
        chains.ratio.required()?,
        chains.debug.required()?,
        chains.api_key.required()?,
    ))
}

fn create_test_env() -> MockEnv {
    MockEnv::new()
        .with_env("PORT", "8080")
        .with_env("RATIO", "0.75")
        .with_env("DEBUG", "yes")
        .with_env("API_KEY", "0123456789abcdef0123")
}

fn bench_manual_parsing(c: &mut Criterion) {
    let env = create_test_env();

    c.bench_function("manual_parsing", |b| {
        b.iter(|| black_box(manual::load(black_box(&env)).is_ok()))
    });
}

fn bench_chain_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_phases");
    let source = Extractor::new(create_test_env());

    group.bench_function("build", |b| b.iter(|| black_box(build(black_box(&source)))));

    let chains = build(&source);
    group.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box(&chains)).is_ok()))
    });

    group.bench_function("build_and_evaluate", |b| {
        b.iter(|| black_box(evaluate(&build(black_box(&source))).is_ok()))
    });

    group.bench_function("usage", |b| {
        b.iter(|| black_box(chains.port.usage().len() + chains.ratio.usage().len()))
    });

    group.finish();
}

fn bench_aggregated_errors(c: &mut Criterion) {
    let env = MockEnv::new().with_env("PORT", "0").with_env("RATIO", "x");
    let source = Extractor::new(env);
    let chains = build(&source);

    let mut settings = Aggregator::new();
    settings.add(chains.port);
    settings.add(chains.ratio);
    settings.add(chains.debug);
    settings.add(chains.api_key);

    c.bench_function("aggregate_errors", |b| {
        b.iter(|| black_box(settings.errors().len()))
    });
}

criterion_group!(
    benches,
    bench_manual_parsing,
    bench_chain_phases,
    bench_aggregated_errors
);
criterion_main!(benches);
