//! Settings extraction demonstration.
//!
//! Builds a small settings object from a mock environment, prints the usage
//! table that documents every setting, then reports all invalid values at
//! once.
//!
//! Run with:
//!   RUST_LOG=sluice=trace cargo run --example settings

use std::collections::HashMap;

use serde_json::Value;
use sluice::prelude::*;
use tracing_subscriber::EnvFilter;

/// Application settings, one chain per value.
struct Settings {
    port: ConversionStep<i64, i64>,
    timeout: ConversionStep<f64, f64>,
    debug: ConversionStep<String, bool>,
    api_key: ConversionStep<String, String>,
    weights: ConversionStep<Value, HashMap<String, i64>>,
    region: Option<ConversionStep<String, String>>,
}

impl Settings {
    fn new<L: Lookup>(source: &Extractor<L>, aggregator: &mut Aggregator) -> Self {
        let region = source
            .extract("REGION")
            .regexp("[a-z]{2}-[a-z]+-[0-9]", true)
            .map(|step| aggregator.add(step));

        Self {
            port: aggregator.add(source.extract("PORT").as_int().range(1..=65535)),
            timeout: aggregator.add(
                source
                    .extract("TIMEOUT")
                    .add_help("Request timeout in seconds.", false)
                    .as_double()
                    .greater_than(0.0),
            ),
            debug: aggregator.add(source.extract("DEBUG").as_bool()),
            api_key: aggregator.add(
                source
                    .extract("API_KEY")
                    .add_help("Key for the upstream API.", false)
                    .min_length(32),
            ),
            weights: aggregator.add(source.extract("WEIGHTS").as_json(false).as_type_opt(
                |value, _| {
                    value.as_object().map(|object| {
                        object
                            .iter()
                            .filter_map(|(key, v)| v.as_i64().map(|n| (key.clone(), n)))
                            .collect::<HashMap<String, i64>>()
                    })
                },
                None,
            )),
            region,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Settings Demo ===\n");

    println!("--- Usage ---\n");
    demo_usage();

    println!("\n--- Valid Settings ---\n");
    demo_valid();

    println!("\n--- Invalid Settings (Accumulated Errors) ---");
    demo_invalid();
}

fn demo_usage() {
    let mut aggregator = Aggregator::new();
    let _ = Settings::new(&Extractor::new(MockEnv::new()), &mut aggregator);
    print!("{}", aggregator.help_text());
}

fn demo_valid() {
    let env = MockEnv::new()
        .with_env("PORT", "8080")
        .with_env("TIMEOUT", "2.5")
        .with_env("DEBUG", "yes")
        .with_env("API_KEY", "0123456789abcdef0123456789abcdef")
        .with_env("WEIGHTS", "{\"a\": 1, \"b\": 2}")
        .with_env("REGION", "eu-north-1");

    let mut aggregator = Aggregator::new();
    let settings = Settings::new(&Extractor::new(env), &mut aggregator);

    match aggregator.validate().unwrap_or_print() {
        Ok(()) => {
            println!("port:    {}", settings.port.default_value(80));
            println!("timeout: {}", settings.timeout.default_value(30.0));
            println!("debug:   {}", settings.debug.default_value(false));
            println!("api key: {} chars", settings.api_key.default_value(String::new()).len());
            println!("weights: {:?}", settings.weights.optional().unwrap_or_default());
            println!(
                "region:  {}",
                settings
                    .region
                    .as_ref()
                    .and_then(|step| step.optional())
                    .unwrap_or_default()
            );
        }
        Err(_) => println!("unexpected errors"),
    }
}

fn demo_invalid() {
    let env = MockEnv::new()
        .with_env("PORT", "0")
        .with_env("TIMEOUT", "soon")
        .with_env("API_KEY", "short")
        .with_env("WEIGHTS", "[1, 2]")
        .with_env("REGION", "north");

    let mut aggregator = Aggregator::new();
    let settings = Settings::new(&Extractor::new(env), &mut aggregator);

    if let Validation::Failure(errors) = aggregator.validate() {
        print!("{}", errors.format(&PrettyPrintOptions::default().with_color(ColorOption::Always)));
    }

    println!("Falling back to defaults where possible:");
    println!("port:  {}", settings.port.default_value(80));
    println!("debug: {}", settings.debug.default_value(false));
}
