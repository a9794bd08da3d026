//! End-to-end extraction scenarios.
//!
//! These tests drive the public API the way an application would: a lookup
//! source, an extractor, chains per setting, an aggregator for reporting.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use sluice::messages;
use sluice::prelude::*;

fn env() -> MockEnv {
    MockEnv::new()
        .with_env("PORT", "42158")
        .with_env("Q", "{\"w\": 1}")
        .with_env("RATIO", "0.25")
        .with_env("DEBUG", "yes")
        .with_env("STARTS", "2016-03-21T17:33:00+02:00")
}

fn to_string_int_map(value: Value, _: &StepContext) -> Option<HashMap<String, i64>> {
    value.as_object().map(|object| {
        object
            .iter()
            .filter_map(|(key, v)| v.as_i64().map(|n| (key.clone(), n)))
            .collect()
    })
}

#[test]
fn test_port_in_range() {
    let source = Extractor::new(env());
    let port = source.extract("PORT").as_int().range(1..=65535);
    assert_eq!(port.required(), Ok(42158));
}

#[test]
fn test_missing_key_with_default() {
    let source = Extractor::new(env());
    let key = source.extract("KEY").min_length(6);

    match key.required() {
        Err(ExtractError::ValueMissing { name, .. }) => assert_eq!(name.as_deref(), Some("KEY")),
        other => panic!("expected ValueMissing, got {:?}", other),
    }
    assert_eq!(key.default_value("default".to_string()), "default");
    assert_eq!(key.optional(), None);
}

#[test]
fn test_json_to_typed_map() {
    let source = Extractor::new(env());
    let q = source
        .extract("Q")
        .as_json(false)
        .as_type_opt(to_string_int_map, None);

    let mut expected = HashMap::new();
    expected.insert("w".to_string(), 1);
    assert_eq!(q.required(), Ok(expected));
    assert_eq!(q.usage(), vec!["Q", "JSON Data", "Type: HashMap<String, i64>"]);
}

#[test]
fn test_json_to_struct() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Weights {
        w: i64,
    }

    let source = Extractor::new(env());
    let weights = source.extract("Q").as_json(false).deserialize::<Weights>();
    assert_eq!(weights.required(), Ok(Weights { w: 1 }));
}

#[test]
fn test_usage_available_without_values() {
    let source = Extractor::new(MockEnv::new());
    let mut settings = Aggregator::new();
    settings.add(source.extract("PORT").as_int().range(1..=65535));
    settings.add(source.extract("RATIO").as_double().greater_than(0.0).less_than(1.0));
    settings.add(
        source
            .extract("KEY")
            .add_help("Encryption key.", false)
            .min_length(32),
    );

    assert_eq!(
        settings.help_text(),
        "PORT  -- Integer. Range: 1..=65535\n\
         RATIO -- Decimal number. Greater than 0. Less than 1\n\
         KEY   -- Encryption key. Minimum length: 32\n"
    );
}

#[test]
fn test_aggregator_reports_every_invalid_setting() {
    let env = env()
        .with_env("PORT", "0")
        .with_env("RATIO", "1.5")
        .with_env("NAME", "ab");
    let source = Extractor::new(env);
    let mut settings = Aggregator::new();

    let port = settings.add(source.extract("PORT").as_int().range(1..=65535));
    let ratio = settings.add(source.extract("RATIO").as_double().less_than(1.0));
    let debug = settings.add(source.extract("DEBUG").as_bool());
    let name = settings.add(source.extract("NAME").min_length(3));
    let host = settings.add(source.extract("HOST"));

    let errors = settings.errors();
    let kinds: Vec<_> = errors.iter().map(ExtractError::kind).collect();
    assert_eq!(
        kinds,
        vec!["not in range", "too large", "too short", "value missing"]
    );

    assert_eq!(port.default_value(8080), 8080);
    assert_eq!(ratio.optional(), None);
    assert_eq!(debug.required(), Ok(true));
    assert!(name.error().is_some());
    assert!(host.error().map(|e| e.is_missing()).unwrap_or(false));

    match settings.validate() {
        Validation::Failure(errors) => {
            let report = errors.format(&PrettyPrintOptions::no_color());
            assert!(report.contains("Extraction errors (4):"));
            assert!(report.contains("'PORT': Key PORT had value 0, not in range 1..=65535"));
            assert!(report.contains("Set 'HOST'"));
        }
        Validation::Success(_) => panic!("expected failure"),
    }
}

#[test]
fn test_localized_settings() {
    let env = MockEnv::new()
        .with_env("LANG", "fi_FI.UTF-8")
        .with_env("RATIO", "0,25")
        .with_env("DAY", "21.03.2016");

    let mut catalog = HashMap::new();
    catalog.insert(
        messages::VALUE_MISSING.key.to_string(),
        "Arvoa {0} ei löytynyt".to_string(),
    );
    catalog.insert(
        messages::HELP_DOUBLE.key.to_string(),
        "Desimaaliluku".to_string(),
    );

    let config = ParserConfig::new(Locale::from_lookup(&env))
        .with_messages(MessageResolver::from_map(catalog));
    let source = Extractor::with_config(&env, config);

    let ratio = source.extract("RATIO").as_double();
    assert_eq!(ratio.required(), Ok(0.25));
    assert_eq!(ratio.usage(), vec!["RATIO", "Desimaaliluku"]);

    let day = source.extract("DAY").as_locale_date();
    assert_eq!(
        day.required().map(|d| d.to_rfc3339()),
        Ok("2016-03-21T00:00:00+00:00".to_string())
    );

    let missing = source.extract("PORT").as_int();
    assert_eq!(
        missing.error().map(|e| e.to_string()),
        Some("Arvoa PORT ei löytynyt".to_string())
    );
}

#[test]
fn test_date_window() {
    let format = DateFormat::rfc3339();
    let not_before = format.parse("2016-01-01T00:00:00+00:00").unwrap();
    let not_after = format.parse("2017-01-01T00:00:00+00:00").unwrap();

    let source = Extractor::new(env());
    let starts = source
        .extract("STARTS")
        .as_date(format.clone())
        .after(not_before)
        .before(not_after);

    assert_eq!(
        starts.required().map(|d| d.to_rfc3339()),
        Ok("2016-03-21T17:33:00+02:00".to_string())
    );

    let too_late = source
        .extract("STARTS")
        .as_date(format)
        .before(not_before);
    assert!(matches!(
        too_late.required(),
        Err(ExtractError::DateTooLate { .. })
    ));
}

#[test]
fn test_regexp_chain() {
    let source = Extractor::new(MockEnv::new().with_env("REGION", "eu-north-1"));

    let region = source
        .extract("REGION")
        .regexp("[a-z]{2}-[a-z]+-[0-9]", true)
        .expect("pattern compiles");
    assert_eq!(region.required(), Ok("eu-north-1".to_string()));

    assert!(source.extract("REGION").regexp("[", true).is_none());
}

#[test]
fn test_chain_reuse() {
    let source = Extractor::new(env());
    let port = source.extract("PORT").as_int();
    let privileged = port.range(..1024);
    let unprivileged = port.range(1024..);

    assert!(privileged.optional().is_none());
    assert_eq!(unprivileged.optional(), Some(42158));
    assert_eq!(port.required(), Ok(42158));
}
