//! Built-in conversions and validations.
//!
//! Each combinator is an inherent method on the [`ConversionStep`] whose
//! output type it accepts, so only the combinators that make sense for a value
//! are offered: `range` exists on integer steps, `before` on date steps, and so
//! on. Type conversions change the output type; refinements keep it and only
//! reject values.
//!
//! | Output | Methods |
//! |---|---|
//! | `String` | `as_string`, `as_int`, `as_double`, `as_bool`, `as_date`, `as_locale_date`, `as_json`, `min_length`, `max_length`, `regexp`, `regexp_with` |
//! | `i64` | `range` |
//! | `f64` | `greater_than`, `less_than` |
//! | [`Date`] | `before`, `after` |
//! | `serde_json::Value` | `deserialize` |

use std::ops::RangeBounds;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IntRange;
use crate::locale::{Date, DateFormat};
use crate::messages;
use crate::step::ConversionStep;

impl<I: 'static> ConversionStep<I, String> {
    /// Keep the value as a string; contributes the `String` type label.
    pub fn as_string(&self) -> ConversionStep<String, String> {
        self.retype(
            |value, _| Ok(value),
            |context| context.help_text(&messages::HELP_STRING, &[]),
        )
    }

    /// Parse an integer. Fractional input is a `BadFormat`.
    pub fn as_int(&self) -> ConversionStep<String, i64> {
        self.retype(
            |value, context| {
                context
                    .config()
                    .parse_int(&value)
                    .ok_or_else(|| context.errors().bad_format_as(&value, &messages::HELP_INTEGER))
            },
            |context| context.help_text(&messages::HELP_INTEGER, &[]),
        )
    }

    /// Parse a decimal number written with the locale's decimal separator.
    pub fn as_double(&self) -> ConversionStep<String, f64> {
        self.retype(
            |value, context| {
                context
                    .config()
                    .parse_double(&value)
                    .ok_or_else(|| context.errors().bad_format_as(&value, &messages::HELP_DOUBLE))
            },
            |context| context.help_text(&messages::HELP_DOUBLE, &[]),
        )
    }

    /// True when the value starts with one of `YyTt1-9`. Never fails.
    pub fn as_bool(&self) -> ConversionStep<String, bool> {
        self.retype(
            |value, _| {
                Ok(value
                    .chars()
                    .next()
                    .is_some_and(|c| matches!(c, 'Y' | 'y' | 'T' | 't' | '1'..='9')))
            },
            |context| context.help_text(&messages::HELP_BOOL, &[]),
        )
    }

    /// Parse a date with a `strftime` pattern.
    pub fn as_date(&self, format: impl Into<DateFormat>) -> ConversionStep<String, Date> {
        let format = format.into();
        let help_format = format.clone();
        self.retype(
            move |value, context| {
                context
                    .config()
                    .parse_date(&value, &format)
                    .ok_or_else(|| context.errors().date_bad_format(&value, format.pattern()))
            },
            move |context| context.help_text(&messages::HELP_DATE, &[help_format.pattern()]),
        )
    }

    /// Parse a date with the config's date format.
    pub fn as_locale_date(&self) -> ConversionStep<String, Date> {
        self.retype(
            |value, context| {
                let format = context.config().date_format();
                context
                    .config()
                    .parse_date(&value, format)
                    .ok_or_else(|| context.errors().date_bad_format(&value, format.pattern()))
            },
            |context| {
                let pattern = context.config().date_format().pattern();
                context.help_text(&messages::HELP_DATE, &[pattern])
            },
        )
    }

    /// Decode JSON.
    ///
    /// Unless `allow_fragments` is set the top-level value must be an object
    /// or an array. Decoder failures become `OtherError` with the decoder's
    /// message.
    pub fn as_json(&self, allow_fragments: bool) -> ConversionStep<String, Value> {
        self.retype(
            move |value, context| {
                let json: Value =
                    serde_json::from_str(&value).map_err(|e| context.errors().from_error(&e))?;
                if allow_fragments || json.is_object() || json.is_array() {
                    Ok(json)
                } else {
                    Err(context.errors().other_as(&messages::JSON_FRAGMENT, &[]))
                }
            },
            |context| context.help_text(&messages::HELP_JSON, &[]),
        )
    }

    /// Reject strings with fewer than `min` characters.
    pub fn min_length(&self, min: usize) -> ConversionStep<String, String> {
        self.retype(
            move |value, context| {
                if value.chars().count() < min {
                    Err(context.errors().string_too_short(&value, min))
                } else {
                    Ok(value)
                }
            },
            move |context| context.help_text(&messages::HELP_MIN_LENGTH, &[&min.to_string()]),
        )
    }

    /// Reject strings with more than `max` characters.
    pub fn max_length(&self, max: usize) -> ConversionStep<String, String> {
        self.retype(
            move |value, context| {
                if value.chars().count() > max {
                    Err(context.errors().string_too_long(&value, max))
                } else {
                    Ok(value)
                }
            },
            move |context| context.help_text(&messages::HELP_MAX_LENGTH, &[&max.to_string()]),
        )
    }

    /// Require a regular expression match.
    ///
    /// With `anchored` the match must begin at the start of the value.
    /// Returns `None` when `pattern` does not compile.
    pub fn regexp(&self, pattern: &str, anchored: bool) -> Option<ConversionStep<String, String>> {
        match Regex::new(pattern) {
            Ok(regex) => Some(self.regexp_with(regex, anchored)),
            Err(error) => {
                tracing::warn!(pattern, %error, "regular expression does not compile");
                None
            }
        }
    }

    /// Require a match of an already compiled regular expression.
    pub fn regexp_with(&self, regex: Regex, anchored: bool) -> ConversionStep<String, String> {
        let help_pattern = regex.as_str().to_string();
        self.retype(
            move |value, context| {
                let matched = regex
                    .find(&value)
                    .is_some_and(|found| !anchored || found.start() == 0);
                if matched {
                    Ok(value)
                } else {
                    Err(context.errors().no_regexp_match(&value, regex.as_str()))
                }
            },
            move |context| context.help_text(&messages::HELP_REGEXP, &[&help_pattern]),
        )
    }
}

impl<I: 'static> ConversionStep<I, i64> {
    /// Require the integer to lie in `range`.
    pub fn range(&self, range: impl RangeBounds<i64>) -> ConversionStep<i64, i64> {
        let range = IntRange::new(range);
        self.retype(
            move |value, context| {
                if range.contains(value) {
                    Ok(value)
                } else {
                    Err(context.errors().int_not_in_range(value, range))
                }
            },
            move |context| context.help_text(&messages::HELP_RANGE, &[&range.to_string()]),
        )
    }
}

impl<I: 'static> ConversionStep<I, f64> {
    /// Require the number to be strictly greater than `limit`.
    pub fn greater_than(&self, limit: f64) -> ConversionStep<f64, f64> {
        self.retype(
            move |value, context| {
                if value > limit {
                    Ok(value)
                } else {
                    Err(context.errors().value_too_small(value, limit))
                }
            },
            move |context| {
                let limit = context.config().format_double(limit);
                context.help_text(&messages::HELP_GREATER_THAN, &[&limit])
            },
        )
    }

    /// Require the number to be strictly less than `limit`.
    pub fn less_than(&self, limit: f64) -> ConversionStep<f64, f64> {
        self.retype(
            move |value, context| {
                if value < limit {
                    Ok(value)
                } else {
                    Err(context.errors().value_too_large(value, limit))
                }
            },
            move |context| {
                let limit = context.config().format_double(limit);
                context.help_text(&messages::HELP_LESS_THAN, &[&limit])
            },
        )
    }
}

impl<I: 'static> ConversionStep<I, Date> {
    /// Require the date to be strictly before `limit`.
    pub fn before(&self, limit: Date) -> ConversionStep<Date, Date> {
        self.retype(
            move |value, context| {
                if value < limit {
                    Ok(value)
                } else {
                    Err(context.errors().date_too_late(value, limit))
                }
            },
            move |context| {
                let limit = context.config().format_date(&limit);
                context.help_text(&messages::HELP_BEFORE, &[&limit])
            },
        )
    }

    /// Require the date to be strictly after `limit`.
    pub fn after(&self, limit: Date) -> ConversionStep<Date, Date> {
        self.retype(
            move |value, context| {
                if value > limit {
                    Ok(value)
                } else {
                    Err(context.errors().date_too_early(value, limit))
                }
            },
            move |context| {
                let limit = context.config().format_date(&limit);
                context.help_text(&messages::HELP_AFTER, &[&limit])
            },
        )
    }
}

impl<I: 'static> ConversionStep<I, Value> {
    /// Deserialize decoded JSON into `T`.
    ///
    /// A shape mismatch is a `BadFormat` naming `T`.
    pub fn deserialize<T>(&self) -> ConversionStep<Value, T>
    where
        T: DeserializeOwned + 'static,
    {
        self.as_type_opt(|value, _| serde_json::from_value(value).ok(), None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::*;
    use crate::config::ParserConfig;
    use crate::error::ExtractError;
    use crate::locale::Locale;
    use crate::step::Evaluable;

    fn extract(value: &str) -> ConversionStep<String, String> {
        ParserConfig::default().extract(Some(value), Some("q"))
    }

    fn date(text: &str) -> Date {
        DateFormat::rfc3339().parse(text).unwrap()
    }

    #[test]
    fn test_as_string() {
        let step = extract("w").as_string();
        assert_eq!(step.required(), Ok("w".to_string()));
        assert_eq!(step.usage(), vec!["q", "String"]);
    }

    #[test]
    fn test_as_int() {
        assert_eq!(extract("1").as_int().required(), Ok(1));
        assert_eq!(extract("-17").as_int().required(), Ok(-17));
        assert_eq!(
            extract("1.2345").as_int().required(),
            Err(ExtractError::BadFormat {
                name: Some("q".to_string()),
                value: "1.2345".to_string(),
                expect_type: "Integer".to_string(),
                description: String::new(),
            })
        );
        assert_eq!(extract("1").as_int().usage(), vec!["q", "Integer"]);
    }

    #[test]
    fn test_as_int_range() {
        let port = ParserConfig::default()
            .extract(Some("42158"), Some("PORT"))
            .as_int()
            .range(1..=65535);
        assert_eq!(port.required(), Ok(42158));
        assert_eq!(port.usage(), vec!["PORT", "Integer", "Range: 1..=65535"]);

        let step = extract("0").as_int().range(1..11);
        match step.required() {
            Err(ExtractError::IntNotInRange { value, range, .. }) => {
                assert_eq!(value, 0);
                assert_eq!(range, IntRange::new(1..11));
            }
            other => panic!("expected IntNotInRange, got {:?}", other),
        }
        assert_eq!(extract("10").as_int().range(1..11).optional(), Some(10));
        assert_eq!(extract("11").as_int().range(1..11).optional(), None);
    }

    #[test]
    fn test_as_double_posix() {
        assert_eq!(extract("1.2345").as_double().required(), Ok(1.2345));
        assert!(matches!(
            extract("x").as_double().required(),
            Err(ExtractError::BadFormat { .. })
        ));
        assert_eq!(extract("1").as_double().usage(), vec!["q", "Decimal number"]);
    }

    #[test]
    fn test_as_double_comma_locale() {
        let config = ParserConfig::new(Locale::new("fi_FI"));
        let step = config.extract(Some("2,3456"), Some("d")).as_double();
        assert_eq!(step.required(), Ok(2.3456));

        let step = config.extract(Some("1.2345"), Some("d")).as_double();
        assert!(step.optional().is_none());
    }

    #[test]
    fn test_errors_equal_across_catalogs() {
        let mut catalog = HashMap::new();
        catalog.insert(messages::HELP_INTEGER.key.to_string(), "Kokonaisluku".to_string());
        catalog.insert(messages::HELP_DOUBLE.key.to_string(), "Desimaaliluku".to_string());
        catalog.insert(
            messages::JSON_FRAGMENT.key.to_string(),
            "Vain objekti tai taulukko".to_string(),
        );
        let finnish =
            ParserConfig::default().with_messages(messages::MessageResolver::from_map(catalog));
        let english = ParserConfig::default();

        let localized = finnish.extract(Some("x"), Some("N")).as_int().error();
        assert_eq!(localized, english.extract(Some("x"), Some("N")).as_int().error());
        assert_eq!(
            localized.map(|e| e.to_string()),
            Some("Key \"N\" format error. Had value x, not Kokonaisluku".to_string())
        );

        assert_eq!(
            finnish.extract(Some("x"), Some("N")).as_double().error(),
            english.extract(Some("x"), Some("N")).as_double().error()
        );

        let localized = finnish.extract(Some("1"), Some("Q")).as_json(false).error();
        assert_eq!(localized, english.extract(Some("1"), Some("Q")).as_json(false).error());
        assert_eq!(
            localized.map(|e| e.to_string()),
            Some("Vain objekti tai taulukko".to_string())
        );
    }

    #[test]
    fn test_greater_than_less_than() {
        assert_eq!(extract("3.5").as_double().greater_than(3.0).optional(), Some(3.5));
        assert_eq!(
            extract("3").as_double().greater_than(3.0).required(),
            Err(ExtractError::ValueTooSmall {
                name: Some("q".to_string()),
                value: 3.0,
                limit: 3.0,
                description: String::new(),
            })
        );
        assert!(matches!(
            extract("5").as_double().less_than(5.0).required(),
            Err(ExtractError::ValueTooLarge { .. })
        ));
        assert_eq!(
            extract("1").as_double().greater_than(0.5).less_than(2.5).usage(),
            vec!["q", "Decimal number", "Greater than 0.5", "Less than 2.5"]
        );
    }

    #[test]
    fn test_limits_use_locale_in_help() {
        let step = ParserConfig::new(Locale::new("fi_FI"))
            .extract(Some("1"), Some("d"))
            .as_double()
            .greater_than(0.5);
        assert_eq!(step.usage(), vec!["d", "Decimal number", "Greater than 0,5"]);
    }

    #[test]
    fn test_as_bool() {
        for truthy in ["y", "Yes", "t", "TRUE", "1", "9", "7up"] {
            assert_eq!(extract(truthy).as_bool().required(), Ok(true), "{}", truthy);
        }
        for falsy in ["n", "false", "0", "", "off"] {
            assert_eq!(extract(falsy).as_bool().required(), Ok(false), "{}", falsy);
        }
        assert_eq!(
            extract("y").as_bool().usage(),
            vec!["q", "True if string starts with [YyTt1-9]"]
        );
    }

    #[test]
    fn test_as_date() {
        let step = extract("2016-03-21T17:33:00+02:00").as_date(DateFormat::rfc3339());
        assert_eq!(step.required(), Ok(date("2016-03-21T17:33:00+02:00")));

        let step = extract("21.3.").as_date("%Y-%m-%d");
        assert_eq!(
            step.required(),
            Err(ExtractError::DateBadFormat {
                name: Some("q".to_string()),
                value: "21.3.".to_string(),
                format: "%Y-%m-%d".to_string(),
                description: String::new(),
            })
        );
        assert_eq!(step.usage(), vec!["q", "Date in format %Y-%m-%d"]);
    }

    #[test]
    fn test_as_locale_date() {
        let config = ParserConfig::new(Locale::new("fi_FI"));
        let step = config.extract(Some("21.03.2016"), Some("d")).as_locale_date();
        assert_eq!(step.required(), Ok(date("2016-03-21T00:00:00+00:00")));
        assert_eq!(step.usage(), vec!["d", "Date in format %d.%m.%Y"]);
    }

    #[test]
    fn test_before_after() {
        let limit = date("2016-03-21T17:33:00+02:00");
        let earlier = "2016-03-21T16:31:00+02:00";
        let later = "2016-03-21T18:00:00+02:00";

        let before = |value: &str| extract(value).as_date(DateFormat::rfc3339()).before(limit);
        let after = |value: &str| extract(value).as_date(DateFormat::rfc3339()).after(limit);

        assert_eq!(before(earlier).optional(), Some(date(earlier)));
        assert!(matches!(
            before(later).required(),
            Err(ExtractError::DateTooLate { .. })
        ));
        assert_eq!(after(later).optional(), Some(date(later)));
        assert!(matches!(
            after(earlier).required(),
            Err(ExtractError::DateTooEarly { .. })
        ));
        assert!(after("2016-03-21T17:33:00+02:00").optional().is_none());
    }

    #[test]
    fn test_date_limit_help_uses_config_format() {
        let config = ParserConfig::default().with_date_format("%Y-%m-%d");
        let step = config
            .extract(Some("2016-01-01"), Some("d"))
            .as_locale_date()
            .before(date("2016-03-21T17:33:00+00:00"));
        assert_eq!(
            step.usage(),
            vec!["d", "Date in format %Y-%m-%d", "Before 2016-03-21"]
        );
    }

    #[test]
    fn test_as_json_to_map() {
        let step = ParserConfig::default()
            .extract(Some("{\"w\": 1}"), Some("Q"))
            .as_json(false)
            .as_type_opt(
                |value, _| {
                    value.as_object().map(|object| {
                        object
                            .iter()
                            .filter_map(|(key, v)| v.as_i64().map(|n| (key.clone(), n)))
                            .collect::<HashMap<String, i64>>()
                    })
                },
                None,
            );

        let mut expected = HashMap::new();
        expected.insert("w".to_string(), 1);
        assert_eq!(step.required(), Ok(expected));
        assert_eq!(
            step.usage(),
            vec!["Q", "JSON Data", "Type: HashMap<String, i64>"]
        );
    }

    #[test]
    fn test_as_json_fragments() {
        assert!(matches!(
            extract("1").as_json(false).required(),
            Err(ExtractError::OtherError { .. })
        ));
        assert_eq!(extract("1").as_json(true).required(), Ok(Value::from(1)));
        assert_eq!(
            extract("[1, 2]").as_json(false).required(),
            Ok(serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn test_as_json_decoder_error() {
        match extract("{\"w\":").as_json(false).required() {
            Err(ExtractError::OtherError { name, message, .. }) => {
                assert_eq!(name.as_deref(), Some("q"));
                assert!(message.contains("EOF"));
            }
            other => panic!("expected OtherError, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Point {
            x: i64,
            y: i64,
        }

        let step = extract("{\"x\": 1, \"y\": 2}").as_json(false).deserialize::<Point>();
        assert_eq!(step.required(), Ok(Point { x: 1, y: 2 }));
        assert_eq!(step.usage(), vec!["q", "JSON Data", "Type: Point"]);

        let step = extract("{\"x\": 1}").as_json(false).deserialize::<Point>();
        match step.required() {
            Err(ExtractError::BadFormat {
                value, expect_type, ..
            }) => {
                assert_eq!(value, "{\"x\": 1}");
                assert_eq!(expect_type, "Point");
            }
            other => panic!("expected BadFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_string_lengths() {
        assert_eq!(extract("wer").min_length(3).optional(), Some("wer".to_string()));
        assert_eq!(
            extract("wer").min_length(4).required(),
            Err(ExtractError::StringTooShort {
                name: Some("q".to_string()),
                value: "wer".to_string(),
                min_length: 4,
                description: String::new(),
            })
        );
        assert_eq!(extract("wer").max_length(3).optional(), Some("wer".to_string()));
        assert!(matches!(
            extract("wer").max_length(2).required(),
            Err(ExtractError::StringTooLong { max_length: 2, .. })
        ));
        assert_eq!(extract("äöå").max_length(3).optional(), Some("äöå".to_string()));
        assert_eq!(
            extract("wer").min_length(1).max_length(5).usage(),
            vec!["q", "Minimum length: 1", "Maximum length: 5"]
        );
    }

    #[test]
    fn test_regexp() {
        let step = extract("abc").regexp("a.*", true).unwrap();
        assert_eq!(step.required(), Ok("abc".to_string()));
        assert_eq!(step.usage(), vec!["q", "Must match regular expression a.*"]);

        let step = extract("abc").regexp("b.*", true).unwrap();
        assert_eq!(
            step.required(),
            Err(ExtractError::NoRegexpMatch {
                name: Some("q".to_string()),
                value: "abc".to_string(),
                pattern: "b.*".to_string(),
                description: String::new(),
            })
        );

        let step = extract("abc").regexp("b.*", false).unwrap();
        assert_eq!(step.optional(), Some("abc".to_string()));
    }

    #[test]
    fn test_regexp_invalid_pattern_builds_no_step() {
        assert!(extract("abc").regexp("(", false).is_none());
    }

    #[test]
    fn test_regexp_with_compiled() {
        let regex = Regex::new("^[a-z]+$").unwrap();
        let step = extract("abc1").regexp_with(regex, false);
        assert!(step.optional().is_none());
    }

    #[test]
    fn test_missing_value_reaches_terminal_unchanged() {
        let step = ParserConfig::default()
            .extract(None, Some("KEY"))
            .min_length(6);
        assert_eq!(
            step.required(),
            Err(ExtractError::ValueMissing {
                name: Some("KEY".to_string()),
                description: String::new(),
            })
        );
        assert_eq!(step.default_value("default".to_string()), "default");
        assert_eq!(step.usage(), vec!["KEY", "Minimum length: 6"]);
    }
}
