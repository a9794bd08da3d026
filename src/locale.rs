//! Locale-dependent number and date primitives.
//!
//! A [`Locale`] is a plain value describing the conventions used when parsing
//! numbers and formatting them back into messages. It is injected through
//! [`ParserConfig`](crate::ParserConfig) rather than read from global state, so
//! tests can pin a fixed locale.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::env::Lookup;

/// Date values produced by [`as_date`](crate::ConversionStep::as_date).
pub type Date = DateTime<FixedOffset>;

/// Number and date conventions for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    identifier: String,
    decimal_separator: char,
    short_date_format: String,
}

/// (identifier or language, decimal separator, short date format)
const KNOWN_LOCALES: &[(&str, char, &str)] = &[
    ("POSIX", '.', "%m/%d/%y"),
    ("C", '.', "%m/%d/%y"),
    ("en_US", '.', "%m/%d/%y"),
    ("en_GB", '.', "%d/%m/%Y"),
    ("en", '.', "%m/%d/%y"),
    ("fi_FI", ',', "%d.%m.%Y"),
    ("fi", ',', "%d.%m.%Y"),
    ("sv_SE", ',', "%Y-%m-%d"),
    ("sv", ',', "%Y-%m-%d"),
    ("de_DE", ',', "%d.%m.%y"),
    ("de", ',', "%d.%m.%y"),
    ("fr_FR", ',', "%d/%m/%Y"),
    ("fr", ',', "%d/%m/%Y"),
    ("ja_JP", '.', "%Y/%m/%d"),
    ("ja", '.', "%Y/%m/%d"),
];

impl Locale {
    /// Conventions for a locale identifier such as `fi_FI` or `de_DE.UTF-8`.
    ///
    /// Identifiers that are not recognized keep their name but use POSIX
    /// conventions; construction never fails.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let normalized = normalize_identifier(&identifier);
        let language = normalized.split('_').next().unwrap_or_default();

        let known = KNOWN_LOCALES
            .iter()
            .find(|(id, _, _)| *id == normalized)
            .or_else(|| KNOWN_LOCALES.iter().find(|(id, _, _)| *id == language));

        match known {
            Some((_, separator, date_format)) => Self {
                identifier,
                decimal_separator: *separator,
                short_date_format: (*date_format).to_string(),
            },
            None => Self {
                identifier,
                ..Self::posix()
            },
        }
    }

    /// The POSIX locale: `.` decimal separator, `%m/%d/%y` dates.
    pub fn posix() -> Self {
        Self {
            identifier: "POSIX".to_string(),
            decimal_separator: '.',
            short_date_format: "%m/%d/%y".to_string(),
        }
    }

    /// A locale with explicitly chosen conventions.
    pub fn custom(
        identifier: impl Into<String>,
        decimal_separator: char,
        short_date_format: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            decimal_separator,
            short_date_format: short_date_format.into(),
        }
    }

    /// Detect the locale from the environment.
    ///
    /// Number conventions and the identifier come from `LC_ALL`, `LC_NUMERIC`
    /// or `LANG`, the short date style from `LC_ALL`, `LC_TIME` or `LANG`,
    /// each in that order. Either falls back to POSIX when none of its
    /// variables is set to a non-empty value.
    pub fn from_lookup(source: &dyn Lookup) -> Self {
        let detect = |vars: [&str; 3]| {
            vars.iter()
                .filter_map(|var| source.lookup(var))
                .find(|value| !value.is_empty())
                .map(Self::new)
                .unwrap_or_else(Self::posix)
        };

        let numeric = detect(["LC_ALL", "LC_NUMERIC", "LANG"]);
        let time = detect(["LC_ALL", "LC_TIME", "LANG"]);
        Self {
            short_date_format: time.short_date_format,
            ..numeric
        }
    }

    /// The identifier this locale was created from.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Character separating the integer and fractional parts.
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// `strftime` pattern of the short date style.
    pub fn short_date_format(&self) -> &str {
        &self.short_date_format
    }

    /// Parse an integer; any fractional part, grouping or whitespace is rejected.
    pub fn parse_int(&self, text: &str) -> Option<i64> {
        text.parse::<i64>().ok()
    }

    /// Parse a decimal number written with this locale's decimal separator.
    pub fn parse_float(&self, text: &str) -> Option<f64> {
        let separator = self.decimal_separator;
        if separator != '.' && text.contains('.') {
            return None;
        }
        let well_formed = text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | 'e' | 'E') || c == separator);
        if text.is_empty() || !well_formed {
            return None;
        }

        let normalized: String = text
            .chars()
            .map(|c| if c == separator { '.' } else { c })
            .collect();
        normalized.parse::<f64>().ok().filter(|f| f.is_finite())
    }

    /// Format a decimal number with this locale's decimal separator.
    pub fn format_float(&self, value: f64) -> String {
        let text = value.to_string();
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::posix()
    }
}

fn normalize_identifier(identifier: &str) -> String {
    identifier
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .replace('-', "_")
}

/// A `strftime`-style date pattern.
///
/// Patterns are not validated up front: a malformed pattern simply fails to
/// parse any input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// Wrap a `strftime` pattern such as `%Y-%m-%d`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// RFC 3339 timestamps with offset, e.g. `2016-03-21T17:33:00+02:00`.
    pub fn rfc3339() -> Self {
        Self::new("%Y-%m-%dT%H:%M:%S%:z")
    }

    /// The underlying pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse `text`.
    ///
    /// Patterns with an offset produce that offset; patterns without one are
    /// read as UTC, and date-only patterns as midnight UTC.
    pub fn parse(&self, text: &str) -> Option<Date> {
        let utc = Utc.fix();
        DateTime::parse_from_str(text, &self.pattern)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, &self.pattern)
                    .ok()
                    .map(|naive| utc.from_utc_datetime(&naive))
            })
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.pattern)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| utc.from_utc_datetime(&naive))
            })
    }

    /// Format `date`, falling back to RFC 3339 when the pattern is malformed.
    pub fn format(&self, date: &Date) -> String {
        let mut out = String::new();
        match write!(out, "{}", date.format(&self.pattern)) {
            Ok(()) => out,
            Err(_) => date.to_rfc3339(),
        }
    }
}

impl From<&str> for DateFormat {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for DateFormat {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}
