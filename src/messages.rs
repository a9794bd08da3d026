//! Localizable message templates.
//!
//! Every human-readable string the crate produces, error descriptions and
//! usage entries alike, goes through a [`MessageResolver`]. A resolver maps a
//! message key and its English fallback template to the template that should
//! actually be used; the crate then fills the positional `{0}`, `{1}`, ...
//! placeholders itself.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use sluice::messages::{self, MessageResolver};
//!
//! let mut table = HashMap::new();
//! table.insert(
//!     messages::VALUE_MISSING.key.to_string(),
//!     "Arvoa {0} ei löytynyt".to_string(),
//! );
//! let resolver = MessageResolver::from_map(table);
//!
//! assert_eq!(
//!     resolver.render(&messages::VALUE_MISSING, &["PORT"]),
//!     "Arvoa PORT ei löytynyt"
//! );
//! // Keys missing from the table use the built-in template.
//! assert_eq!(resolver.render(&messages::HELP_INTEGER, &[]), "Integer");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A message key together with its built-in English template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    /// Catalog key used for lookup.
    pub key: &'static str,
    /// Template used when the catalog has no entry for `key`.
    pub fallback: &'static str,
}

macro_rules! messages {
    ($($(#[$doc:meta])* $name:ident = ($key:literal, $fallback:literal);)*) => {
        $(
            $(#[$doc])*
            pub const $name: Message = Message { key: $key, fallback: $fallback };
        )*
    };
}

messages! {
    /// Placeholder used in messages when a value has no name.
    UNNAMED = ("sluice.name.unnamed", "<unnamed>");

    /// `{0}` name.
    VALUE_MISSING = ("sluice.error.value_missing", "Required value {0} wasn't found");
    /// `{0}` name, `{1}` value, `{2}` expected type.
    BAD_FORMAT = ("sluice.error.bad_format", "Key \"{0}\" format error. Had value {1}, not {2}");
    /// `{0}` name, `{1}` value, `{2}` range.
    INT_NOT_IN_RANGE = ("sluice.error.int_not_in_range", "Key {0} had value {1}, not in range {2}");
    /// `{0}` name, `{1}` value, `{2}` limit.
    VALUE_TOO_SMALL = ("sluice.error.value_too_small", "Key {0} had value {1}, not greater than {2}");
    /// `{0}` name, `{1}` value, `{2}` limit.
    VALUE_TOO_LARGE = ("sluice.error.value_too_large", "Key {0} had value {1}, not less than {2}");
    /// `{0}` name, `{1}` value, `{2}` minimum length.
    STRING_TOO_SHORT = ("sluice.error.string_too_short", "Key {0} had value {1}, shorter than minimum length {2}");
    /// `{0}` name, `{1}` value, `{2}` maximum length.
    STRING_TOO_LONG = ("sluice.error.string_too_long", "Key {0} had value {1}, longer than maximum length {2}");
    /// `{0}` name, `{1}` value, `{2}` pattern.
    NO_REGEXP_MATCH = ("sluice.error.no_regexp_match", "Key {0} had value {1} that didn't match regular expression {2}");
    /// `{0}` name, `{1}` value, `{2}` date format.
    DATE_BAD_FORMAT = ("sluice.error.date_bad_format", "Key {0} had value {1}, not a date in format {2}");
    /// `{0}` name, `{1}` date, `{2}` limit.
    DATE_TOO_EARLY = ("sluice.error.date_too_early", "Key {0} had date {1}, not after {2}");
    /// `{0}` name, `{1}` date, `{2}` limit.
    DATE_TOO_LATE = ("sluice.error.date_too_late", "Key {0} had date {1}, not before {2}");
    /// `{0}` name, `{1}` message.
    OTHER_ERROR = ("sluice.error.other", "{1}");
    /// Message carried by the `OtherError` produced for a top-level JSON scalar.
    JSON_FRAGMENT = ("sluice.error.json_fragment", "Top-level JSON value must be an object or an array");

    HELP_STRING = ("sluice.help.string", "String");
    HELP_INTEGER = ("sluice.help.integer", "Integer");
    HELP_DOUBLE = ("sluice.help.double", "Decimal number");
    HELP_BOOL = ("sluice.help.bool", "True if string starts with [YyTt1-9]");
    /// `{0}` date format.
    HELP_DATE = ("sluice.help.date", "Date in format {0}");
    HELP_JSON = ("sluice.help.json", "JSON Data");
    /// `{0}` minimum length.
    HELP_MIN_LENGTH = ("sluice.help.min_length", "Minimum length: {0}");
    /// `{0}` maximum length.
    HELP_MAX_LENGTH = ("sluice.help.max_length", "Maximum length: {0}");
    /// `{0}` pattern.
    HELP_REGEXP = ("sluice.help.regexp", "Must match regular expression {0}");
    /// `{0}` range.
    HELP_RANGE = ("sluice.help.range", "Range: {0}");
    /// `{0}` limit.
    HELP_GREATER_THAN = ("sluice.help.greater_than", "Greater than {0}");
    /// `{0}` limit.
    HELP_LESS_THAN = ("sluice.help.less_than", "Less than {0}");
    /// `{0}` limit.
    HELP_BEFORE = ("sluice.help.before", "Before {0}");
    /// `{0}` limit.
    HELP_AFTER = ("sluice.help.after", "After {0}");
    /// `{0}` type name.
    HELP_TYPE = ("sluice.help.type", "Type: {0}");
}

type ResolveFn = dyn Fn(&str, &str) -> String + Send + Sync;

/// Maps `(key, fallback)` to the template to use.
///
/// The default resolver returns the fallback unchanged, so the crate speaks
/// English unless a catalog is supplied.
#[derive(Clone)]
pub struct MessageResolver {
    resolve: Arc<ResolveFn>,
}

impl MessageResolver {
    /// Resolver that always answers with the built-in template.
    pub fn fallback() -> Self {
        Self::from_fn(|_, fallback| fallback.to_string())
    }

    /// Wrap an arbitrary lookup function.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        Self {
            resolve: Arc::new(resolve),
        }
    }

    /// Resolver backed by a key to template table.
    pub fn from_map(table: HashMap<String, String>) -> Self {
        Self::from_fn(move |key, fallback| {
            table
                .get(key)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        })
    }

    /// Look up the template for `key`.
    pub fn resolve(&self, key: &str, fallback: &str) -> String {
        (self.resolve)(key, fallback)
    }

    /// Resolve `message` and fill its placeholders with `args`.
    pub fn render(&self, message: &Message, args: &[&str]) -> String {
        fill_template(&self.resolve(message.key, message.fallback), args)
    }
}

impl Default for MessageResolver {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Debug for MessageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageResolver").finish_non_exhaustive()
    }
}

/// Replace `{n}` placeholders with `args[n]`.
///
/// Placeholders with no matching argument, and braces that do not form a
/// placeholder, are copied through unchanged.
pub fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let placeholder = after.find('}').and_then(|close| {
            let digits = &after[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index: usize = digits.parse().ok()?;
            args.get(index).map(|arg| (*arg, close))
        });

        match placeholder {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
