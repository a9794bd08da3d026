//! Error types for value extraction.
//!
//! [`ExtractError`] is the closed set of reasons an extraction can fail. Each
//! error renders its localized description once, when it is built by an
//! [`ErrorBuilder`], and compares equal to another error of the same kind with
//! the same semantic fields regardless of that description. [`ExtractErrors`]
//! is the non-empty collection used when many independent values are checked
//! together.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use stillwater::{NonEmptyVec, Semigroup, Validation};
use thiserror::Error;

use crate::locale::{Date, DateFormat, Locale};
use crate::messages::{self, Message, MessageResolver};

/// Outcome of evaluating a conversion step.
pub type ConversionResult<T> = Result<T, ExtractError>;

/// An integer range as given to [`range`](crate::ConversionStep::range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    start: Bound<i64>,
    end: Bound<i64>,
}

impl IntRange {
    /// Capture the bounds of any integer range expression.
    pub fn new(range: impl RangeBounds<i64>) -> Self {
        Self {
            start: range.start_bound().cloned(),
            end: range.end_bound().cloned(),
        }
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: i64) -> bool {
        (self.start, self.end).contains(&value)
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Bound::Included(start) => write!(f, "{}", start)?,
            Bound::Excluded(start) => {
                // No range literal excludes its start; use interval notation.
                return match self.end {
                    Bound::Included(end) => write!(f, "({}, {}]", start, end),
                    Bound::Excluded(end) => write!(f, "({}, {})", start, end),
                    Bound::Unbounded => write!(f, "({}, ..)", start),
                };
            }
            Bound::Unbounded => {}
        }
        match self.end {
            Bound::Included(end) => write!(f, "..={}", end),
            Bound::Excluded(end) => write!(f, "..{}", end),
            Bound::Unbounded => write!(f, ".."),
        }
    }
}

/// Reasons an extraction can fail.
///
/// Every variant carries the name of the value it came from (if any), the
/// fields needed to describe the failure, and the description rendered when
/// the error was built. `Display` prints the description.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// No value was present for the name.
    #[error("{description}")]
    ValueMissing {
        name: Option<String>,
        description: String,
    },

    /// The value could not be read as the expected type.
    #[error("{description}")]
    BadFormat {
        name: Option<String>,
        value: String,
        expect_type: String,
        description: String,
    },

    /// An integer fell outside the allowed range.
    #[error("{description}")]
    IntNotInRange {
        name: Option<String>,
        value: i64,
        range: IntRange,
        description: String,
    },

    /// A number was not greater than the lower limit.
    #[error("{description}")]
    ValueTooSmall {
        name: Option<String>,
        value: f64,
        limit: f64,
        description: String,
    },

    /// A number was not less than the upper limit.
    #[error("{description}")]
    ValueTooLarge {
        name: Option<String>,
        value: f64,
        limit: f64,
        description: String,
    },

    /// A string had fewer characters than required.
    #[error("{description}")]
    StringTooShort {
        name: Option<String>,
        value: String,
        min_length: usize,
        description: String,
    },

    /// A string had more characters than allowed.
    #[error("{description}")]
    StringTooLong {
        name: Option<String>,
        value: String,
        max_length: usize,
        description: String,
    },

    /// A string did not match a regular expression.
    #[error("{description}")]
    NoRegexpMatch {
        name: Option<String>,
        value: String,
        pattern: String,
        description: String,
    },

    /// A string could not be parsed with the date format.
    #[error("{description}")]
    DateBadFormat {
        name: Option<String>,
        value: String,
        format: String,
        description: String,
    },

    /// A date was not after the limit.
    #[error("{description}")]
    DateTooEarly {
        name: Option<String>,
        value: Date,
        limit: Date,
        description: String,
    },

    /// A date was not before the limit.
    #[error("{description}")]
    DateTooLate {
        name: Option<String>,
        value: Date,
        limit: Date,
        description: String,
    },

    /// A failure reported by a foreign primitive or a user conversion.
    #[error("{description}")]
    OtherError {
        name: Option<String>,
        message: String,
        description: String,
    },
}

impl ExtractError {
    /// Name of the value this error is about.
    pub fn name(&self) -> Option<&str> {
        match self {
            ExtractError::ValueMissing { name, .. }
            | ExtractError::BadFormat { name, .. }
            | ExtractError::IntNotInRange { name, .. }
            | ExtractError::ValueTooSmall { name, .. }
            | ExtractError::ValueTooLarge { name, .. }
            | ExtractError::StringTooShort { name, .. }
            | ExtractError::StringTooLong { name, .. }
            | ExtractError::NoRegexpMatch { name, .. }
            | ExtractError::DateBadFormat { name, .. }
            | ExtractError::DateTooEarly { name, .. }
            | ExtractError::DateTooLate { name, .. }
            | ExtractError::OtherError { name, .. } => name.as_deref(),
        }
    }

    /// The localized description rendered when the error was built.
    pub fn description(&self) -> &str {
        match self {
            ExtractError::ValueMissing { description, .. }
            | ExtractError::BadFormat { description, .. }
            | ExtractError::IntNotInRange { description, .. }
            | ExtractError::ValueTooSmall { description, .. }
            | ExtractError::ValueTooLarge { description, .. }
            | ExtractError::StringTooShort { description, .. }
            | ExtractError::StringTooLong { description, .. }
            | ExtractError::NoRegexpMatch { description, .. }
            | ExtractError::DateBadFormat { description, .. }
            | ExtractError::DateTooEarly { description, .. }
            | ExtractError::DateTooLate { description, .. }
            | ExtractError::OtherError { description, .. } => description,
        }
    }

    /// Short, stable label for the kind of failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::ValueMissing { .. } => "value missing",
            ExtractError::BadFormat { .. } => "bad format",
            ExtractError::IntNotInRange { .. } => "not in range",
            ExtractError::ValueTooSmall { .. } => "too small",
            ExtractError::ValueTooLarge { .. } => "too large",
            ExtractError::StringTooShort { .. } => "too short",
            ExtractError::StringTooLong { .. } => "too long",
            ExtractError::NoRegexpMatch { .. } => "no match",
            ExtractError::DateBadFormat { .. } => "bad date format",
            ExtractError::DateTooEarly { .. } => "too early",
            ExtractError::DateTooLate { .. } => "too late",
            ExtractError::OtherError { .. } => "other",
        }
    }

    /// Whether the value was absent rather than invalid.
    pub fn is_missing(&self) -> bool {
        matches!(self, ExtractError::ValueMissing { .. })
    }

    /// Get a suggestion for fixing this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ExtractError::ValueMissing {
                name: Some(name), ..
            } => Some(format!("Set '{}'", name)),
            ExtractError::IntNotInRange {
                name: Some(name),
                range,
                ..
            } => Some(format!("Use a value in {} for '{}'", range, name)),
            ExtractError::StringTooShort {
                name: Some(name),
                min_length,
                ..
            } => Some(format!(
                "Use at least {} characters for '{}'",
                min_length, name
            )),
            ExtractError::DateBadFormat {
                name: Some(name),
                format,
                ..
            } => Some(format!("Write '{}' in the format {}", name, format)),
            _ => None,
        }
    }
}

/// Structural equality: descriptions are ignored.
impl PartialEq for ExtractError {
    fn eq(&self, other: &Self) -> bool {
        use ExtractError::*;

        match (self, other) {
            (ValueMissing { name: n1, .. }, ValueMissing { name: n2, .. }) => n1 == n2,
            (
                BadFormat {
                    name: n1,
                    value: v1,
                    expect_type: t1,
                    ..
                },
                BadFormat {
                    name: n2,
                    value: v2,
                    expect_type: t2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && t1 == t2,
            (
                IntNotInRange {
                    name: n1,
                    value: v1,
                    range: r1,
                    ..
                },
                IntNotInRange {
                    name: n2,
                    value: v2,
                    range: r2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && r1 == r2,
            (
                ValueTooSmall {
                    name: n1,
                    value: v1,
                    limit: l1,
                    ..
                },
                ValueTooSmall {
                    name: n2,
                    value: v2,
                    limit: l2,
                    ..
                },
            )
            | (
                ValueTooLarge {
                    name: n1,
                    value: v1,
                    limit: l1,
                    ..
                },
                ValueTooLarge {
                    name: n2,
                    value: v2,
                    limit: l2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && l1 == l2,
            (
                StringTooShort {
                    name: n1,
                    value: v1,
                    min_length: l1,
                    ..
                },
                StringTooShort {
                    name: n2,
                    value: v2,
                    min_length: l2,
                    ..
                },
            )
            | (
                StringTooLong {
                    name: n1,
                    value: v1,
                    max_length: l1,
                    ..
                },
                StringTooLong {
                    name: n2,
                    value: v2,
                    max_length: l2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && l1 == l2,
            (
                NoRegexpMatch {
                    name: n1,
                    value: v1,
                    pattern: p1,
                    ..
                },
                NoRegexpMatch {
                    name: n2,
                    value: v2,
                    pattern: p2,
                    ..
                },
            )
            | (
                DateBadFormat {
                    name: n1,
                    value: v1,
                    format: p1,
                    ..
                },
                DateBadFormat {
                    name: n2,
                    value: v2,
                    format: p2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && p1 == p2,
            (
                DateTooEarly {
                    name: n1,
                    value: v1,
                    limit: l1,
                    ..
                },
                DateTooEarly {
                    name: n2,
                    value: v2,
                    limit: l2,
                    ..
                },
            )
            | (
                DateTooLate {
                    name: n1,
                    value: v1,
                    limit: l1,
                    ..
                },
                DateTooLate {
                    name: n2,
                    value: v2,
                    limit: l2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && l1 == l2,
            (
                OtherError {
                    name: n1,
                    message: m1,
                    ..
                },
                OtherError {
                    name: n2,
                    message: m2,
                    ..
                },
            ) => n1 == n2 && m1 == m2,
            _ => false,
        }
    }
}

/// Builds errors for one extracted value, rendering each description through
/// the message resolver at construction time.
#[derive(Debug, Clone)]
pub struct ErrorBuilder {
    name: Option<String>,
    messages: MessageResolver,
    locale: Locale,
    date_format: DateFormat,
}

impl ErrorBuilder {
    /// Create a builder for errors about the value called `name`.
    pub fn new(
        name: Option<String>,
        messages: MessageResolver,
        locale: Locale,
        date_format: DateFormat,
    ) -> Self {
        Self {
            name,
            messages,
            locale,
            date_format,
        }
    }

    /// The name every built error carries.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn describe(&self, message: &Message, args: &[&str]) -> String {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => self.messages.render(&messages::UNNAMED, &[]),
        };
        let mut all_args = Vec::with_capacity(args.len() + 1);
        all_args.push(name.as_str());
        all_args.extend_from_slice(args);
        self.messages.render(message, &all_args)
    }

    /// `ValueMissing`: no value was present.
    pub fn value_missing(&self) -> ExtractError {
        ExtractError::ValueMissing {
            name: self.name.clone(),
            description: self.describe(&messages::VALUE_MISSING, &[]),
        }
    }

    /// `BadFormat` with a caller-supplied type label, used as-is in the description.
    pub fn bad_format(&self, value: &str, expect_type: &str) -> ExtractError {
        ExtractError::BadFormat {
            name: self.name.clone(),
            value: value.to_string(),
            expect_type: expect_type.to_string(),
            description: self.describe(&messages::BAD_FORMAT, &[value, expect_type]),
        }
    }

    /// `IntNotInRange` for an integer outside `range`.
    pub fn int_not_in_range(&self, value: i64, range: IntRange) -> ExtractError {
        ExtractError::IntNotInRange {
            name: self.name.clone(),
            value,
            range,
            description: self.describe(
                &messages::INT_NOT_IN_RANGE,
                &[&value.to_string(), &range.to_string()],
            ),
        }
    }

    /// `ValueTooSmall` for a number not strictly greater than `limit`.
    pub fn value_too_small(&self, value: f64, limit: f64) -> ExtractError {
        ExtractError::ValueTooSmall {
            name: self.name.clone(),
            value,
            limit,
            description: self.describe(
                &messages::VALUE_TOO_SMALL,
                &[
                    &self.locale.format_float(value),
                    &self.locale.format_float(limit),
                ],
            ),
        }
    }

    /// `ValueTooLarge` for a number not strictly less than `limit`.
    pub fn value_too_large(&self, value: f64, limit: f64) -> ExtractError {
        ExtractError::ValueTooLarge {
            name: self.name.clone(),
            value,
            limit,
            description: self.describe(
                &messages::VALUE_TOO_LARGE,
                &[
                    &self.locale.format_float(value),
                    &self.locale.format_float(limit),
                ],
            ),
        }
    }

    /// `StringTooShort` for a string with fewer than `min_length` characters.
    pub fn string_too_short(&self, value: &str, min_length: usize) -> ExtractError {
        ExtractError::StringTooShort {
            name: self.name.clone(),
            value: value.to_string(),
            min_length,
            description: self.describe(
                &messages::STRING_TOO_SHORT,
                &[value, &min_length.to_string()],
            ),
        }
    }

    /// `StringTooLong` for a string with more than `max_length` characters.
    pub fn string_too_long(&self, value: &str, max_length: usize) -> ExtractError {
        ExtractError::StringTooLong {
            name: self.name.clone(),
            value: value.to_string(),
            max_length,
            description: self.describe(
                &messages::STRING_TOO_LONG,
                &[value, &max_length.to_string()],
            ),
        }
    }

    /// `NoRegexpMatch` for a string the pattern did not match.
    pub fn no_regexp_match(&self, value: &str, pattern: &str) -> ExtractError {
        ExtractError::NoRegexpMatch {
            name: self.name.clone(),
            value: value.to_string(),
            pattern: pattern.to_string(),
            description: self.describe(&messages::NO_REGEXP_MATCH, &[value, pattern]),
        }
    }

    /// `DateBadFormat` for text that is not a date in `format`.
    pub fn date_bad_format(&self, value: &str, format: &str) -> ExtractError {
        ExtractError::DateBadFormat {
            name: self.name.clone(),
            value: value.to_string(),
            format: format.to_string(),
            description: self.describe(&messages::DATE_BAD_FORMAT, &[value, format]),
        }
    }

    /// `DateTooEarly` for a date not strictly after `limit`.
    pub fn date_too_early(&self, value: Date, limit: Date) -> ExtractError {
        ExtractError::DateTooEarly {
            name: self.name.clone(),
            value,
            limit,
            description: self.describe(
                &messages::DATE_TOO_EARLY,
                &[
                    &self.date_format.format(&value),
                    &self.date_format.format(&limit),
                ],
            ),
        }
    }

    /// `DateTooLate` for a date not strictly before `limit`.
    pub fn date_too_late(&self, value: Date, limit: Date) -> ExtractError {
        ExtractError::DateTooLate {
            name: self.name.clone(),
            value,
            limit,
            description: self.describe(
                &messages::DATE_TOO_LATE,
                &[
                    &self.date_format.format(&value),
                    &self.date_format.format(&limit),
                ],
            ),
        }
    }

    /// `OtherError` whose message is also its description.
    pub fn other(&self, message: impl Into<String>) -> ExtractError {
        let message = message.into();
        ExtractError::OtherError {
            name: self.name.clone(),
            description: self.describe(&messages::OTHER_ERROR, &[&message]),
            message,
        }
    }

    /// `BadFormat` for a built-in type.
    ///
    /// `expect_type` keeps the message's English label so equality does not
    /// depend on the catalog; only the description uses the resolved label.
    pub fn bad_format_as(&self, value: &str, expect_type: &Message) -> ExtractError {
        let label = self.messages.render(expect_type, &[]);
        ExtractError::BadFormat {
            name: self.name.clone(),
            value: value.to_string(),
            expect_type: expect_type.fallback.to_string(),
            description: self.describe(&messages::BAD_FORMAT, &[value, &label]),
        }
    }

    /// `OtherError` built from a catalog message.
    ///
    /// `message` holds the English rendering and `description` the resolved
    /// one.
    pub fn other_as(&self, message: &Message, args: &[&str]) -> ExtractError {
        let localized = self.messages.render(message, args);
        ExtractError::OtherError {
            name: self.name.clone(),
            message: messages::fill_template(message.fallback, args),
            description: self.describe(&messages::OTHER_ERROR, &[&localized]),
        }
    }

    /// Wrap a foreign error, such as a JSON decoder failure, as `OtherError`.
    pub fn from_error(&self, error: &dyn std::error::Error) -> ExtractError {
        self.other(error.to_string())
    }
}

/// A non-empty collection of extraction errors.
///
/// Uses `NonEmptyVec` from stillwater to guarantee at least one error exists.
#[derive(Debug, Clone)]
pub struct ExtractErrors(pub NonEmptyVec<ExtractError>);

impl ExtractErrors {
    /// Create from a single error.
    pub fn single(error: ExtractError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(errors: Vec<ExtractError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Get the first error (always exists).
    pub fn first(&self) -> &ExtractError {
        self.0.head()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API consistency.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over errors.
    pub fn iter(&self) -> impl Iterator<Item = &ExtractError> {
        self.0.iter()
    }

    /// Names of the values that failed, in order.
    pub fn names(&self) -> Vec<Option<&str>> {
        self.iter().map(ExtractError::name).collect()
    }
}

impl Semigroup for ExtractErrors {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<ExtractError> for ExtractErrors {
    fn from(error: ExtractError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ExtractErrors {
    type Item = ExtractError;
    type IntoIter = std::vec::IntoIter<ExtractError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl fmt::Display for ExtractErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extraction errors ({}):", self.len())?;
        for error in self.iter() {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExtractErrors {}

/// Validation result accumulating every extraction error.
pub type ExtractValidation<T> = Validation<T, ExtractErrors>;

/// Extension trait for creating failing validations easily.
pub trait ExtractValidationExt<T> {
    /// Create a failing validation with a single error.
    fn fail_with(error: ExtractError) -> ExtractValidation<T>;
}

impl<T> ExtractValidationExt<T> for ExtractValidation<T> {
    fn fail_with(error: ExtractError) -> ExtractValidation<T> {
        Validation::Failure(ExtractErrors::single(error))
    }
}
