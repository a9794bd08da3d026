//! Parser configuration and per-extraction context.
//!
//! [`ParserConfig`] bundles the locale primitives and the message resolver. It
//! is built once and shared read-only by every chain created from it. Each
//! call to [`ParserConfig::extract`] captures a fresh [`StepContext`] holding
//! the config, an [`ErrorBuilder`] and the [`RawValue`] being extracted.

use std::sync::Arc;

use crate::error::{ConversionResult, ErrorBuilder};
use crate::locale::{Date, DateFormat, Locale};
use crate::messages::{Message, MessageResolver};
use crate::step::ConversionStep;

/// The looked-up key and its raw string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Key the value was looked up with.
    pub name: Option<String>,
    /// The raw value, `None` when absent.
    pub value: Option<String>,
}

impl RawValue {
    pub fn new(name: Option<&str>, value: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            value: value.map(str::to_string),
        }
    }
}

/// Locale-dependent parsing primitives and message lookup.
///
/// # Example
///
/// ```
/// use sluice::prelude::*;
///
/// let config = ParserConfig::new(Locale::new("fi_FI"));
/// let port = config.extract(Some("42158"), Some("PORT")).as_int().range(1..=65535);
/// assert_eq!(port.required(), Ok(42158));
///
/// let ratio = config.extract(Some("2,5"), Some("RATIO")).as_double();
/// assert_eq!(ratio.optional(), Some(2.5));
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfig {
    locale: Locale,
    messages: MessageResolver,
    date_format: DateFormat,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(Locale::posix())
    }
}

impl ParserConfig {
    /// Config for `locale` with English messages and the locale's short date style.
    pub fn new(locale: Locale) -> Self {
        Self {
            date_format: DateFormat::new(locale.short_date_format()),
            locale,
            messages: MessageResolver::default(),
        }
    }

    /// Use `messages` to localize error descriptions and usage entries.
    pub fn with_messages(mut self, messages: MessageResolver) -> Self {
        self.messages = messages;
        self
    }

    /// Override the default date format used by
    /// [`as_locale_date`](ConversionStep::as_locale_date) and when dates are
    /// rendered into messages.
    pub fn with_date_format(mut self, format: impl Into<DateFormat>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn messages(&self) -> &MessageResolver {
        &self.messages
    }

    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    /// Parse an integer; fractional input is rejected.
    pub fn parse_int(&self, text: &str) -> Option<i64> {
        self.locale.parse_int(text)
    }

    /// Parse a decimal number using the locale's decimal separator.
    pub fn parse_double(&self, text: &str) -> Option<f64> {
        self.locale.parse_float(text)
    }

    pub fn format_double(&self, value: f64) -> String {
        self.locale.format_float(value)
    }

    pub fn parse_date(&self, text: &str, format: &DateFormat) -> Option<Date> {
        format.parse(text)
    }

    /// Format a date with the configured date format.
    pub fn format_date(&self, date: &Date) -> String {
        self.date_format.format(date)
    }

    /// Error builder for the value called `name`.
    pub fn error_builder(&self, name: Option<String>) -> ErrorBuilder {
        ErrorBuilder::new(
            name,
            self.messages.clone(),
            self.locale.clone(),
            self.date_format.clone(),
        )
    }

    /// Start a chain for `value`.
    ///
    /// The returned root step yields the value unchanged, or `ValueMissing`
    /// when `value` is `None`. Its usage is the name alone.
    pub fn extract(&self, value: Option<&str>, name: Option<&str>) -> ConversionStep<String, String> {
        let context = StepContext::new(self.clone(), RawValue::new(name, value));
        let input_context = context.clone();

        ConversionStep::new(
            move || -> ConversionResult<String> {
                match &input_context.raw().value {
                    Some(value) => Ok(value.clone()),
                    None => Err(input_context.errors().value_missing()),
                }
            },
            |value, _| Ok(value),
            |context| context.name().map(|name| vec![name.to_string()]).unwrap_or_default(),
            context,
        )
    }
}

#[derive(Debug)]
struct ContextInner {
    config: ParserConfig,
    errors: ErrorBuilder,
    raw: RawValue,
}

/// Shared, immutable context of one extraction.
///
/// Cloning is cheap; every step derived from the same root shares one context.
#[derive(Debug, Clone)]
pub struct StepContext {
    inner: Arc<ContextInner>,
}

impl StepContext {
    pub fn new(config: ParserConfig, raw: RawValue) -> Self {
        let errors = config.error_builder(raw.name.clone());
        Self {
            inner: Arc::new(ContextInner {
                config,
                errors,
                raw,
            }),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.inner.config
    }

    /// Builder for errors that carry this extraction's name.
    pub fn errors(&self) -> &ErrorBuilder {
        &self.inner.errors
    }

    /// The value as originally looked up.
    pub fn raw(&self) -> &RawValue {
        &self.inner.raw
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.raw.name.as_deref()
    }

    /// Render a usage entry through the configured message resolver.
    pub fn help_text(&self, message: &Message, args: &[&str]) -> String {
        self.inner.config.messages().render(message, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::messages;
    use crate::step::Evaluable;

    #[test]
    fn test_default_config_is_posix() {
        let config = ParserConfig::default();
        assert_eq!(config.locale(), &Locale::posix());
        assert_eq!(config.date_format().pattern(), "%m/%d/%y");
    }

    #[test]
    fn test_new_uses_locale_date_style() {
        let config = ParserConfig::new(Locale::new("fi_FI"));
        assert_eq!(config.date_format().pattern(), "%d.%m.%Y");

        let config = config.with_date_format("%Y");
        assert_eq!(config.date_format().pattern(), "%Y");
    }

    #[test]
    fn test_extract_present_value() {
        let step = ParserConfig::default().extract(Some("w"), Some("q"));
        assert_eq!(step.required(), Ok("w".to_string()));
        assert_eq!(step.usage(), vec!["q".to_string()]);
    }

    #[test]
    fn test_extract_missing_value() {
        let step = ParserConfig::default().extract(None, Some("zap"));
        match step.required() {
            Err(ExtractError::ValueMissing { name, .. }) => assert_eq!(name.as_deref(), Some("zap")),
            other => panic!("expected ValueMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_without_name() {
        let step = ParserConfig::default().extract(Some("1"), None);
        assert!(step.usage().is_empty());
        assert_eq!(step.context().name(), None);
    }

    #[test]
    fn test_context_carries_raw_value() {
        let step = ParserConfig::default().extract(Some("1"), Some("n"));
        assert_eq!(step.context().raw(), &RawValue::new(Some("n"), Some("1")));
        assert_eq!(step.context().errors().name(), Some("n"));
    }

    #[test]
    fn test_messages_flow_into_errors() {
        let config = ParserConfig::default().with_messages(MessageResolver::from_fn(
            |key, fallback| {
                if key == messages::VALUE_MISSING.key {
                    "{0} puuttuu".to_string()
                } else {
                    fallback.to_string()
                }
            },
        ));
        let error = config.extract(None, Some("PORT")).error().unwrap();
        assert_eq!(error.description(), "PORT puuttuu");
    }
}
