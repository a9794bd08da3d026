// Extraction errors carry their rendered description and semantic fields
#![allow(clippy::result_large_err)]

//! Sluice: lazy, composable extraction and validation of string values.
//!
//! Settings usually arrive as strings: environment variables, `.env` files,
//! query parameters. Sluice turns each one into a typed value through a chain
//! of conversions and checks that
//!
//! - runs only when a terminal operation asks for the value,
//! - yields either the value or a structured, localizable [`ExtractError`],
//! - describes every step it applies, so `--help` style documentation can be
//!   produced before any input exists.
//!
//! # Quick Start
//!
//! ```
//! use sluice::prelude::*;
//!
//! let env = MockEnv::new()
//!     .with_env("PORT", "42158")
//!     .with_env("NAME", "ab");
//! let source = Extractor::new(env);
//!
//! let port = source.extract("PORT").as_int().range(1..=65535);
//! assert_eq!(port.required(), Ok(42158));
//! assert_eq!(port.usage(), vec!["PORT", "Integer", "Range: 1..=65535"]);
//!
//! let name = source.extract("NAME").min_length(3);
//! assert_eq!(name.default_value("anonymous".to_string()), "anonymous");
//! assert!(matches!(name.error(), Some(ExtractError::StringTooShort { .. })));
//! ```
//!
//! # Reporting every invalid value
//!
//! ```
//! use sluice::prelude::*;
//!
//! let source = Extractor::new(MockEnv::new().with_env("RATIO", "x"));
//! let mut settings = Aggregator::new();
//! let ratio = settings.add(source.extract("RATIO").as_double());
//! let key = settings.add(source.extract("API_KEY").min_length(32));
//!
//! let errors = settings.errors();
//! assert_eq!(errors.len(), 2);
//! assert!(ratio.optional().is_none() && key.optional().is_none());
//! print!("{}", settings.help_text());
//! ```
//!
//! # Module Structure
//!
//! - [`prelude`]: Convenient re-exports for common usage
//! - [`config`]: `ParserConfig`, `StepContext` and the root `extract`
//! - [`step`]: `ConversionStep` and the `Evaluable` terminal operations
//! - [`combinators`]: built-in conversions and validations
//! - [`aggregate`]: `Aggregator` for usage and error collection
//! - [`error`]: `ExtractError`, `ExtractErrors`, `ExtractValidation`
//! - [`mod@env`]: `Lookup` sources and the key-based `Extractor`
//! - [`locale`] and [`messages`]: number, date and message localization
//! - [`pretty`]: usage tables and error reports
//!
//! # Stillwater Integration
//!
//! | Type | Usage |
//! |------|-------|
//! | `Validation<T, E>` | `Evaluable::validate` and `Aggregator::validate` |
//! | `NonEmptyVec<T>` | Guaranteed non-empty error lists in `ExtractErrors` |
//! | `Semigroup` | Combining errors of independent values |

pub mod aggregate;
pub mod combinators;
pub mod config;
pub mod env;
pub mod error;
pub mod locale;
pub mod messages;
pub mod prelude;
pub mod pretty;
pub mod step;

// Re-exports for convenience
pub use aggregate::{Aggregator, UsageProvider};
pub use config::{ParserConfig, RawValue, StepContext};
pub use env::{Extractor, Lookup, MockEnv, RealEnv};
pub use error::{
    ConversionResult, ErrorBuilder, ExtractError, ExtractErrors, ExtractValidation,
    ExtractValidationExt, IntRange,
};
pub use locale::{Date, DateFormat, Locale};
pub use messages::{Message, MessageResolver};
pub use pretty::{format_usage, ColorOption, PrettyPrintOptions, ValidationExt};
pub use step::{short_type_name, ConversionStep, Evaluable};

// Re-export stillwater types that are commonly used
pub use stillwater::{NonEmptyVec, Semigroup, Validation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let _: ExtractValidation<()> = Validation::Success(());
        let _ = ParserConfig::default().extract(Some("1"), None).as_int();
    }
}
