//! Convenient re-exports for common sluice usage.
//!
//! ```
//! use sluice::prelude::*;
//!
//! let source = Extractor::new(MockEnv::new().with_env("TIMEOUT", "2.5"));
//! let timeout = source.extract("TIMEOUT").as_double().greater_than(0.0);
//! assert_eq!(timeout.required(), Ok(2.5));
//! ```
//!
//! [`UsageProvider`](crate::UsageProvider) is not part of the prelude; its
//! methods share names with [`Evaluable`].

// ============================================================================
// Stillwater re-exports
// ============================================================================

/// Result type with error accumulation. Use `Validation::all_vec()` to combine
/// the `validate()` results of several chains and collect ALL errors.
pub use stillwater::Validation;

/// Trait for combining values. `ExtractErrors` implements this for error accumulation.
pub use stillwater::Semigroup;

/// Guaranteed non-empty collection. Underlying type for `ExtractErrors`.
pub use stillwater::NonEmptyVec;

// ============================================================================
// Error types
// ============================================================================

/// A single extraction failure.
pub use crate::error::ExtractError;

/// Non-empty collection of errors. Implements `Semigroup` for accumulation.
pub use crate::error::ExtractErrors;

/// Type alias: `Validation<T, ExtractErrors>`.
pub use crate::error::ExtractValidation;

/// Extension trait for creating failing validations easily.
pub use crate::error::ExtractValidationExt;

/// Type alias: `Result<T, ExtractError>`.
pub use crate::error::ConversionResult;

// ============================================================================
// Configuration
// ============================================================================

/// Locale primitives and message lookup shared by every chain.
pub use crate::config::ParserConfig;

/// Per-extraction context passed to converters.
pub use crate::config::StepContext;

/// Number and date conventions.
pub use crate::locale::{Date, DateFormat, Locale};

/// Message catalog lookup.
pub use crate::messages::MessageResolver;

// ============================================================================
// Sources
// ============================================================================

pub use crate::env::{Extractor, Lookup, MockEnv, RealEnv};

// ============================================================================
// Chains
// ============================================================================

/// One node of an extraction chain.
pub use crate::step::ConversionStep;

/// Terminal operations: `required`, `optional`, `default_value`, `error`.
pub use crate::step::Evaluable;

/// Collects usage and errors of many chains.
pub use crate::aggregate::Aggregator;

// ============================================================================
// Pretty printing
// ============================================================================

pub use crate::pretty::{format_usage, ColorOption, PrettyPrintOptions, ValidationExt};
