//! Collecting usage and errors across independent values.
//!
//! Settings objects usually consist of many unrelated chains, each with its
//! own output type. The [`Aggregator`] keeps a type-erased handle to every
//! registered chain so their usage can be listed together and every invalid
//! value reported in one pass.
//!
//! # Example
//!
//! ```
//! use sluice::prelude::*;
//!
//! let source = Extractor::new(MockEnv::new().with_env("PORT", "0"));
//! let mut settings = Aggregator::new();
//!
//! let port = settings.add(source.extract("PORT").as_int().range(1..=65535));
//! let host = settings.add(source.extract("HOST").min_length(1));
//!
//! assert_eq!(settings.errors().len(), 2);
//! assert_eq!(settings.usage()[0], vec!["PORT", "Integer", "Range: 1..=65535"]);
//! assert!(port.optional().is_none());
//! assert!(host.optional().is_none());
//! ```

use std::fmt;

use stillwater::Validation;

use crate::error::{ExtractError, ExtractErrors, ExtractValidation};
use crate::pretty::format_usage;
use crate::step::Evaluable;

/// The type-erased view of a chain the aggregator needs.
pub trait UsageProvider: Send + Sync {
    fn usage(&self) -> Vec<String>;
    fn error(&self) -> Option<ExtractError>;
}

impl<E> UsageProvider for E
where
    E: Evaluable + Send + Sync,
{
    fn usage(&self) -> Vec<String> {
        Evaluable::usage(self)
    }

    fn error(&self) -> Option<ExtractError> {
        Evaluable::error(self)
    }
}

/// Registry of independently typed chains.
#[derive(Default)]
pub struct Aggregator {
    steps: Vec<Box<dyn UsageProvider>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `step` and hand it back for further use.
    pub fn add<E>(&mut self, step: E) -> E
    where
        E: Evaluable + Clone + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step.clone()));
        step
    }

    /// Usage of every registered chain, in registration order.
    pub fn usage(&self) -> Vec<Vec<String>> {
        self.steps
            .iter()
            .map(|step| UsageProvider::usage(step.as_ref()))
            .collect()
    }

    /// Every error, in registration order.
    ///
    /// Each chain is evaluated exactly once; a failure never stops the
    /// remaining chains from being checked.
    pub fn errors(&self) -> Vec<ExtractError> {
        let errors: Vec<ExtractError> = self
            .steps
            .iter()
            .filter_map(|step| UsageProvider::error(step.as_ref()))
            .collect();
        tracing::debug!(
            checked = self.steps.len(),
            failed = errors.len(),
            "collected extraction errors"
        );
        errors
    }

    /// `Success` when every chain succeeds, otherwise all errors accumulated.
    pub fn validate(&self) -> ExtractValidation<()> {
        match ExtractErrors::from_vec(self.errors()) {
            None => Validation::Success(()),
            Some(errors) => Validation::Failure(errors),
        }
    }

    /// Aligned usage table of every registered chain.
    pub fn help_text(&self) -> String {
        format_usage(&self.usage())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("usage", &self.usage())
            .finish()
    }
}
