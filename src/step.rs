//! The conversion step: one lazily evaluated node of an extraction chain.
//!
//! A [`ConversionStep<I, O>`] holds three functions and a shared context:
//!
//! - `input` produces the previous step's result (an `I`, or an error),
//! - `convert` turns an `I` into an `O` or fails,
//! - `help` lists the usage entries of the whole chain up to this step.
//!
//! Every combinator wraps the step it is called on into the `input` of a new
//! step; the original step is left untouched and can be used to build other
//! chains. Nothing is evaluated until a terminal operation of [`Evaluable`]
//! (`required`, `optional`, `default_value`, `error`) is called, and each call
//! walks the chain again from the root.
//!
//! # Example
//!
//! ```
//! use sluice::prelude::*;
//!
//! let config = ParserConfig::default();
//! let port = config.extract(Some("42158"), Some("PORT")).as_int();
//! let bounded = port.range(1..=1024);
//!
//! // `port` is unaffected by the refinement built on top of it.
//! assert_eq!(port.required(), Ok(42158));
//! assert!(bounded.optional().is_none());
//! assert_eq!(bounded.usage(), vec!["PORT", "Integer", "Range: 1..=1024"]);
//! ```

use std::fmt;
use std::sync::Arc;

use stillwater::Validation;

use crate::config::StepContext;
use crate::error::{ConversionResult, ExtractError, ExtractErrors, ExtractValidation};
use crate::messages;

type InputFn<I> = dyn Fn() -> ConversionResult<I> + Send + Sync;
type ConvertFn<I, O> = dyn Fn(I, &StepContext) -> ConversionResult<O> + Send + Sync;
type HelpFn = dyn Fn(&StepContext) -> Vec<String> + Send + Sync;

/// Anything that can be evaluated to a value and described for usage output.
///
/// `read` and `usage` are the only required methods; the terminal operations
/// are derived from `read`.
pub trait Evaluable {
    type Output;

    /// Evaluate the chain.
    fn read(&self) -> ConversionResult<Self::Output>;

    /// Usage entries for every step of the chain, in order.
    ///
    /// Depends only on the context, never on whether `read` would succeed.
    fn usage(&self) -> Vec<String>;

    /// The value, or the error that stopped the chain.
    fn required(&self) -> ConversionResult<Self::Output> {
        self.read().map_err(|error| {
            tracing::debug!(name = ?error.name(), kind = error.kind(), "required value rejected");
            error
        })
    }

    /// The value, or `fallback` on any failure, missing and invalid alike.
    fn default_value(&self, fallback: Self::Output) -> Self::Output {
        self.read().unwrap_or(fallback)
    }

    /// The value, or `None` on any failure, missing and invalid alike.
    fn optional(&self) -> Option<Self::Output> {
        self.read().ok()
    }

    /// The error that stops the chain, if any.
    fn error(&self) -> Option<ExtractError> {
        self.read().err()
    }

    /// The result as a stillwater `Validation`, for accumulating errors
    /// across independent values.
    fn validate(&self) -> ExtractValidation<Self::Output> {
        match self.read() {
            Ok(value) => Validation::Success(value),
            Err(error) => Validation::Failure(ExtractErrors::single(error)),
        }
    }
}

/// One node of an extraction chain, converting an `I` into an `O`.
pub struct ConversionStep<I, O> {
    input: Arc<InputFn<I>>,
    convert: Arc<ConvertFn<I, O>>,
    help: Arc<HelpFn>,
    context: StepContext,
}

impl<I, O> Clone for ConversionStep<I, O> {
    fn clone(&self) -> Self {
        Self {
            input: Arc::clone(&self.input),
            convert: Arc::clone(&self.convert),
            help: Arc::clone(&self.help),
            context: self.context.clone(),
        }
    }
}

impl<I, O> fmt::Debug for ConversionStep<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionStep")
            .field("raw", self.context.raw())
            .field("usage", &(self.help)(&self.context))
            .finish_non_exhaustive()
    }
}

impl<I, O> ConversionStep<I, O> {
    /// Assemble a step from its parts.
    pub fn new<N, C, H>(input: N, convert: C, help: H, context: StepContext) -> Self
    where
        N: Fn() -> ConversionResult<I> + Send + Sync + 'static,
        C: Fn(I, &StepContext) -> ConversionResult<O> + Send + Sync + 'static,
        H: Fn(&StepContext) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            input: Arc::new(input),
            convert: Arc::new(convert),
            help: Arc::new(help),
            context,
        }
    }

    /// The context shared by every step of this chain.
    pub fn context(&self) -> &StepContext {
        &self.context
    }

    /// A copy of this step with an extra usage entry, placed before the
    /// existing entries when `prefix` is set and after them otherwise.
    pub fn add_help(&self, text: impl Into<String>, prefix: bool) -> Self {
        let text = text.into();
        let help = Arc::clone(&self.help);
        Self {
            input: Arc::clone(&self.input),
            convert: Arc::clone(&self.convert),
            help: Arc::new(move |context| {
                let mut entries = help(context);
                if prefix {
                    entries.insert(0, text.clone());
                } else {
                    entries.push(text.clone());
                }
                entries
            }),
            context: self.context.clone(),
        }
    }
}

impl<I, O> Evaluable for ConversionStep<I, O> {
    type Output = O;

    fn read(&self) -> ConversionResult<O> {
        let value = (self.input)()?;
        (self.convert)(value, &self.context)
    }

    fn usage(&self) -> Vec<String> {
        (self.help)(&self.context)
    }
}

impl<I: 'static, O: 'static> ConversionStep<I, O> {
    /// Chain a new step reading this one's output.
    ///
    /// `help` renders the usage entry the new step appends. All built-in
    /// combinators are defined in terms of this.
    pub fn retype<N, C, H>(&self, convert: C, help: H) -> ConversionStep<O, N>
    where
        C: Fn(O, &StepContext) -> ConversionResult<N> + Send + Sync + 'static,
        H: Fn(&StepContext) -> String + Send + Sync + 'static,
    {
        let previous = self.clone();
        let previous_help = Arc::clone(&self.help);

        ConversionStep {
            input: Arc::new(move || previous.read()),
            convert: Arc::new(convert),
            help: Arc::new(move |context| {
                let mut entries = previous_help(context);
                entries.push(help(context));
                entries
            }),
            context: self.context.clone(),
        }
    }

    /// Convert with a user function.
    ///
    /// The usage entry is `help` when given, otherwise `Type: <type name>`.
    pub fn as_type<N, C>(&self, convert: C, help: Option<&str>) -> ConversionStep<O, N>
    where
        N: 'static,
        C: Fn(O, &StepContext) -> ConversionResult<N> + Send + Sync + 'static,
    {
        let help = help.map(str::to_string);
        self.retype(convert, move |context| match &help {
            Some(text) => text.clone(),
            None => context.help_text(&messages::HELP_TYPE, &[&short_type_name::<N>()]),
        })
    }

    /// Convert with a user function that signals failure with `None`.
    ///
    /// A `None` becomes `BadFormat` carrying the raw value and the target
    /// type name.
    pub fn as_type_opt<N, C>(&self, convert: C, help: Option<&str>) -> ConversionStep<O, N>
    where
        N: 'static,
        C: Fn(O, &StepContext) -> Option<N> + Send + Sync + 'static,
    {
        self.as_type(
            move |value, context| {
                convert(value, context).ok_or_else(|| {
                    let raw = context.raw().value.as_deref().unwrap_or_default();
                    context.errors().bad_format(raw, &short_type_name::<N>())
                })
            },
            help,
        )
    }
}

/// Type name with module paths removed, e.g. `HashMap<String, i64>`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            c if c.is_alphanumeric() || c == '_' => out.push(c),
            c => {
                out.push(c);
                segment_start = out.len();
            }
        }
    }

    out
}
