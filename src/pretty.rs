//! Human-readable reports of usage and extraction errors.
//!
//! [`format_usage`] renders the usage lists collected by an
//! [`Aggregator`](crate::Aggregator) as an aligned table, and
//! [`ExtractErrors::format`] renders a colorized error report with fix hints,
//! redaction of sensitive values and truncation.
//!
//! # Output Format
//!
//! ```text
//! Extraction errors (3):
//!
//!     • 'PORT': Key PORT had value 0, not in range 1..=65535
//!     • 'API_KEY' = [REDACTED]: too short
//!     • 'HOST': Required value HOST wasn't found
//!
//! Hints:
//!   • Use a value in 1..=65535 for 'PORT'
//!   • Use at least 32 characters for 'API_KEY'
//!   • Set 'HOST'
//! ```

use std::io::Write;

use stillwater::Validation;

use crate::error::{ExtractError, ExtractErrors, ExtractValidation};

/// Render usage lists as a `NAME -- part. part` table.
///
/// The first entry of each list is taken as the name; names are padded to a
/// common width. The remaining entries are joined into sentences. Lists with
/// a single entry print the name alone.
///
/// ```
/// use sluice::pretty::format_usage;
///
/// let usage = vec![
///     vec!["PORT".to_string(), "Integer".to_string()],
///     vec!["DEBUG".to_string(), "True if string starts with [YyTt1-9]".to_string()],
/// ];
/// assert_eq!(
///     format_usage(&usage),
///     "PORT  -- Integer\nDEBUG -- True if string starts with [YyTt1-9]\n"
/// );
/// ```
pub fn format_usage(usage: &[Vec<String>]) -> String {
    let width = usage
        .iter()
        .filter_map(|entries| entries.first())
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entries in usage {
        let Some((name, parts)) = entries.split_first() else {
            continue;
        };
        if parts.is_empty() {
            out.push_str(name);
        } else {
            let mut description = String::new();
            for part in parts {
                if !description.is_empty() {
                    description.push_str(if description.ends_with('.') { " " } else { ". " });
                }
                description.push_str(part);
            }
            out.push_str(&format!("{:<width$} -- {}", name, description, width = width));
        }
        out.push('\n');
    }
    out
}

/// Options for pretty printing errors.
#[derive(Debug, Clone)]
pub struct PrettyPrintOptions {
    /// Enable colored output (auto-detected by default).
    pub color: ColorOption,
    /// Show fix suggestions.
    pub show_suggestions: bool,
    /// Maximum errors to display (None for all).
    pub max_errors: Option<usize>,
    /// Hide values of keys that look sensitive.
    pub redact_sensitive: bool,
}

impl Default for PrettyPrintOptions {
    fn default() -> Self {
        Self {
            color: ColorOption::Auto,
            show_suggestions: true,
            max_errors: Some(20),
            redact_sensitive: true,
        }
    }
}

impl PrettyPrintOptions {
    /// Create options with colors disabled.
    pub fn no_color() -> Self {
        Self {
            color: ColorOption::Never,
            ..Default::default()
        }
    }

    /// Create options that show all errors (no truncation).
    pub fn show_all() -> Self {
        Self {
            max_errors: None,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: ColorOption) -> Self {
        self.color = color;
        self
    }

    pub fn with_suggestions(mut self, show: bool) -> Self {
        self.show_suggestions = show;
        self
    }

    pub fn with_max_errors(mut self, max: Option<usize>) -> Self {
        self.max_errors = max;
        self
    }

    pub fn with_redaction(mut self, redact: bool) -> Self {
        self.redact_sensitive = redact;
        self
    }
}

/// Color output option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOption {
    /// Auto-detect based on terminal capability.
    Auto,
    Always,
    Never,
}

/// ANSI color codes for terminal output.
struct Colors {
    error: &'static str,
    warning: &'static str,
    name: &'static str,
    value: &'static str,
    hint: &'static str,
    reset: &'static str,
}

impl Colors {
    fn enabled() -> Self {
        Self {
            error: "\x1b[1;31m",   // bold red
            warning: "\x1b[1;33m", // bold yellow
            name: "\x1b[1;37m",    // bold white
            value: "\x1b[33m",     // yellow
            hint: "\x1b[32m",      // green
            reset: "\x1b[0m",
        }
    }

    fn disabled() -> Self {
        Self {
            error: "",
            warning: "",
            name: "",
            value: "",
            hint: "",
            reset: "",
        }
    }
}

struct ErrorPrinter<'a> {
    options: &'a PrettyPrintOptions,
    colors: Colors,
}

impl<'a> ErrorPrinter<'a> {
    fn new(options: &'a PrettyPrintOptions, use_color: bool) -> Self {
        let colors = if use_color {
            Colors::enabled()
        } else {
            Colors::disabled()
        };
        Self { options, colors }
    }

    fn print(&self, errors: &ExtractErrors, writer: &mut dyn Write) {
        let c = &self.colors;

        writeln!(
            writer,
            "\n{}Extraction errors ({}):{}\n",
            c.error,
            errors.len(),
            c.reset
        )
        .ok();

        for (shown, error) in errors.iter().enumerate() {
            if let Some(max) = self.options.max_errors {
                if shown >= max {
                    let remaining = errors.len() - shown;
                    writeln!(
                        writer,
                        "\n  {}...and {} more errors{}\n",
                        c.warning, remaining, c.reset
                    )
                    .ok();
                    return;
                }
            }
            self.print_error(error, writer);
        }
        writeln!(writer).ok();

        if self.options.show_suggestions {
            self.print_suggestions(errors, writer);
        }
    }

    fn print_error(&self, error: &ExtractError, writer: &mut dyn Write) {
        let c = &self.colors;

        match error.name() {
            // Descriptions embed the offending value, so a sensitive key
            // only shows the kind of failure.
            Some(name) if self.should_redact(error, name) => {
                writeln!(
                    writer,
                    "    {}•{} '{}{}{}' = {}[REDACTED]{}: {}",
                    c.error,
                    c.reset,
                    c.name,
                    name,
                    c.reset,
                    c.value,
                    c.reset,
                    error.kind()
                )
                .ok();
            }
            Some(name) => {
                writeln!(
                    writer,
                    "    {}•{} '{}{}{}': {}",
                    c.error, c.reset, c.name, name, c.reset, error
                )
                .ok();
            }
            None => {
                writeln!(writer, "    {}•{} {}", c.error, c.reset, error).ok();
            }
        }
    }

    fn should_redact(&self, error: &ExtractError, name: &str) -> bool {
        self.options.redact_sensitive && !error.is_missing() && is_sensitive_name(name)
    }

    fn print_suggestions(&self, errors: &ExtractErrors, writer: &mut dyn Write) {
        let c = &self.colors;
        let suggestions: Vec<_> = errors
            .iter()
            .filter_map(ExtractError::suggestion)
            .take(3)
            .collect();

        if !suggestions.is_empty() {
            writeln!(writer, "{}Hints:{}", c.hint, c.reset).ok();
            for suggestion in suggestions {
                writeln!(writer, "  • {}", suggestion).ok();
            }
            writeln!(writer).ok();
        }
    }
}

/// Whether a key name suggests its value is a secret.
fn is_sensitive_name(name: &str) -> bool {
    let sensitive_patterns = ["password", "secret", "key", "token", "credential"];
    let lower = name.to_lowercase();
    sensitive_patterns.iter().any(|p| lower.contains(p))
}

fn should_use_color(color_option: ColorOption) -> bool {
    match color_option {
        ColorOption::Always => true,
        ColorOption::Never => false,
        ColorOption::Auto => {
            use std::io::IsTerminal;
            std::io::stderr().is_terminal()
        }
    }
}

impl ExtractErrors {
    /// Pretty print errors to stderr.
    pub fn pretty_print(&self, options: &PrettyPrintOptions) {
        let use_color = should_use_color(options.color);
        let printer = ErrorPrinter::new(options, use_color);
        let mut stderr = std::io::stderr();
        printer.print(self, &mut stderr);
    }

    /// Pretty print to a string.
    ///
    /// `ColorOption::Auto` means no color here.
    pub fn format(&self, options: &PrettyPrintOptions) -> String {
        let use_color = options.color == ColorOption::Always;
        let printer = ErrorPrinter::new(options, use_color);
        let mut buf = Vec::new();
        printer.print(self, &mut buf);
        String::from_utf8(buf).unwrap_or_default()
    }

    pub fn pretty_print_default(&self) {
        self.pretty_print(&PrettyPrintOptions::default());
    }
}

/// Unwrapping helpers for [`ExtractValidation`] that report errors on the way.
pub trait ValidationExt<T> {
    /// Unwrap or pretty print errors and exit with code 1.
    ///
    /// ```no_run
    /// use sluice::prelude::*;
    ///
    /// let source = Extractor::new(RealEnv);
    /// let port = source.extract("PORT").as_int().validate().unwrap_or_exit();
    /// ```
    fn unwrap_or_exit(self) -> T;

    /// Unwrap or pretty print errors with custom options and exit.
    fn unwrap_or_exit_with(self, options: &PrettyPrintOptions) -> T;

    /// Convert to Result, pretty printing on error but not exiting.
    fn unwrap_or_print(self) -> Result<T, ExtractErrors>;
}

impl<T> ValidationExt<T> for ExtractValidation<T> {
    fn unwrap_or_exit(self) -> T {
        self.unwrap_or_exit_with(&PrettyPrintOptions::default())
    }

    fn unwrap_or_exit_with(self, options: &PrettyPrintOptions) -> T {
        match self {
            Validation::Success(value) => value,
            Validation::Failure(errors) => {
                errors.pretty_print(options);
                std::process::exit(1);
            }
        }
    }

    fn unwrap_or_print(self) -> Result<T, ExtractErrors> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(errors) => {
                errors.pretty_print_default();
                Err(errors)
            }
        }
    }
}
