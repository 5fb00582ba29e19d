#![forbid(unsafe_code)]

//! Memoized parse outcomes, keyed by token identity.
//!
//! # Design
//!
//! [`ParseCache`] stores one [`ParseOutcome`] per [`Token`] in a
//! [`WeakKeyMap`], so a cached outcome never keeps its token alive. The
//! parser runs only when no outcome is cached; a failure is captured into the
//! outcome and cached like a success.
//!
//! # Invariants
//!
//! 1. The parser is invoked at most once per live token.
//! 2. Outcomes are immutable once cached. A failure is never retried.
//! 3. Parse errors never leave [`ParseCache::result_for`].

use std::error::Error;
use std::fmt;

use attrwatch_core::{Token, WeakKeyMap};

use crate::error::BoxError;

/// A captured parse error. The payload is opaque to the observer.
#[derive(Debug)]
pub struct ParseFailure {
    error: BoxError,
}

impl ParseFailure {
    #[must_use]
    pub fn new(error: BoxError) -> Self {
        Self { error }
    }

    /// The error returned by the parser.
    #[must_use]
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token parse failed: {}", self.error)
    }
}

impl Error for ParseFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// Result of parsing one token.
#[derive(Debug)]
pub enum ParseOutcome<T> {
    /// The parser produced a value.
    Value(T),
    /// The parser succeeded but produced nothing.
    Absent,
    /// The parser returned an error.
    Failed(ParseFailure),
}

impl<T> ParseOutcome<T> {
    #[must_use]
    pub fn from_result(result: Result<Option<T>, BoxError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Value(value),
            Ok(None) => Self::Absent,
            Err(error) => Self::Failed(ParseFailure::new(error)),
        }
    }

    /// The parsed value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Value(_) | Self::Absent => None,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Token → outcome memo table.
pub struct ParseCache<T> {
    outcomes: WeakKeyMap<ParseOutcome<T>>,
    log_failures: bool,
}

impl<T> Default for ParseCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ParseCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: WeakKeyMap::new(),
            log_failures: true,
        }
    }

    #[must_use]
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        Self {
            outcomes: WeakKeyMap::with_sweep_threshold(threshold),
            log_failures: true,
        }
    }

    /// Toggle the `value.parse_failed` event.
    #[must_use]
    pub fn log_failures(mut self, enabled: bool) -> Self {
        self.log_failures = enabled;
        self
    }

    /// Fetch the outcome for `token`, running `parse` first if none is
    /// cached.
    pub fn result_for(
        &mut self,
        token: &Token,
        parse: impl FnOnce(&Token) -> Result<Option<T>, BoxError>,
    ) -> &ParseOutcome<T> {
        let log_failures = self.log_failures;
        self.outcomes.get_or_insert_with(token, || {
            let outcome = ParseOutcome::from_result(parse(token));
            if let ParseOutcome::Failed(failure) = &outcome {
                note_failure(token, failure, log_failures);
            }
            outcome
        })
    }

    /// The cached outcome for `token`, without parsing.
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<&ParseOutcome<T>> {
        self.outcomes.get(token)
    }

    /// Number of cached outcomes for live tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Drop outcomes for reclaimed tokens. Returns the number removed.
    pub fn sweep(&mut self) -> usize {
        self.outcomes.sweep()
    }
}

impl<T> fmt::Debug for ParseCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseCache")
            .field("outcomes", &self.outcomes.len())
            .field("log_failures", &self.log_failures)
            .finish()
    }
}

#[cfg(feature = "tracing")]
fn note_failure(token: &Token, failure: &ParseFailure, enabled: bool) {
    if enabled {
        tracing::debug!(
            message = "value.parse_failed",
            attribute = token.attribute_name(),
            content = token.content(),
            error = %failure.error()
        );
    }
}

#[cfg(not(feature = "tracing"))]
fn note_failure(_token: &Token, _failure: &ParseFailure, _enabled: bool) {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
