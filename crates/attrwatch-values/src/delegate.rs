//! The pluggable parse-and-react strategy.

use std::fmt;
use std::str::FromStr;

use attrwatch_core::{Element, Token};

use crate::error::{BoxError, ValueParseError};

/// Supplies the parse policy and the reactions to value transitions.
pub trait ValueObserverDelegate {
    type Value: Clone;

    /// Parse a token into a value.
    ///
    /// Called at most once per token. `Ok(None)` and `Err(_)` both mean the
    /// token has no value; neither reaches the callbacks below.
    fn parse_value_for_token(&mut self, token: &Token) -> Result<Option<Self::Value>, BoxError>;

    /// A token with a value appeared on `element`.
    fn element_matched_value(&mut self, element: &Element, value: &Self::Value);

    /// A previously matched token left `element`. `value` is the one passed
    /// to the matching [`element_matched_value`](Self::element_matched_value).
    fn element_unmatched_value(&mut self, element: &Element, value: &Self::Value);
}

type ParseFn<T> = Box<dyn FnMut(&Token) -> Result<Option<T>, BoxError>>;
type ReactFn<T> = Box<dyn FnMut(&Element, &T)>;

/// A [`ValueObserverDelegate`] assembled from closures.
///
/// Reactions default to no-ops.
pub struct FnDelegate<T> {
    parse: ParseFn<T>,
    matched: ReactFn<T>,
    unmatched: ReactFn<T>,
}

impl<T: 'static> FnDelegate<T> {
    #[must_use]
    pub fn new(parse: impl FnMut(&Token) -> Result<Option<T>, BoxError> + 'static) -> Self {
        Self {
            parse: Box::new(parse),
            matched: Box::new(|_, _| {}),
            unmatched: Box::new(|_, _| {}),
        }
    }

    #[must_use]
    pub fn on_matched(mut self, f: impl FnMut(&Element, &T) + 'static) -> Self {
        self.matched = Box::new(f);
        self
    }

    #[must_use]
    pub fn on_unmatched(mut self, f: impl FnMut(&Element, &T) + 'static) -> Self {
        self.unmatched = Box::new(f);
        self
    }
}

impl<T: Clone> ValueObserverDelegate for FnDelegate<T> {
    type Value = T;

    fn parse_value_for_token(&mut self, token: &Token) -> Result<Option<T>, BoxError> {
        (self.parse)(token)
    }

    fn element_matched_value(&mut self, element: &Element, value: &T) {
        (self.matched)(element, value);
    }

    fn element_unmatched_value(&mut self, element: &Element, value: &T) {
        (self.unmatched)(element, value);
    }
}

impl<T> fmt::Debug for FnDelegate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDelegate").finish_non_exhaustive()
    }
}

/// Parse a token's content with [`FromStr`].
///
/// Empty content yields `Ok(None)`. A `FromStr` error becomes
/// [`ValueParseError::Invalid`].
///
/// # Errors
///
/// Returns the boxed [`ValueParseError`] when `T::from_str` fails.
pub fn parse_from_str<T>(token: &Token) -> Result<Option<T>, BoxError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let content = token.content();
    if content.is_empty() {
        return Ok(None);
    }
    content
        .parse::<T>()
        .map(Some)
        .map_err(|e| ValueParseError::invalid(content, e.to_string()).into())
}
