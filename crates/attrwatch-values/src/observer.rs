#![forbid(unsafe_code)]

//! Typed-value observer over a token notifier.
//!
//! # Design
//!
//! [`ValueListObserver`] owns a [`TokenNotifier`] and receives its token
//! transitions. Each token is parsed once through a [`ParseCache`]; tokens
//! with a value are recorded in a [`ValueTracker`] and forwarded to the
//! [`ValueObserverDelegate`].
//!
//! Lifecycle calls (`start`, `stop`, `refresh`) pass straight through to the
//! notifier. `stop` is a pause: cached outcomes and tracked values survive it.
//!
//! # Invariants
//!
//! 1. The delegate's parser runs at most once per token.
//! 2. `element_matched_value` fires only when a pair enters the tracker, and
//!    the pair is recorded before the callback runs.
//! 3. `element_unmatched_value` fires only when a pair leaves the tracker, so
//!    it never fires more often than `element_matched_value` for a token.
//! 4. Tokens without a value (absent or failed) produce no callbacks.
//!
//! # Failure Modes
//!
//! - **Parser returns `Err`**: captured in the cache, never retried, and the
//!   token behaves as if it were never present.
//! - **Element dropped**: tokens whose element is gone produce no callbacks;
//!   their tracker entries are reclaimed on the next sweep.

use attrwatch_core::{Element, Token, TokenListObserver, TokenNotifier, TokenObserverDelegate};

use crate::config::ObserverConfig;
use crate::delegate::ValueObserverDelegate;
use crate::error::ConfigError;
use crate::parse_cache::{ParseCache, ParseOutcome};
use crate::value_tracker::ValueTracker;

/// The part of the observer the notifier calls into.
struct ValueDispatch<D: ValueObserverDelegate> {
    delegate: D,
    parse_cache: ParseCache<D::Value>,
    tracker: ValueTracker<D::Value>,
}

impl<D: ValueObserverDelegate> ValueDispatch<D> {
    fn new(delegate: D, config: &ObserverConfig) -> Self {
        Self {
            delegate,
            parse_cache: ParseCache::with_sweep_threshold(config.sweep_threshold)
                .log_failures(config.log_parse_failures),
            tracker: ValueTracker::with_sweep_threshold(config.sweep_threshold),
        }
    }

    fn outcome_for(&mut self, token: &Token) -> &ParseOutcome<D::Value> {
        self.parse_cache
            .result_for(token, |t| self.delegate.parse_value_for_token(t))
    }
}

impl<D: ValueObserverDelegate> TokenObserverDelegate for ValueDispatch<D> {
    fn token_matched(&mut self, token: &Token) {
        let Some(value) = self.outcome_for(token).value().cloned() else {
            return;
        };
        let Some(element) = token.element() else {
            return;
        };
        let previous = self.tracker.record_match(&element, token, value.clone());
        if previous.is_none() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                message = "value.matched",
                element = element.tag_name(),
                content = token.content()
            );
            self.delegate.element_matched_value(&element, &value);
        }
    }

    fn token_unmatched(&mut self, token: &Token) {
        let Some(value) = self.outcome_for(token).value().cloned() else {
            return;
        };
        let Some(element) = token.element() else {
            return;
        };
        if self.tracker.clear_match(&element, token).is_some() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                message = "value.unmatched",
                element = element.tag_name(),
                content = token.content()
            );
            self.delegate.element_unmatched_value(&element, &value);
        }
    }
}

/// Watches an attribute's tokens and reports the values parsed from them.
///
/// `N` is the notifier; by default a [`TokenListObserver`] over an element
/// subtree.
pub struct ValueListObserver<D: ValueObserverDelegate, N = TokenListObserver> {
    notifier: N,
    dispatch: ValueDispatch<D>,
}

impl<D: ValueObserverDelegate> ValueListObserver<D, TokenListObserver> {
    /// Watch `attribute_name` on `element` and its descendants.
    #[must_use]
    pub fn new(element: Element, attribute_name: &str, delegate: D) -> Self {
        Self::with_notifier(TokenListObserver::new(element, attribute_name), delegate)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn with_config(
        element: Element,
        attribute_name: &str,
        delegate: D,
        config: ObserverConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_notifier_and_config(
            TokenListObserver::new(element, attribute_name),
            delegate,
            config,
        )
    }
}

impl<D: ValueObserverDelegate, N: TokenNotifier> ValueListObserver<D, N> {
    /// Drive the observer from a custom notifier.
    #[must_use]
    pub fn with_notifier(notifier: N, delegate: D) -> Self {
        Self {
            notifier,
            dispatch: ValueDispatch::new(delegate, &ObserverConfig::default()),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn with_notifier_and_config(
        notifier: N,
        delegate: D,
        config: ObserverConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            notifier,
            dispatch: ValueDispatch::new(delegate, &config),
        })
    }

    /// Whether the notifier is watching.
    #[must_use]
    pub fn started(&self) -> bool {
        self.notifier.started()
    }

    pub fn start(&mut self) {
        self.notifier.start(&mut self.dispatch);
    }

    /// Pause. Cached outcomes and tracked values are kept.
    pub fn stop(&mut self) {
        self.notifier.stop();
    }

    /// Have the notifier re-read the attribute and report any drift.
    pub fn refresh(&mut self) {
        self.notifier.refresh(&mut self.dispatch);
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        self.notifier.element()
    }

    #[must_use]
    pub fn attribute_name(&self) -> &str {
        self.notifier.attribute_name()
    }

    /// Inbound: the notifier saw `token` appear.
    pub fn token_matched(&mut self, token: &Token) {
        self.dispatch.token_matched(token);
    }

    /// Inbound: the notifier saw `token` disappear.
    pub fn token_unmatched(&mut self, token: &Token) {
        self.dispatch.token_unmatched(token);
    }

    /// The value currently tracked for `token`.
    #[must_use]
    pub fn value_for_token(&self, token: &Token) -> Option<&D::Value> {
        let element = token.element()?;
        self.dispatch.tracker.value_for(&element, token)
    }

    /// Values currently tracked for `element`, in unspecified order.
    #[must_use]
    pub fn values_for_element(&self, element: &Element) -> Vec<D::Value> {
        self.dispatch
            .tracker
            .values_for_element(element)
            .cloned()
            .collect()
    }

    /// Number of tracked `(element, token)` pairs.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.dispatch.tracker.len()
    }

    /// Number of cached parse outcomes for live tokens.
    #[must_use]
    pub fn parse_count(&self) -> usize {
        self.dispatch.parse_cache.len()
    }

    /// The cached outcome for `token`, without parsing.
    #[must_use]
    pub fn outcome_for(&self, token: &Token) -> Option<&ParseOutcome<D::Value>> {
        self.dispatch.parse_cache.get(token)
    }

    /// Drop cache and tracker entries for reclaimed tokens and elements.
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        self.dispatch.parse_cache.sweep() + self.dispatch.tracker.sweep()
    }

    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.dispatch.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.dispatch.delegate
    }

    #[must_use]
    pub fn into_delegate(self) -> D {
        self.dispatch.delegate
    }
}

impl<D: ValueObserverDelegate, N: TokenNotifier> TokenObserverDelegate for ValueListObserver<D, N> {
    fn token_matched(&mut self, token: &Token) {
        self.dispatch.token_matched(token);
    }

    fn token_unmatched(&mut self, token: &Token) {
        self.dispatch.token_unmatched(token);
    }
}

impl<D: ValueObserverDelegate, N: TokenNotifier> std::fmt::Debug for ValueListObserver<D, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueListObserver")
            .field("element", &self.element().tag_name())
            .field("attribute_name", &self.attribute_name())
            .field("started", &self.started())
            .field("parse_cache", &self.dispatch.parse_cache)
            .field("tracker", &self.dispatch.tracker)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
