#![forbid(unsafe_code)]

//! Reference [`TokenNotifier`] over an in-memory element tree.
//!
//! # Design
//!
//! [`TokenListObserver`] watches a root element and every descendant that
//! carries the watched attribute. It does not detect mutations itself: the
//! host edits the tree and then calls [`refresh`](TokenNotifier::refresh).
//!
//! On refresh each matching element's attribute value is split into
//! `(index, content)` pairs and compared with the tokens reported last time.
//! From the first position where the two lists differ, the old tail is
//! reported unmatched and a freshly issued tail is reported matched. Elements
//! that lost the attribute or left the subtree have all of their tokens
//! reported unmatched.
//!
//! # Invariants
//!
//! 1. Every reported-matched token is reported unmatched at most once.
//! 2. Unchanged prefixes keep their token identities across refreshes.
//! 3. No transitions are reported while stopped.

use std::rc::Rc;

use crate::notifier::{TokenNotifier, TokenObserverDelegate};
use crate::token::split_tokens;
use crate::{Element, Token};

struct TrackedElement {
    element: Element,
    tokens: Vec<Token>,
}

/// Watches `attribute_name` on an element subtree and reports token drift.
pub struct TokenListObserver {
    element: Element,
    attribute_name: Rc<str>,
    started: bool,
    tracked: Vec<TrackedElement>,
}

impl TokenListObserver {
    #[must_use]
    pub fn new(element: Element, attribute_name: impl Into<Rc<str>>) -> Self {
        Self {
            element,
            attribute_name: attribute_name.into(),
            started: false,
            tracked: Vec::new(),
        }
    }

    /// Tokens currently reported as matched for `element`.
    #[must_use]
    pub fn tokens_for_element(&self, element: &Element) -> &[Token] {
        self.tracked
            .iter()
            .find(|t| t.element.ptr_eq(element))
            .map(|t| t.tokens.as_slice())
            .unwrap_or_default()
    }

    /// Total number of tokens currently reported as matched.
    #[must_use]
    pub fn matched_token_count(&self) -> usize {
        self.tracked.iter().map(|t| t.tokens.len()).sum()
    }

    fn matching_elements(&self) -> Vec<Element> {
        self.element
            .subtree()
            .into_iter()
            .filter(|el| el.has_attribute(&self.attribute_name))
            .collect()
    }

    fn refresh_element(
        &self,
        tracked: &mut TrackedElement,
        delegate: &mut dyn TokenObserverDelegate,
    ) {
        let value = tracked
            .element
            .get_attribute(&self.attribute_name)
            .unwrap_or_default();
        let fresh: Vec<(usize, &str)> = split_tokens(&value).collect();

        let first_difference = tracked
            .tokens
            .iter()
            .zip(&fresh)
            .position(|(old, (index, content))| !old.is_at(*index, content))
            .unwrap_or_else(|| tracked.tokens.len().min(fresh.len()));

        if first_difference == tracked.tokens.len() && first_difference == fresh.len() {
            return;
        }

        let stale = tracked.tokens.split_off(first_difference);
        report_unmatched(delegate, &stale);

        let issued: Vec<Token> = fresh[first_difference..]
            .iter()
            .map(|(index, content)| {
                Token::new(
                    &tracked.element,
                    Rc::clone(&self.attribute_name),
                    *index,
                    *content,
                )
            })
            .collect();
        tracked.tokens.extend(issued.iter().cloned());
        report_matched(delegate, &issued);
    }
}

impl TokenNotifier for TokenListObserver {
    fn element(&self) -> &Element {
        &self.element
    }

    fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    fn started(&self) -> bool {
        self.started
    }

    fn start(&mut self, delegate: &mut dyn TokenObserverDelegate) {
        if !self.started {
            self.started = true;
            self.refresh(delegate);
        }
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn refresh(&mut self, delegate: &mut dyn TokenObserverDelegate) {
        if !self.started {
            return;
        }

        let current = self.matching_elements();
        let mut previous = std::mem::take(&mut self.tracked);

        previous.retain(|tracked| {
            let still_matching = current.iter().any(|el| el.ptr_eq(&tracked.element));
            if !still_matching {
                report_unmatched(delegate, &tracked.tokens);
            }
            still_matching
        });

        let mut next = Vec::with_capacity(current.len());
        for element in current {
            let mut tracked = match previous.iter().position(|t| t.element.ptr_eq(&element)) {
                Some(pos) => previous.swap_remove(pos),
                None => TrackedElement {
                    element,
                    tokens: Vec::new(),
                },
            };
            self.refresh_element(&mut tracked, delegate);
            next.push(tracked);
        }
        self.tracked = next;
    }
}

impl std::fmt::Debug for TokenListObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenListObserver")
            .field("element", &self.element.tag_name())
            .field("attribute_name", &self.attribute_name)
            .field("started", &self.started)
            .field("matched_tokens", &self.matched_token_count())
            .finish()
    }
}

fn report_matched(delegate: &mut dyn TokenObserverDelegate, tokens: &[Token]) {
    for token in tokens {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "tokens.matched",
            attribute = token.attribute_name(),
            index = token.index(),
            content = token.content()
        );
        delegate.token_matched(token);
    }
}

fn report_unmatched(delegate: &mut dyn TokenObserverDelegate, tokens: &[Token]) {
    for token in tokens {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "tokens.unmatched",
            attribute = token.attribute_name(),
            index = token.index(),
            content = token.content()
        );
        delegate.token_unmatched(token);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
