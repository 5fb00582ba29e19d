#![forbid(unsafe_code)]

//! Per-element record of values currently reported as matched.
//!
//! A `(element, token)` pair is present iff its value has been reported
//! matched and not yet reported unmatched. Buckets are created on the first
//! match for an element and dropped when they empty out. Both levels are
//! weakly keyed.

use std::fmt;

use attrwatch_core::{Element, Token, WeakKeyMap};

pub struct ValueTracker<T> {
    by_element: WeakKeyMap<WeakKeyMap<T>>,
    sweep_threshold: usize,
}

impl<T> Default for ValueTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueTracker<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_threshold(attrwatch_core::weak_map::DEFAULT_SWEEP_THRESHOLD)
    }

    #[must_use]
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        Self {
            by_element: WeakKeyMap::with_sweep_threshold(threshold),
            sweep_threshold: threshold,
        }
    }

    /// Track `value` for `token` under `element`. Returns the value that was
    /// already tracked for the pair, if any.
    pub fn record_match(&mut self, element: &Element, token: &Token, value: T) -> Option<T> {
        let threshold = self.sweep_threshold;
        self.by_element
            .get_or_insert_with(element, || WeakKeyMap::with_sweep_threshold(threshold))
            .insert(token, value)
    }

    /// Stop tracking the pair. Returns the removed value; `None` means the
    /// pair was not tracked.
    pub fn clear_match(&mut self, element: &Element, token: &Token) -> Option<T> {
        let bucket = self.by_element.get_mut(element)?;
        let removed = bucket.remove(token);
        if bucket.is_empty() {
            self.by_element.remove(element);
        }
        removed
    }

    #[must_use]
    pub fn has_match(&self, element: &Element, token: &Token) -> bool {
        self.by_element
            .get(element)
            .is_some_and(|bucket| bucket.contains_key(token))
    }

    #[must_use]
    pub fn value_for(&self, element: &Element, token: &Token) -> Option<&T> {
        self.by_element.get(element)?.get(token)
    }

    /// Values tracked for `element`, in unspecified order.
    pub fn values_for_element(&self, element: &Element) -> impl Iterator<Item = &T> {
        self.by_element
            .get(element)
            .into_iter()
            .flat_map(WeakKeyMap::values)
    }

    /// Number of tracked pairs whose element and token are both alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_element.values().map(WeakKeyMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries for reclaimed elements and tokens. Returns the number of
    /// map entries removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = self.by_element.sweep();
        // Buckets of live elements may still hold dead tokens.
        for bucket in self.by_element.values_mut() {
            removed += bucket.sweep();
        }
        self.by_element.retain(|bucket| !bucket.is_empty());
        removed
    }
}

impl<T> fmt::Debug for ValueTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueTracker")
            .field("tracked", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_clear() {
        let el = Element::new("div");
        let token = Token::new(&el, "data-v", 0, "a");
        let mut tracker = ValueTracker::new();

        assert!(!tracker.has_match(&el, &token));
        assert_eq!(tracker.record_match(&el, &token, "A"), None);
        assert!(tracker.has_match(&el, &token));
        assert_eq!(tracker.value_for(&el, &token), Some(&"A"));

        assert_eq!(tracker.clear_match(&el, &token), Some("A"));
        assert!(!tracker.has_match(&el, &token));
        assert!(tracker.is_empty());
    }

    #[test]
    fn clear_absent_is_noop() {
        let el = Element::new("div");
        let token = Token::new(&el, "data-v", 0, "a");
        let mut tracker: ValueTracker<u8> = ValueTracker::new();
        assert_eq!(tracker.clear_match(&el, &token), None);
        tracker.record_match(&el, &token, 1);
        assert_eq!(tracker.clear_match(&el, &token), Some(1));
        assert_eq!(tracker.clear_match(&el, &token), None);
    }

    #[test]
    fn rerecord_overwrites() {
        let el = Element::new("div");
        let token = Token::new(&el, "data-v", 0, "a");
        let mut tracker = ValueTracker::new();
        tracker.record_match(&el, &token, 1);
        assert_eq!(tracker.record_match(&el, &token, 1), Some(1));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn tokens_with_equal_values_are_independent() {
        let el = Element::new("div");
        let a = Token::new(&el, "data-v", 0, "x");
        let b = Token::new(&el, "data-v", 1, "x");
        let mut tracker = ValueTracker::new();
        tracker.record_match(&el, &a, 5);
        tracker.record_match(&el, &b, 5);
        tracker.clear_match(&el, &a);
        assert!(tracker.has_match(&el, &b));
        assert_eq!(tracker.values_for_element(&el).copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn buckets_are_per_element() {
        let e1 = Element::new("a");
        let e2 = Element::new("b");
        let t1 = Token::new(&e1, "data-v", 0, "x");
        let t2 = Token::new(&e2, "data-v", 0, "x");
        let mut tracker = ValueTracker::new();
        tracker.record_match(&e1, &t1, 1);
        tracker.record_match(&e2, &t2, 2);
        assert!(!tracker.has_match(&e1, &t2));
        assert_eq!(tracker.values_for_element(&e2).copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn sweep_drops_reclaimed_tokens() {
        let el = Element::new("div");
        let keep = Token::new(&el, "data-v", 0, "k");
        let mut tracker = ValueTracker::new();
        tracker.record_match(&el, &keep, 1);
        {
            let gone = Token::new(&el, "data-v", 1, "g");
            tracker.record_match(&el, &gone, 2);
        }
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.sweep(), 1);
        assert!(tracker.has_match(&el, &keep));
    }

    #[test]
    fn sweep_drops_reclaimed_elements() {
        let mut tracker = ValueTracker::new();
        {
            let el = Element::new("div");
            let token = Token::new(&el, "data-v", 0, "a");
            tracker.record_match(&el, &token, 1);
        }
        assert!(tracker.is_empty());
        assert_eq!(tracker.sweep(), 1);
    }
}
