//! Property-based invariant tests for `TokenListObserver`.
//!
//! 1. A token is reported unmatched only after it was reported matched, and
//!    at most once.
//! 2. After every started refresh, the reported tokens of each element equal
//!    the split attribute value, position by position.
//! 3. Unchanged attribute values produce no reports.

use attrwatch_core::{Element, Token, TokenListObserver, TokenNotifier, TokenObserverDelegate};
use proptest::prelude::*;

const ATTR: &str = "class";

#[derive(Default)]
struct Audit {
    live: Vec<Token>,
    reports: usize,
    violations: Vec<String>,
}

impl TokenObserverDelegate for Audit {
    fn token_matched(&mut self, token: &Token) {
        self.reports += 1;
        if self.live.iter().any(|t| t.ptr_eq(token)) {
            self.violations
                .push(format!("{:?} matched twice", token.content()));
        }
        self.live.push(token.clone());
    }

    fn token_unmatched(&mut self, token: &Token) {
        self.reports += 1;
        match self.live.iter().position(|t| t.ptr_eq(token)) {
            Some(pos) => {
                self.live.remove(pos);
            }
            None => self
                .violations
                .push(format!("{:?} unmatched while not live", token.content())),
        }
    }
}

fn value_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c"), Just("  ")], 0..6)
            .prop_map(|parts| parts.join(" ")),
    )
}

fn apply(el: &Element, value: &Option<String>) {
    match value {
        Some(v) => {
            el.set_attribute(ATTR, v.as_str());
        }
        None => {
            el.remove_attribute(ATTR);
        }
    }
}

proptest! {
    #[test]
    fn reported_tokens_track_attribute(
        steps in prop::collection::vec((0usize..3, value_strategy(), proptest::bool::ANY), 1..30),
    ) {
        let root = Element::new("root");
        let a = Element::new("a");
        let b = Element::new("b");
        root.append_child(&a).unwrap();
        a.append_child(&b).unwrap();
        let elements = [root.clone(), a, b];

        let mut observer = TokenListObserver::new(root, ATTR);
        let mut audit = Audit::default();
        observer.start(&mut audit);

        for (target, value, refresh_twice) in steps {
            apply(&elements[target], &value);
            observer.refresh(&mut audit);

            for el in &elements {
                let expected: Vec<String> = el
                    .get_attribute(ATTR)
                    .map(|v| v.split_ascii_whitespace().map(str::to_string).collect())
                    .unwrap_or_default();
                let reported: Vec<String> = observer
                    .tokens_for_element(el)
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        assert_eq!(t.index(), i);
                        t.content().to_string()
                    })
                    .collect();
                prop_assert_eq!(reported, expected);
            }

            if refresh_twice {
                let before = audit.reports;
                observer.refresh(&mut audit);
                prop_assert_eq!(audit.reports, before);
            }

            prop_assert!(audit.violations.is_empty(), "{:?}", audit.violations);
            prop_assert_eq!(audit.live.len(), observer.matched_token_count());
        }
    }
}
