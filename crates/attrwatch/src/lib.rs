#![forbid(unsafe_code)]

//! attrwatch public facade crate.
//!
//! This crate provides the stable surface area for users.

pub use attrwatch_core::{
    Element, Token, TokenListObserver, TokenNotifier, TokenObserverDelegate, TreeError,
};
pub use attrwatch_values::{
    BoxError, ConfigError, FnDelegate, ObserverConfig, ParseOutcome, ValueListObserver,
    ValueObserverDelegate, ValueParseError, parse_from_str,
};

pub mod prelude {
    pub use attrwatch_core as core;
    pub use attrwatch_values as values;

    pub use crate::{
        Element, FnDelegate, TokenNotifier, ValueListObserver, ValueObserverDelegate,
        parse_from_str,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn prelude_covers_the_common_path() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let root = Element::new("nav").with_attribute("data-tabindex", "3 1 two");
        let delegate = FnDelegate::new(parse_from_str::<i32>)
            .on_matched(move |_, v| sink.borrow_mut().push(*v));
        let mut observer = ValueListObserver::new(root, "data-tabindex", delegate);
        observer.start();
        assert!(observer.started());
        assert_eq!(*seen.borrow(), vec![3, 1]);
    }
}
