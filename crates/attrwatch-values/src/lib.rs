#![forbid(unsafe_code)]

//! Typed values parsed from attribute tokens.
//!
//! - [`ParseCache`]: parses each token at most once, capturing failures.
//! - [`ValueTracker`]: per-element record of values reported as matched.
//! - [`ValueListObserver`]: drives both from a token notifier and forwards
//!   value transitions to a [`ValueObserverDelegate`].
//!
//! # Example
//!
//! ```
//! use attrwatch_core::Element;
//! use attrwatch_values::{FnDelegate, ValueListObserver, parse_from_str};
//!
//! let root = Element::new("div").with_attribute("data-ports", "80 443 nope");
//! let mut observer = ValueListObserver::new(root, "data-ports", FnDelegate::new(parse_from_str::<u16>));
//! observer.start();
//! assert_eq!(observer.matched_count(), 2);
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod observer;
pub mod parse_cache;
pub mod value_tracker;

pub use config::ObserverConfig;
pub use delegate::{FnDelegate, ValueObserverDelegate, parse_from_str};
pub use error::{BoxError, ConfigError, ValueParseError};
pub use observer::ValueListObserver;
pub use parse_cache::{ParseCache, ParseFailure, ParseOutcome};
pub use value_tracker::ValueTracker;
