#![forbid(unsafe_code)]

//! Core: element and token identities, weak-keyed maps, and the notifier seam.
//!
//! Everything here is single-threaded (`Rc`-based). Identity handles compare
//! by allocation, never by content.

pub mod element;
pub mod error;
pub mod notifier;
pub mod token;
pub mod token_list;
pub mod weak_map;

pub use element::{Element, WeakElement};
pub use error::TreeError;
pub use notifier::{TokenNotifier, TokenObserverDelegate};
pub use token::Token;
pub use token_list::TokenListObserver;
pub use weak_map::{Identity, WeakKeyMap};
