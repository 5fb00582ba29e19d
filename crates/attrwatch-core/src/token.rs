#![forbid(unsafe_code)]

//! Token identities reported by a [`TokenNotifier`](crate::TokenNotifier).
//!
//! A [`Token`] is one occurrence of a word inside a space-delimited attribute
//! value on one element. Tokens are compared by identity: two tokens with the
//! same text on the same element are distinct if they were issued as distinct
//! instances. A token only holds a weak link to its element.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::{Element, WeakElement};
use crate::weak_map::Identity;

struct TokenData {
    element: WeakElement,
    attribute_name: Rc<str>,
    index: usize,
    content: String,
}

/// Shared identity for one token occurrence.
///
/// Cloning a `Token` creates a new handle to the **same** token.
#[derive(Clone)]
pub struct Token {
    data: Rc<TokenData>,
}

impl Token {
    /// Issue a fresh token for `element`.
    #[must_use]
    pub fn new(
        element: &Element,
        attribute_name: impl Into<Rc<str>>,
        index: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            data: Rc::new(TokenData {
                element: element.downgrade(),
                attribute_name: attribute_name.into(),
                index,
                content: content.into(),
            }),
        }
    }

    /// The owning element, if it is still alive.
    #[must_use]
    pub fn element(&self) -> Option<Element> {
        self.data.element.upgrade()
    }

    #[must_use]
    pub fn attribute_name(&self) -> &str {
        &self.data.attribute_name
    }

    /// Position of the token within the attribute value.
    #[must_use]
    pub fn index(&self) -> usize {
        self.data.index
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.data.content
    }

    /// Whether this token sits at `index` with text `content`. A notifier
    /// uses this to decide if a re-read token is unchanged; it is not token
    /// identity.
    #[must_use]
    pub fn is_at(&self, index: usize, content: &str) -> bool {
        self.data.index == index && self.data.content == content
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Token) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Token {}

impl Identity for Token {
    fn identity(&self) -> usize {
        Rc::as_ptr(&self.data).cast::<()>() as usize
    }

    fn downgrade_any(&self) -> Weak<dyn Any> {
        let weak: Weak<TokenData> = Rc::downgrade(&self.data);
        weak
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("attribute_name", &self.data.attribute_name)
            .field("index", &self.data.index)
            .field("content", &self.data.content)
            .field("element", &self.data.element)
            .finish()
    }
}

/// Split an attribute value into `(index, content)` pairs.
///
/// Leading and trailing whitespace is ignored and runs of ASCII whitespace
/// separate tokens.
pub fn split_tokens(value: &str) -> impl Iterator<Item = (usize, &str)> {
    value.split_ascii_whitespace().enumerate()
}
