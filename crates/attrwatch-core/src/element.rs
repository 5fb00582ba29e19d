#![forbid(unsafe_code)]

//! Shared, identity-compared element handles.
//!
//! # Design
//!
//! An [`Element`] is a cheap handle (`Rc`) to a node holding a tag name, an
//! ordered attribute map, ordered children, and a weak link to its parent.
//! Cloning a handle never clones the node. Two handles are the same element
//! iff they point at the same allocation; content is never compared.
//!
//! Parents own their children; children only hold a [`Weak`] back-link, so a
//! detached subtree is reclaimed as soon as the last outside handle drops.
//!
//! # Invariants
//!
//! 1. An element has at most one parent.
//! 2. The parent chain never contains a cycle ([`Element::append_child`]
//!    rejects ancestors).
//! 3. [`Element::subtree`] yields nodes in pre-order, the receiver first.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::TreeError;
use crate::weak_map::Identity;

struct ElementNode {
    tag_name: String,
    attributes: RefCell<BTreeMap<String, String>>,
    children: RefCell<Vec<Element>>,
    parent: RefCell<Weak<ElementNode>>,
}

/// Handle to a DOM-like node.
///
/// Cloning an `Element` creates a new handle to the **same** node.
#[derive(Clone)]
pub struct Element {
    node: Rc<ElementNode>,
}

/// Non-owning element handle.
#[derive(Clone, Default)]
pub struct WeakElement {
    node: Weak<ElementNode>,
}

impl Element {
    /// Create a detached element with no attributes or children.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            node: Rc::new(ElementNode {
                tag_name: tag_name.into(),
                attributes: RefCell::new(BTreeMap::new()),
                children: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
            }),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.node.tag_name
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.node.attributes.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.node.attributes.borrow().contains_key(name)
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.node
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into())
    }

    /// Remove an attribute, returning its last value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.node.attributes.borrow_mut().remove(name)
    }

    /// Append `child` as the last child of `self`.
    ///
    /// The child is detached from its previous parent first.
    ///
    /// # Errors
    ///
    /// [`TreeError::SelfChild`] when `child` is `self`, and
    /// [`TreeError::Cycle`] when `child` is an ancestor of `self`.
    pub fn append_child(&self, child: &Element) -> Result<(), TreeError> {
        if self.ptr_eq(child) {
            return Err(TreeError::SelfChild {
                tag_name: self.tag_name().to_owned(),
            });
        }
        if child.contains(self) {
            return Err(TreeError::Cycle {
                parent: self.tag_name().to_owned(),
                child: child.tag_name().to_owned(),
            });
        }
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child);
        }
        *child.node.parent.borrow_mut() = Rc::downgrade(&self.node);
        self.node.children.borrow_mut().push(child.clone());
        Ok(())
    }

    /// Detach `child` from `self`. Returns `false` if it was not a child.
    pub fn remove_child(&self, child: &Element) -> bool {
        let mut children = self.node.children.borrow_mut();
        let Some(pos) = children.iter().position(|c| c.ptr_eq(child)) else {
            return false;
        };
        children.remove(pos);
        *child.node.parent.borrow_mut() = Weak::new();
        true
    }

    /// Snapshot of the current children.
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.node.children.borrow().clone()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Element> {
        self.node
            .parent
            .borrow()
            .upgrade()
            .map(|node| Element { node })
    }

    /// Whether `other` is `self` or one of its descendants.
    #[must_use]
    pub fn contains(&self, other: &Element) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(el) = cursor {
            if el.ptr_eq(self) {
                return true;
            }
            cursor = el.parent();
        }
        false
    }

    /// `self` followed by every descendant, in pre-order.
    #[must_use]
    pub fn subtree(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(el) = stack.pop() {
            stack.extend(el.children().into_iter().rev());
            out.push(el);
        }
        out
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            node: Rc::downgrade(&self.node),
        }
    }
}

impl WeakElement {
    #[must_use]
    pub fn upgrade(&self) -> Option<Element> {
        self.node.upgrade().map(|node| Element { node })
    }

    /// Whether the element is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.node.strong_count() > 0
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Element {}

impl Identity for Element {
    fn identity(&self) -> usize {
        Rc::as_ptr(&self.node).cast::<()>() as usize
    }

    fn downgrade_any(&self) -> Weak<dyn Any> {
        let weak: Weak<ElementNode> = Rc::downgrade(&self.node);
        weak
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag_name", &self.node.tag_name)
            .field("attributes", &self.node.attributes.borrow())
            .field("children", &self.node.children.borrow().len())
            .finish()
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(el) => write!(f, "WeakElement({})", el.tag_name()),
            None => f.write_str("WeakElement(<dropped>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(Element::tag_name).collect()
    }

    #[test]
    fn attributes_round_trip() {
        let el = Element::new("div");
        assert_eq!(el.get_attribute("data-x"), None);
        assert_eq!(el.set_attribute("data-x", "a b"), None);
        assert_eq!(el.set_attribute("data-x", "c"), Some("a b".to_string()));
        assert!(el.has_attribute("data-x"));
        assert_eq!(el.remove_attribute("data-x"), Some("c".to_string()));
        assert!(!el.has_attribute("data-x"));
    }

    #[test]
    fn clone_shares_node() {
        let a = Element::new("div");
        let b = a.clone();
        b.set_attribute("k", "v");
        assert_eq!(a.get_attribute("k").as_deref(), Some("v"));
        assert_eq!(a, b);
        assert_ne!(a, Element::new("div"));
    }

    #[test]
    fn subtree_is_preorder() {
        let root = Element::new("root");
        let a = Element::new("a");
        let a1 = Element::new("a1");
        let b = Element::new("b");
        root.append_child(&a).unwrap();
        a.append_child(&a1).unwrap();
        root.append_child(&b).unwrap();
        assert_eq!(tags(&root.subtree()), vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn append_moves_between_parents() {
        let p1 = Element::new("p1");
        let p2 = Element::new("p2");
        let child = Element::new("c");
        p1.append_child(&child).unwrap();
        p2.append_child(&child).unwrap();
        assert!(p1.children().is_empty());
        assert_eq!(child.parent(), Some(p2.clone()));
        assert!(p2.contains(&child));
        assert!(!p1.contains(&child));
    }

    #[test]
    fn append_rejects_cycles() {
        let root = Element::new("root");
        let child = Element::new("child");
        root.append_child(&child).unwrap();
        assert!(matches!(
            child.append_child(&root),
            Err(TreeError::Cycle { .. })
        ));
        assert!(matches!(
            root.append_child(&root),
            Err(TreeError::SelfChild { .. })
        ));
    }

    #[test]
    fn remove_child_reports_membership() {
        let root = Element::new("root");
        let child = Element::new("child");
        assert!(!root.remove_child(&child));
        root.append_child(&child).unwrap();
        assert!(root.remove_child(&child));
        assert_eq!(child.parent(), None);
    }

    #[test]
    fn weak_handle_observes_drop() {
        let el = Element::new("div");
        let weak = el.downgrade();
        assert!(weak.is_alive());
        assert_eq!(weak.upgrade(), Some(el.clone()));
        drop(el);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
        assert_eq!(format!("{weak:?}"), "WeakElement(<dropped>)");
    }

    #[test]
    fn detached_children_do_not_keep_parent_alive() {
        let child = Element::new("child");
        {
            let parent = Element::new("parent");
            parent.append_child(&child).unwrap();
        }
        assert!(child.parent().is_none());
    }
}
