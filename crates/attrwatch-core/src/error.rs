use thiserror::Error;

/// Structural errors raised by [`Element`](crate::Element) tree edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("cannot append <{tag_name}> to itself")]
    SelfChild { tag_name: String },

    #[error("cannot append ancestor <{child}> under <{parent}>")]
    Cycle { parent: String, child: String },
}
