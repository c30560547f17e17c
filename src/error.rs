//! Crate error type.

use crate::dom::NodeId;
use crate::tile::TileId;

/// Errors surfaced by the runtime and the document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A component called its hooks in a different number, order or type than
    /// on its previous render. The pass is aborted before any DOM mutation.
    #[error("hook order violation in `{component}` at slot {slot}: {reason}")]
    HookOrderViolation {
        component: &'static str,
        slot: usize,
        reason: &'static str,
    },
    /// The render target is not an element attached to the document.
    #[error("container {0:?} is not an element attached to the document")]
    InvalidContainer(NodeId),
    /// A state update or render was requested while a render or commit pass
    /// was running.
    #[error("cannot update state while a render or commit is in progress")]
    RenderInProgress,
    /// Nested setter-triggered cycles exceeded the configured limit.
    #[error("maximum update depth of {limit} exceeded")]
    UpdateDepthExceeded { limit: usize },
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    /// A mutation referred to a tile that has no node in the document.
    #[error("tile {0:?} has no node in the document")]
    Unrealized(TileId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_component() {
        let err = Error::HookOrderViolation {
            component: "Counter",
            slot: 1,
            reason: "hook kind changed",
        };
        assert_eq!(
            err.to_string(),
            "hook order violation in `Counter` at slot 1: hook kind changed"
        );
        assert_eq!(
            Error::UpdateDepthExceeded { limit: 50 }.to_string(),
            "maximum update depth of 50 exceeded"
        );
    }
}
