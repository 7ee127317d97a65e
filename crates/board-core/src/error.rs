use crate::id::NodeId;
use thiserror::Error;

/// Rejections from validating board operations.
///
/// Only explicit requests that would corrupt the board produce these.
/// Benign no-ops (empty selection, empty history) are reported through
/// `bool`/`Option` returns instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),

    #[error("connector from `{0}` to itself")]
    SelfLoop(NodeId),

    #[error("moving `{child}` under `{parent}` would make it its own ancestor")]
    ParentCycle { child: NodeId, parent: NodeId },

    #[error("id `{0}` is already in use")]
    DuplicateId(NodeId),
}

pub type BoardResult<T> = Result<T, BoardError>;
