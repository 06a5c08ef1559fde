//! Network error type.

use thiserror::Error;

use pp_core::{CoreError, LinkId, NodeId};

/// Errors produced by `pp-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("link {link} references unknown node {node}")]
    NodeNotFound { link: LinkId, node: NodeId },

    #[error("duplicate node {0}")]
    DuplicateNode(NodeId),

    #[error("duplicate link {0}")]
    DuplicateLink(LinkId),

    #[error("link {0} has no geometry")]
    EmptyGeometry(LinkId),

    #[error("malformed network file: {0}")]
    Malformed(String),

    #[error("XML error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
