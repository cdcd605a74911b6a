// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge (connection) definitions for the graph.

use crate::socket::SocketId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// How an edge is drawn between its sockets.
///
/// Purely presentational, but carried through persistence so a restored
/// scene renders the way it was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Straight line
    Direct,
    /// Cubic curve
    Bezier,
}

impl EdgeKind {
    /// Numeric code used in persisted documents
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Direct => 1,
            Self::Bezier => 2,
        }
    }

    /// Decode a persisted edge-kind code
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Direct),
            2 => Some(Self::Bezier),
            _ => None,
        }
    }
}

/// A directed link between exactly two sockets.
///
/// Edges are owned by the scene and indexed by both endpoint sockets. The
/// scene keeps the two views consistent: an edge is present in both endpoint
/// sockets' edge lists or in neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Draw style
    pub kind: EdgeKind,
    /// Start socket
    pub start: SocketId,
    /// End socket
    pub end: SocketId,
}

impl Edge {
    /// Create a new edge between two sockets
    pub fn new(kind: EdgeKind, start: SocketId, end: SocketId) -> Self {
        Self {
            id: EdgeId::new(),
            kind,
            start,
            end,
        }
    }

    /// The socket at the far end from `known`, if `known` is an endpoint
    pub fn other_socket(&self, known: SocketId) -> Option<SocketId> {
        if known == self.start {
            Some(self.end)
        } else if known == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    /// Whether this edge touches the given socket
    pub fn involves_socket(&self, socket: SocketId) -> bool {
        self.start == socket || self.end == socket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_socket() {
        let a = SocketId::new();
        let b = SocketId::new();
        let edge = Edge::new(EdgeKind::Bezier, a, b);

        assert_eq!(edge.other_socket(a), Some(b));
        assert_eq!(edge.other_socket(b), Some(a));
        assert_eq!(edge.other_socket(SocketId::new()), None);
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for code in 1..=2u8 {
            assert_eq!(EdgeKind::from_u8(code).unwrap().as_u8(), code);
        }
        assert!(EdgeKind::from_u8(0).is_none());
    }
}
