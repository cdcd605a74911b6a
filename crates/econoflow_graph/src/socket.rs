// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use crate::edge::EdgeId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Create a new random socket ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// Data type tag declared on a socket.
///
/// Connection compatibility is checked against these tags at input-resolution
/// time, not at connect time: a mismatched edge degrades the consumer to
/// invalid instead of being rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketType {
    /// Tabular data (named columns of numbers or text)
    Table,
    /// Fitted model reference
    Model,
    /// Numeric scalar
    Number,
}

/// How many edges a socket accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// At most one edge; connecting again replaces the existing edge
    Single,
    /// Any number of edges
    Multiple,
}

/// Visual anchor of a socket on its node.
///
/// The numeric discriminants are part of the persisted format: restored
/// sockets are re-sorted by `index + position * 10_000` so the left/right,
/// top/bottom layout is stable regardless of document array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketPosition {
    /// Top of the left side
    LeftTop,
    /// Center of the left side
    LeftCenter,
    /// Bottom of the left side
    LeftBottom,
    /// Top of the right side
    RightTop,
    /// Center of the right side
    RightCenter,
    /// Bottom of the right side
    RightBottom,
}

impl SocketPosition {
    /// Numeric code used in persisted documents and in the socket sort key
    pub fn as_u8(self) -> u8 {
        match self {
            Self::LeftTop => 1,
            Self::LeftCenter => 2,
            Self::LeftBottom => 3,
            Self::RightTop => 4,
            Self::RightCenter => 5,
            Self::RightBottom => 6,
        }
    }

    /// Decode a persisted position code
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::LeftTop),
            2 => Some(Self::LeftCenter),
            3 => Some(Self::LeftBottom),
            4 => Some(Self::RightTop),
            5 => Some(Self::RightCenter),
            6 => Some(Self::RightBottom),
            _ => None,
        }
    }
}

/// A typed connection point on a node.
///
/// Sockets live in the scene arena; the owning node and the incident edges
/// are referenced by ID, never by pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    /// Unique socket ID
    pub id: SocketId,
    /// Owning node
    pub node: NodeId,
    /// Zero-based index among same-direction siblings
    pub index: usize,
    /// Visual anchor on the node
    pub position: SocketPosition,
    /// Direction
    pub direction: SocketDirection,
    /// Declared type tag
    pub socket_type: SocketType,
    /// Edge-count policy
    pub policy: EdgePolicy,
    /// Incident edges (owned by the scene, indexed here)
    pub edges: Vec<EdgeId>,
}

impl Socket {
    /// Create a new socket with a fresh ID and no edges
    pub fn new(
        node: NodeId,
        index: usize,
        position: SocketPosition,
        direction: SocketDirection,
        socket_type: SocketType,
        policy: EdgePolicy,
    ) -> Self {
        Self {
            id: SocketId::new(),
            node,
            index,
            position,
            direction,
            socket_type,
            policy,
            edges: Vec::new(),
        }
    }

    /// Whether this is an input socket
    pub fn is_input(&self) -> bool {
        self.direction == SocketDirection::Input
    }

    /// Whether this is an output socket
    pub fn is_output(&self) -> bool {
        self.direction == SocketDirection::Output
    }

    /// Whether at least one edge is attached
    pub fn has_edge(&self) -> bool {
        !self.edges.is_empty()
    }

    pub(crate) fn attach_edge(&mut self, edge: EdgeId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub(crate) fn detach_edge(&mut self, edge: EdgeId) {
        self.edges.retain(|e| *e != edge);
    }
}
