// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions: the per-node state machine and the content trait
//! implemented by concrete node types.

use crate::persist::PersistError;
use crate::socket::{SocketId, SocketType};
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A guarded input slot: the resolved upstream payload and the upstream
/// socket's declared type, or `(None, None)` when resolution failed softly.
pub type GuardedInput = (Option<Payload>, Option<SocketType>);

/// How a transform failed.
///
/// The kind decides what the scheduler does with the failure; every kind
/// invalidates the node with the carried message.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Configuration or input preconditions unmet; the sweep continues
    #[error("{0}")]
    Precondition(String),
    /// A recognized domain failure, surfaced to the sweep caller
    #[error("{0}")]
    Domain(String),
    /// Unexpected internal failure; logged and swallowed
    #[error("{0}")]
    Internal(String),
}

/// Capability contract for concrete node types.
///
/// The engine owns the dirty/invalid state machine and the cached output;
/// a content object owns its configuration and the transform. The engine
/// calls `compute` with one guarded slot per input socket and stores the
/// returned value on success.
pub trait NodeContent: fmt::Debug {
    /// Registry op code, unique within the type code
    fn op_code(&self) -> &'static str;

    /// Registry category label
    fn type_code(&self) -> &'static str;

    /// Display title for fresh nodes
    fn title(&self) -> &'static str;

    /// Declared type tags of the input sockets, in order
    fn input_sockets(&self) -> Vec<SocketType>;

    /// Declared type tags of the output sockets, in order
    fn output_sockets(&self) -> Vec<SocketType>;

    /// Produce an output value from the guarded inputs
    fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError>;

    /// Node-specific configuration fields layered under `content` in the
    /// persisted document
    fn serialize_content(&self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }

    /// Restore configuration fields from a persisted `content` document
    fn deserialize_content(&mut self, _data: &serde_json::Value) -> Result<(), PersistError> {
        Ok(())
    }

    /// Notification: the owning node was marked dirty
    fn on_marked_dirty(&mut self) {}

    /// Notification: the owning node's dirty flag was cleared
    fn on_unmarked_dirty(&mut self) {}

    /// Notification: the owning node was marked invalid
    fn on_marked_invalid(&mut self) {}

    /// Notification: the owning node's invalid flag was cleared
    fn on_unmarked_invalid(&mut self) {}

    /// Downcast support for configuration edits
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support for configuration edits
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A node instance in the scene.
///
/// Sockets live in the scene arena and are referenced here by ID. A node is
/// created dirty; its cached output stays empty until the first successful
/// evaluation.
#[derive(Debug)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display title (customizable per instance)
    pub title: String,
    /// Position on the canvas
    pub position: [f32; 2],
    pub(crate) inputs: Vec<SocketId>,
    pub(crate) outputs: Vec<SocketId>,
    pub(crate) dirty: bool,
    pub(crate) invalid: bool,
    pub(crate) error_message: Option<String>,
    pub(crate) output_value: Option<OutputValue>,
    /// Node-type-specific configuration and transform
    pub content: Box<dyn NodeContent>,
}

impl Node {
    /// Create a new node around a content object, with no sockets attached
    /// yet. The scene attaches sockets when the node is added.
    pub(crate) fn new(content: Box<dyn NodeContent>) -> Self {
        Self {
            id: NodeId::new(),
            title: content.title().to_string(),
            position: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            dirty: true,
            invalid: false,
            error_message: None,
            output_value: None,
            content,
        }
    }

    /// Whether the cached output is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the last evaluation failed or preconditions are unmet
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// The stored error message while the node is invalid
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The raw cached output, regardless of dirty/invalid state.
    ///
    /// Consumers should go through the scene's staleness-masked accessors
    /// instead; this exists for presentation code that renders the last
    /// known value alongside the state flags.
    pub fn cached_output(&self) -> Option<&OutputValue> {
        self.output_value.as_ref()
    }

    /// Input socket IDs in declaration order
    pub fn input_sockets(&self) -> &[SocketId] {
        &self.inputs
    }

    /// Output socket IDs in declaration order
    pub fn output_sockets(&self) -> &[SocketId] {
        &self.outputs
    }
}
