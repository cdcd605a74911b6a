// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistence codec: scenes to and from structured documents.
//!
//! Nodes are re-instantiated through the node registry by their
//! `(op_code, type_code)` pair; edges are serialized after nodes and resolve
//! their endpoints through a persisted-id map, so connectivity survives
//! regardless of in-memory identity. Loading builds a complete staging scene
//! before the caller sees anything: a failed load never leaves a live scene
//! half-mutated.

use crate::edge::{Edge, EdgeId, EdgeKind};
use crate::node::{Node, NodeId};
use crate::registry::{NodeRegistry, RegistryError};
use crate::scene::{Scene, SceneId};
use crate::socket::{EdgePolicy, Socket, SocketDirection, SocketId, SocketPosition, SocketType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// Weight of the position code in the socket re-sort key
const SOCKET_POSITION_WEIGHT: i64 = 10_000;

/// Error surfaced by save/load operations
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The document is not parseable or is missing required fields
    #[error("Not a valid graph document: {0}")]
    InvalidFile(String),

    /// An edge references a socket id absent from the document's nodes
    #[error("Edge references unknown socket id {0}")]
    UnresolvedSocket(Uuid),

    /// A socket carries an unknown position code
    #[error("Unknown socket position code {0}")]
    UnknownSocketPosition(u8),

    /// An edge carries an unknown kind code
    #[error("Unknown edge type code {0}")]
    UnknownEdgeKind(u8),

    /// A node's content document could not be restored
    #[error("Invalid node content: {0}")]
    Content(String),

    /// Node lookup failed during instantiation
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Document encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persisted form of a socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketDoc {
    /// Persisted socket id
    pub id: Uuid,
    /// Zero-based index among same-direction siblings
    pub index: usize,
    /// Position code (see [`SocketPosition`])
    pub position: u8,
    /// Declared type tag
    pub socket_type: SocketType,
}

/// Persisted form of an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDoc {
    /// Persisted edge id
    pub id: Uuid,
    /// Edge kind code (see [`EdgeKind`])
    pub edge_type: u8,
    /// Persisted id of the start socket
    pub start: Uuid,
    /// Persisted id of the end socket
    pub end: Uuid,
}

/// Persisted form of a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Persisted node id
    pub id: Uuid,
    /// Registry op code
    pub op_code: String,
    /// Registry category
    pub type_code: String,
    /// Display title
    pub title: String,
    /// Canvas x position
    pub pos_x: f32,
    /// Canvas y position
    pub pos_y: f32,
    /// Input sockets
    pub inputs: Vec<SocketDoc>,
    /// Output sockets
    pub outputs: Vec<SocketDoc>,
    /// Node-type-specific configuration fields
    pub content: serde_json::Value,
}

/// Persisted form of a scene: the top-level document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDoc {
    /// Persisted scene id
    pub id: Uuid,
    /// Canvas width
    pub scene_width: f32,
    /// Canvas height
    pub scene_height: f32,
    /// Nodes, in scene insertion order
    pub nodes: Vec<NodeDoc>,
    /// Edges, in scene insertion order
    pub edges: Vec<EdgeDoc>,
}

impl Scene {
    /// Serialize the scene into a document
    pub fn to_doc(&self) -> SceneDoc {
        let socket_doc = |socket_id: &SocketId| -> Option<SocketDoc> {
            self.sockets.get(socket_id).map(|s| SocketDoc {
                id: s.id.0,
                index: s.index,
                position: s.position.as_u8(),
                socket_type: s.socket_type,
            })
        };

        let nodes = self
            .nodes
            .values()
            .map(|node| NodeDoc {
                id: node.id.0,
                op_code: node.content.op_code().to_string(),
                type_code: node.content.type_code().to_string(),
                title: node.title.clone(),
                pos_x: node.position[0],
                pos_y: node.position[1],
                inputs: node.inputs.iter().filter_map(socket_doc).collect(),
                outputs: node.outputs.iter().filter_map(socket_doc).collect(),
                content: node.content.serialize_content(),
            })
            .collect();

        let edges = self
            .edges
            .values()
            .map(|edge| EdgeDoc {
                id: edge.id.0,
                edge_type: edge.kind.as_u8(),
                start: edge.start.0,
                end: edge.end.0,
            })
            .collect();

        SceneDoc {
            id: self.id.0,
            scene_width: self.width,
            scene_height: self.height,
            nodes,
            edges,
        }
    }

    /// Rebuild a scene from a document through the node registry.
    ///
    /// With `restore_ids` the persisted ids become the live ids; without it,
    /// fresh ids are minted everywhere (used when duplicating), with
    /// connectivity preserved either way. Restored nodes start dirty.
    pub fn from_doc(
        doc: &SceneDoc,
        registry: &NodeRegistry,
        restore_ids: bool,
    ) -> Result<Self, PersistError> {
        let mut scene = Scene::new();
        if restore_ids {
            scene.id = SceneId(doc.id);
        }
        scene.width = doc.scene_width;
        scene.height = doc.scene_height;

        // persisted socket id -> live socket id, threaded to edge resolution
        let mut socket_map: HashMap<Uuid, SocketId> = HashMap::new();

        for node_doc in &doc.nodes {
            let mut content = registry.instantiate(&node_doc.op_code, &node_doc.type_code)?;
            content.deserialize_content(&node_doc.content)?;

            let mut node = Node::new(content);
            if restore_ids {
                node.id = NodeId(node_doc.id);
            }
            node.title = node_doc.title.clone();
            node.position = [node_doc.pos_x, node_doc.pos_y];
            let node_id = node.id;

            scene.restore_sockets(
                &mut node,
                &node_doc.inputs,
                SocketDirection::Input,
                restore_ids,
                &mut socket_map,
            )?;
            scene.restore_sockets(
                &mut node,
                &node_doc.outputs,
                SocketDirection::Output,
                restore_ids,
                &mut socket_map,
            )?;

            scene.nodes.insert(node_id, node);
        }

        for edge_doc in &doc.edges {
            let kind = EdgeKind::from_u8(edge_doc.edge_type)
                .ok_or(PersistError::UnknownEdgeKind(edge_doc.edge_type))?;
            let start = *socket_map
                .get(&edge_doc.start)
                .ok_or(PersistError::UnresolvedSocket(edge_doc.start))?;
            let end = *socket_map
                .get(&edge_doc.end)
                .ok_or(PersistError::UnresolvedSocket(edge_doc.end))?;

            let mut edge = Edge::new(kind, start, end);
            if restore_ids {
                edge.id = EdgeId(edge_doc.id);
            }
            let edge_id = edge.id;
            scene.edges.insert(edge_id, edge);
            if let Some(s) = scene.sockets.get_mut(&start) {
                s.attach_edge(edge_id);
            }
            if let Some(s) = scene.sockets.get_mut(&end) {
                s.attach_edge(edge_id);
            }
        }

        scene.modified = false;
        Ok(scene)
    }

    fn restore_sockets(
        &mut self,
        node: &mut Node,
        docs: &[SocketDoc],
        direction: SocketDirection,
        restore_ids: bool,
        socket_map: &mut HashMap<Uuid, SocketId>,
    ) -> Result<(), PersistError> {
        // stable layout regardless of document array order
        let mut docs: Vec<SocketDoc> = docs.to_vec();
        docs.sort_by_key(|s| s.index as i64 + i64::from(s.position) * SOCKET_POSITION_WEIGHT);

        let policy = match direction {
            SocketDirection::Input => EdgePolicy::Single,
            SocketDirection::Output => EdgePolicy::Multiple,
        };

        for socket_doc in &docs {
            let position = SocketPosition::from_u8(socket_doc.position)
                .ok_or(PersistError::UnknownSocketPosition(socket_doc.position))?;
            let mut socket = Socket::new(
                node.id,
                socket_doc.index,
                position,
                direction,
                socket_doc.socket_type,
                policy,
            );
            if restore_ids {
                socket.id = SocketId(socket_doc.id);
            }
            socket_map.insert(socket_doc.id, socket.id);
            match direction {
                SocketDirection::Input => node.inputs.push(socket.id),
                SocketDirection::Output => node.outputs.push(socket.id),
            }
            self.sockets.insert(socket.id, socket);
        }
        Ok(())
    }

    /// Save the scene as pretty-printed JSON and reset the modified flag
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(&self.to_doc())?;
        std::fs::write(path.as_ref(), json)?;
        tracing::debug!("saved scene to {}", path.as_ref().display());
        self.modified = false;
        Ok(())
    }

    /// Load a scene from a JSON file through the registry
    pub fn load_from_file(
        path: impl AsRef<Path>,
        registry: &NodeRegistry,
    ) -> Result<Self, PersistError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let doc: SceneDoc =
            serde_json::from_str(&raw).map_err(|e| PersistError::InvalidFile(e.to_string()))?;
        Self::from_doc(&doc, registry, true)
    }
}
