// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene: the owning container of nodes, sockets, and edges.
//!
//! All cross-references inside the graph are IDs resolved through the scene
//! arenas, never direct aliases. Edges are owned here and indexed by both
//! endpoint sockets; the connect/disconnect operations keep the two views
//! consistent.

use crate::edge::{Edge, EdgeId, EdgeKind};
use crate::node::{Node, NodeContent, NodeId};
use crate::socket::{EdgePolicy, Socket, SocketDirection, SocketId, SocketPosition};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId(pub Uuid);

impl SceneId {
    /// Create a new random scene ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

/// Error when wiring or resolving connections
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Socket not found in the scene
    #[error("Socket not found: {0:?}")]
    SocketNotFound(SocketId),

    /// Edge not found in the scene
    #[error("Edge not found: {0:?}")]
    EdgeNotFound(EdgeId),

    /// Both sockets are inputs, or both are outputs
    #[error("Sockets have the same direction")]
    IncompatibleSocket,

    /// The known socket is not an endpoint of the edge
    #[error("Socket {socket:?} is not an endpoint of edge {edge:?}")]
    MalformedEdge {
        /// The edge being resolved
        edge: EdgeId,
        /// The socket claimed to be an endpoint
        socket: SocketId,
    },
}

type Listener = Box<dyn FnMut()>;

/// The owning container of all nodes and edges; the unit of serialization,
/// clearing, and change notification.
pub struct Scene {
    /// Unique scene ID
    pub id: SceneId,
    /// Canvas width (presentation only)
    pub width: f32,
    /// Canvas height (presentation only)
    pub height: f32,
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) sockets: IndexMap<SocketId, Socket>,
    pub(crate) edges: IndexMap<EdgeId, Edge>,
    pub(crate) modified: bool,
    pub(crate) eval_stack: Vec<NodeId>,
    last_selection: Vec<NodeId>,
    modified_listeners: Vec<Listener>,
    selection_listeners: Vec<Listener>,
    deselection_listeners: Vec<Listener>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self {
            id: SceneId::new(),
            width: 1024.0,
            height: 1024.0,
            nodes: IndexMap::new(),
            sockets: IndexMap::new(),
            edges: IndexMap::new(),
            modified: false,
            eval_stack: Vec::new(),
            last_selection: Vec::new(),
            modified_listeners: Vec::new(),
            selection_listeners: Vec::new(),
            deselection_listeners: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Add a node built around the given content, creating its sockets from
    /// the content's declared types. The node starts dirty.
    pub fn add_node(&mut self, content: Box<dyn NodeContent>) -> NodeId {
        let mut node = Node::new(content);
        let node_id = node.id;

        for (index, socket_type) in node.content.input_sockets().into_iter().enumerate() {
            let socket = Socket::new(
                node_id,
                index,
                SocketPosition::LeftCenter,
                SocketDirection::Input,
                socket_type,
                EdgePolicy::Single,
            );
            node.inputs.push(socket.id);
            self.sockets.insert(socket.id, socket);
        }
        for (index, socket_type) in node.content.output_sockets().into_iter().enumerate() {
            let socket = Socket::new(
                node_id,
                index,
                SocketPosition::RightCenter,
                SocketDirection::Output,
                socket_type,
                EdgePolicy::Multiple,
            );
            node.outputs.push(socket.id);
            self.sockets.insert(socket.id, socket);
        }

        self.nodes.insert(node_id, node);
        self.mark_dirty(node_id, true);
        node_id
    }

    /// Remove a node, first removing every edge incident to its sockets
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let node = self.nodes.get(&node_id)?;
        let socket_ids: Vec<SocketId> = node
            .inputs
            .iter()
            .chain(node.outputs.iter())
            .copied()
            .collect();

        for socket_id in &socket_ids {
            let incident: Vec<EdgeId> = self
                .sockets
                .get(socket_id)
                .map(|s| s.edges.clone())
                .unwrap_or_default();
            for edge_id in incident {
                self.disconnect(edge_id);
            }
        }
        for socket_id in &socket_ids {
            self.sockets.shift_remove(socket_id);
        }

        let removed = self.nodes.shift_remove(&node_id);
        self.set_modified(true);
        removed
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ------------------------------------------------------------------
    // Sockets and edges
    // ------------------------------------------------------------------

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.sockets.get(&socket_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Connect two sockets of opposite direction.
    ///
    /// When the input-side socket has the `Single` policy and already holds
    /// an edge, that edge is removed first: connecting replaces. The new
    /// edge appears in both endpoint sockets' edge lists, and the consumer
    /// node plus its descendants are marked dirty.
    pub fn connect(&mut self, a: SocketId, b: SocketId) -> Result<EdgeId, ConnectionError> {
        let dir_a = self
            .sockets
            .get(&a)
            .map(|s| s.direction)
            .ok_or(ConnectionError::SocketNotFound(a))?;
        let dir_b = self
            .sockets
            .get(&b)
            .map(|s| s.direction)
            .ok_or(ConnectionError::SocketNotFound(b))?;
        if dir_a == dir_b {
            return Err(ConnectionError::IncompatibleSocket);
        }

        let (start, end) = if dir_a == SocketDirection::Output {
            (a, b)
        } else {
            (b, a)
        };

        let replaced: Vec<EdgeId> = match self.sockets.get(&end) {
            Some(s) if s.policy == EdgePolicy::Single => s.edges.clone(),
            _ => Vec::new(),
        };
        for edge_id in replaced {
            self.disconnect(edge_id);
        }

        let edge = Edge::new(EdgeKind::Bezier, start, end);
        let edge_id = edge.id;
        self.edges.insert(edge_id, edge);
        if let Some(s) = self.sockets.get_mut(&start) {
            s.attach_edge(edge_id);
        }
        if let Some(s) = self.sockets.get_mut(&end) {
            s.attach_edge(edge_id);
        }

        if let Some(consumer) = self.sockets.get(&end).map(|s| s.node) {
            self.mark_dirty(consumer, true);
            if let Err(err) = self.mark_descendants_dirty(consumer, true) {
                tracing::warn!("dirty propagation after connect stopped: {err}");
            }
        }
        self.set_modified(true);
        Ok(edge_id)
    }

    /// Remove an edge from both endpoint sockets and the scene.
    ///
    /// The consumer node lost an input, so it and its descendants are marked
    /// dirty. Removing an unknown edge is a no-op.
    pub fn disconnect(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let edge = self.edges.shift_remove(&edge_id)?;
        if let Some(s) = self.sockets.get_mut(&edge.start) {
            s.detach_edge(edge_id);
        }
        if let Some(s) = self.sockets.get_mut(&edge.end) {
            s.detach_edge(edge_id);
        }

        let consumer = [edge.start, edge.end]
            .into_iter()
            .filter_map(|sid| self.sockets.get(&sid))
            .find(|s| s.is_input())
            .map(|s| s.node);
        if let Some(node_id) = consumer {
            self.mark_dirty(node_id, true);
            if let Err(err) = self.mark_descendants_dirty(node_id, true) {
                tracing::warn!("dirty propagation after disconnect stopped: {err}");
            }
        }

        self.set_modified(true);
        Some(edge)
    }

    /// The socket at the far end of an edge from a known endpoint
    pub fn get_other_socket(
        &self,
        edge_id: EdgeId,
        known: SocketId,
    ) -> Result<SocketId, ConnectionError> {
        let edge = self
            .edges
            .get(&edge_id)
            .ok_or(ConnectionError::EdgeNotFound(edge_id))?;
        edge.other_socket(known)
            .ok_or(ConnectionError::MalformedEdge {
                edge: edge_id,
                socket: known,
            })
    }

    /// Direct children of a node: every node reached by following every
    /// outgoing edge of every output socket. A child connected through two
    /// edges appears twice.
    pub fn children_of(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let Some(node) = self.nodes.get(&node_id) else {
            return children;
        };
        for socket_id in &node.outputs {
            let Some(socket) = self.sockets.get(socket_id) else {
                continue;
            };
            for edge_id in &socket.edges {
                let Some(edge) = self.edges.get(edge_id) else {
                    continue;
                };
                let Some(other_id) = edge.other_socket(*socket_id) else {
                    continue;
                };
                if let Some(other) = self.sockets.get(&other_id) {
                    children.push(other.node);
                }
            }
        }
        children
    }

    /// Remove every node (cascading edge removal) and reset the modified
    /// flag
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for node_id in ids {
            self.remove_node(node_id);
        }
        self.modified = false;
    }

    // ------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------

    /// Whether the scene changed since creation, load, or save
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set the modified flag. Listeners fire only on the false-to-true
    /// transition.
    pub fn set_modified(&mut self, value: bool) {
        if value && !self.modified {
            self.modified = true;
            let mut listeners = std::mem::take(&mut self.modified_listeners);
            for listener in &mut listeners {
                listener();
            }
            self.modified_listeners = listeners;
        }
        self.modified = value;
    }

    /// Register a callback for the modified false-to-true transition
    pub fn add_modified_listener(&mut self, listener: impl FnMut() + 'static) {
        self.modified_listeners.push(Box::new(listener));
    }

    /// Register a callback for selection changes
    pub fn add_selection_listener(&mut self, listener: impl FnMut() + 'static) {
        self.selection_listeners.push(Box::new(listener));
    }

    /// Register a callback for the selection becoming empty
    pub fn add_deselection_listener(&mut self, listener: impl FnMut() + 'static) {
        self.deselection_listeners.push(Box::new(listener));
    }

    /// Report the host's current selection. Fires the selection listeners
    /// when it changed, or the deselection listeners when it became empty.
    pub fn set_selection(&mut self, selection: Vec<NodeId>) {
        if selection == self.last_selection {
            return;
        }
        let emptied = selection.is_empty();
        self.last_selection = selection;
        let listeners = if emptied {
            &mut self.deselection_listeners
        } else {
            &mut self.selection_listeners
        };
        let mut taken = std::mem::take(listeners);
        for listener in &mut taken {
            listener();
        }
        if emptied {
            self.deselection_listeners = taken;
        } else {
            self.selection_listeners = taken;
        }
    }

    /// The host's last reported selection
    pub fn selection(&self) -> &[NodeId] {
        &self.last_selection
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("modified", &self.modified)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{FilterColumn, TableSink, TableSource};
    use std::cell::Cell;
    use std::rc::Rc;

    fn two_node_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let source = scene.add_node(Box::new(TableSource::default()));
        let filter = scene.add_node(Box::new(FilterColumn::default()));
        (scene, source, filter)
    }

    #[test]
    fn test_add_node_creates_sockets() {
        let (scene, source, filter) = two_node_scene();
        let source_node = scene.node(source).unwrap();
        assert!(source_node.input_sockets().is_empty());
        assert_eq!(source_node.output_sockets().len(), 1);
        assert!(source_node.is_dirty());

        let filter_node = scene.node(filter).unwrap();
        assert_eq!(filter_node.input_sockets().len(), 1);
        assert_eq!(filter_node.output_sockets().len(), 1);

        let input = scene.socket(filter_node.input_sockets()[0]).unwrap();
        assert_eq!(input.policy, EdgePolicy::Single);
        assert_eq!(input.index, 0);
        assert_eq!(input.node, filter);
    }

    #[test]
    fn test_connect_rejects_same_direction() {
        let (mut scene, source, filter) = two_node_scene();
        let out_a = scene.node(source).unwrap().output_sockets()[0];
        let out_b = scene.node(filter).unwrap().output_sockets()[0];
        assert!(matches!(
            scene.connect(out_a, out_b),
            Err(ConnectionError::IncompatibleSocket)
        ));
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn test_connect_appears_in_both_sockets() {
        let (mut scene, source, filter) = two_node_scene();
        let out = scene.node(source).unwrap().output_sockets()[0];
        let input = scene.node(filter).unwrap().input_sockets()[0];

        let edge_id = scene.connect(out, input).unwrap();
        assert!(scene.socket(out).unwrap().edges.contains(&edge_id));
        assert!(scene.socket(input).unwrap().edges.contains(&edge_id));
        assert_eq!(scene.children_of(source), vec![filter]);
    }

    #[test]
    fn test_reconnect_replaces_single_policy_edge() {
        let mut scene = Scene::new();
        let first = scene.add_node(Box::new(TableSource::default()));
        let second = scene.add_node(Box::new(TableSource::default()));
        let sink = scene.add_node(Box::new(TableSink::default()));

        let out_first = scene.node(first).unwrap().output_sockets()[0];
        let out_second = scene.node(second).unwrap().output_sockets()[0];
        let input = scene.node(sink).unwrap().input_sockets()[0];

        let old_edge = scene.connect(out_first, input).unwrap();
        let new_edge = scene.connect(out_second, input).unwrap();

        assert_eq!(scene.socket(input).unwrap().edges, vec![new_edge]);
        assert!(scene.edge(old_edge).is_none());
        assert!(!scene.socket(out_first).unwrap().has_edge());
        assert_eq!(scene.edge_count(), 1);
    }

    #[test]
    fn test_disconnect_detaches_both_ends() {
        let (mut scene, source, filter) = two_node_scene();
        let out = scene.node(source).unwrap().output_sockets()[0];
        let input = scene.node(filter).unwrap().input_sockets()[0];
        let edge_id = scene.connect(out, input).unwrap();

        let removed = scene.disconnect(edge_id);
        assert!(removed.is_some());
        assert!(!scene.socket(out).unwrap().has_edge());
        assert!(!scene.socket(input).unwrap().has_edge());
        assert!(scene.disconnect(edge_id).is_none());
    }

    #[test]
    fn test_get_other_socket_rejects_foreign_socket() {
        let (mut scene, source, filter) = two_node_scene();
        let out = scene.node(source).unwrap().output_sockets()[0];
        let input = scene.node(filter).unwrap().input_sockets()[0];
        let edge_id = scene.connect(out, input).unwrap();

        assert_eq!(scene.get_other_socket(edge_id, out).unwrap(), input);
        let foreign = scene.node(filter).unwrap().output_sockets()[0];
        assert!(matches!(
            scene.get_other_socket(edge_id, foreign),
            Err(ConnectionError::MalformedEdge { .. })
        ));
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let (mut scene, source, filter) = two_node_scene();
        let out = scene.node(source).unwrap().output_sockets()[0];
        let input = scene.node(filter).unwrap().input_sockets()[0];
        scene.connect(out, input).unwrap();

        scene.remove_node(source);
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.edge_count(), 0);
        assert!(!scene.socket(input).unwrap().has_edge());
    }

    #[test]
    fn test_clear_resets_modified() {
        let (mut scene, _, _) = two_node_scene();
        assert!(scene.is_modified());
        scene.clear();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.edge_count(), 0);
        assert!(!scene.is_modified());
    }

    #[test]
    fn test_modified_listener_fires_on_rising_edge_only() {
        let mut scene = Scene::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        scene.add_modified_listener(move || seen.set(seen.get() + 1));

        scene.set_modified(true);
        scene.set_modified(true);
        assert_eq!(count.get(), 1);

        scene.set_modified(false);
        scene.set_modified(true);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_selection_listeners() {
        let mut scene = Scene::new();
        let selected = Rc::new(Cell::new(0));
        let deselected = Rc::new(Cell::new(0));
        let s = Rc::clone(&selected);
        let d = Rc::clone(&deselected);
        scene.add_selection_listener(move || s.set(s.get() + 1));
        scene.add_deselection_listener(move || d.set(d.get() + 1));

        let node = NodeId::new();
        scene.set_selection(vec![node]);
        scene.set_selection(vec![node]);
        assert_eq!(selected.get(), 1);

        scene.set_selection(Vec::new());
        assert_eq!(deselected.get(), 1);
    }
}
