// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dataflow graph engine for `EconoFlow`.
//!
//! This crate provides the node-graph core that powers the editor:
//! - Typed sockets and scene-owned edges
//! - Dirty/invalid propagation with lazy, pull-based re-evaluation
//! - A persistence codec that reconstructs identical topology from
//!   saved documents
//! - A registry of node types keyed by `(op_code, type_code)`
//!
//! ## Architecture
//!
//! The [`scene::Scene`] owns every node, socket, and edge in arena maps;
//! all cross-references are IDs resolved through the scene. Concrete node
//! types implement [`node::NodeContent`] and are instantiated through the
//! [`registry::NodeRegistry`]. Evaluation is single-threaded and
//! synchronous: marking is cheap, recomputation happens on demand.

pub mod edge;
pub mod eval;
pub mod history;
pub mod node;
pub mod nodes;
pub mod persist;
pub mod registry;
pub mod scene;
pub mod socket;
pub mod table;
pub mod value;

pub use edge::{Edge, EdgeId, EdgeKind};
pub use eval::{EvalError, SweepReport};
pub use history::{HistoryError, SceneHistory};
pub use node::{GuardedInput, Node, NodeContent, NodeId, TransformError};
pub use persist::{PersistError, SceneDoc};
pub use registry::{NodeConstructor, NodeRegistry, RegistryError};
pub use scene::{ConnectionError, Scene, SceneId};
pub use socket::{EdgePolicy, Socket, SocketDirection, SocketId, SocketPosition, SocketType};
pub use table::{Column, Table};
pub use value::{OutputValue, Payload};
