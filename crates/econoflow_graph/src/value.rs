// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values cached on nodes and resolved per output socket.

use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value produced by a node transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Tabular data
    Table(Table),
    /// Numeric scalar
    Number(f64),
    /// Text scalar
    Text(String),
}

impl Payload {
    /// The table inside, if this payload is tabular
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// A node's cached output: a single payload, an ordered sequence, or a
/// mapping keyed by output socket index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputValue {
    /// One payload shared by socket index 0
    Single(Payload),
    /// One payload per output socket index
    Sequence(Vec<Payload>),
    /// Sparse payloads keyed by output socket index
    Mapping(BTreeMap<usize, Payload>),
}

impl OutputValue {
    /// Resolve the payload for an output socket index.
    ///
    /// A non-container value satisfies only index 0; sequences are indexed,
    /// mappings are keyed. Anything else is `None`.
    pub fn get(&self, index: usize) -> Option<&Payload> {
        match self {
            Self::Single(payload) => (index == 0).then_some(payload),
            Self::Sequence(items) => items.get(index),
            Self::Mapping(map) => map.get(&index),
        }
    }
}
