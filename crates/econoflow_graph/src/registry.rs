// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available node types, keyed by `(op_code, type_code)`.
//!
//! The registry is an explicit object constructed once at startup and passed
//! to the persistence codec and to node-listing code; there is no global
//! registration table.

use crate::node::NodeContent;
use indexmap::IndexMap;

/// Constructor for a node content object
pub type NodeConstructor = fn() -> Box<dyn NodeContent>;

/// Error raised by registry operations.
///
/// Both variants signal a programming or configuration error in the node
/// library setup, never a user-data problem.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A `(op_code, type_code)` pair was registered twice
    #[error("Duplicate node registration of '{op_code}' under '{type_code}'")]
    InvalidNodeRegistration {
        /// The op code registered twice
        op_code: String,
        /// Its category
        type_code: String,
    },

    /// No constructor registered under the requested pair
    #[error("OpCode '{op_code}' is not registered under '{type_code}'")]
    OpCodeNotRegistered {
        /// The unknown op code
        op_code: String,
        /// Its category
        type_code: String,
    },
}

/// Lookup table from `(op_code, type_code)` to node constructors
#[derive(Debug, Default)]
pub struct NodeRegistry {
    // type_code -> op_code -> constructor, both levels in registration order
    types: IndexMap<String, IndexMap<String, NodeConstructor>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `(op_code, type_code)`.
    ///
    /// A duplicate pair is rejected and the first registration is left
    /// intact.
    pub fn register(
        &mut self,
        op_code: &str,
        type_code: &str,
        constructor: NodeConstructor,
    ) -> Result<(), RegistryError> {
        let ops = self.types.entry(type_code.to_string()).or_default();
        if ops.contains_key(op_code) {
            return Err(RegistryError::InvalidNodeRegistration {
                op_code: op_code.to_string(),
                type_code: type_code.to_string(),
            });
        }
        ops.insert(op_code.to_string(), constructor);
        Ok(())
    }

    /// Look up the constructor for `(op_code, type_code)`
    pub fn resolve(&self, op_code: &str, type_code: &str) -> Result<NodeConstructor, RegistryError> {
        self.types
            .get(type_code)
            .and_then(|ops| ops.get(op_code))
            .copied()
            .ok_or_else(|| RegistryError::OpCodeNotRegistered {
                op_code: op_code.to_string(),
                type_code: type_code.to_string(),
            })
    }

    /// Build a fresh content object for `(op_code, type_code)`
    pub fn instantiate(
        &self,
        op_code: &str,
        type_code: &str,
    ) -> Result<Box<dyn NodeContent>, RegistryError> {
        Ok(self.resolve(op_code, type_code)?())
    }

    /// Registered categories in registration order
    pub fn type_codes(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Registered op codes of one category in registration order
    pub fn op_codes(&self, type_code: &str) -> impl Iterator<Item = &str> {
        self.types
            .get(type_code)
            .into_iter()
            .flat_map(|ops| ops.keys().map(String::as_str))
    }
}
