// SPDX-License-Identifier: MIT OR Apache-2.0
//! Table sink node: captures the upstream table for export.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::base::table_input;
use crate::nodes::TYPE_DATA_DEST;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::table::Table;
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::{Path, PathBuf};

/// Terminal node: captures its input table and optionally writes it to a
/// destination file as JSON.
///
/// The captured table is runtime state; only the destination path is
/// persisted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TableSink {
    destination: Option<PathBuf>,
    #[serde(skip)]
    captured: Option<Table>,
}

impl TableSink {
    /// Set the export destination
    pub fn set_destination(&mut self, path: impl Into<PathBuf>) {
        self.destination = Some(path.into());
    }

    /// The configured export destination
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// The table captured by the last successful evaluation
    pub fn captured(&self) -> Option<&Table> {
        self.captured.as_ref()
    }

    /// Write the captured table to the destination. Returns whether
    /// anything was written.
    pub fn write(&self) -> Result<bool, PersistError> {
        let (Some(path), Some(table)) = (&self.destination, &self.captured) else {
            return Ok(false);
        };
        let json = serde_json::to_string_pretty(table)?;
        std::fs::write(path, json)?;
        tracing::debug!("wrote captured table to {}", path.display());
        Ok(true)
    }
}

impl NodeContent for TableSink {
    fn op_code(&self) -> &'static str {
        "table_sink"
    }

    fn type_code(&self) -> &'static str {
        TYPE_DATA_DEST
    }

    fn title(&self) -> &'static str {
        "Table Sink"
    }

    fn input_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn output_sockets(&self) -> Vec<SocketType> {
        Vec::new()
    }

    fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
        let table = table_input(inputs, 0)?.clone();
        self.captured = Some(table.clone());
        Ok(OutputValue::Single(Payload::Table(table)))
    }

    fn serialize_content(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn deserialize_content(&mut self, data: &serde_json::Value) -> Result<(), PersistError> {
        *self = serde_json::from_value(data.clone())
            .map_err(|e| PersistError::Content(e.to_string()))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
