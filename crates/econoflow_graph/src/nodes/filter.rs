// SPDX-License-Identifier: MIT OR Apache-2.0
//! Column filter node.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::base::table_input;
use crate::nodes::TYPE_PREPROCESSING;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Drops one selected column from the table
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FilterColumn {
    /// Column to delete
    pub column: Option<String>,
}

impl FilterColumn {
    /// Select the column to delete
    pub fn set_column(&mut self, name: impl Into<String>) {
        self.column = Some(name.into());
    }
}

impl NodeContent for FilterColumn {
    fn op_code(&self) -> &'static str {
        "filter"
    }

    fn type_code(&self) -> &'static str {
        TYPE_PREPROCESSING
    }

    fn title(&self) -> &'static str {
        "Filter"
    }

    fn input_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn output_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
        let table = table_input(inputs, 0)?;
        let name = self
            .column
            .as_deref()
            .ok_or_else(|| TransformError::Precondition("Select filter column".into()))?;
        if !table.has_column(name) {
            return Err(TransformError::Precondition(
                "Check node configuration".into(),
            ));
        }
        Ok(OutputValue::Single(Payload::Table(
            table.without_column(name),
        )))
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
