// SPDX-License-Identifier: MIT OR Apache-2.0
//! Table source node: serves one page of loaded tabular data.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::TYPE_DATA_SOURCE;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::table::Table;
use crate::value::{OutputValue, Payload};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Data-source node holding named pages of tabular data, one of which is
/// selected as the output.
///
/// The pages themselves are part of the node's persisted content, so a
/// restored scene evaluates without re-importing anything.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TableSource {
    pages: IndexMap<String, Table>,
    current_page: Option<String>,
    source_name: Option<String>,
}

impl TableSource {
    /// Replace all pages; the current selection falls back to the first
    /// page when it no longer exists.
    pub fn set_pages(&mut self, pages: IndexMap<String, Table>) {
        self.pages = pages;
        let valid = self
            .current_page
            .as_ref()
            .is_some_and(|p| self.pages.contains_key(p));
        if !valid {
            self.current_page = self.pages.keys().next().cloned();
        }
    }

    /// Select a page by name; returns whether the selection changed
    pub fn select_page(&mut self, name: &str) -> bool {
        if !self.pages.contains_key(name) || self.current_page.as_deref() == Some(name) {
            return false;
        }
        self.current_page = Some(name.to_string());
        true
    }

    /// Label of the imported source (a file name, typically)
    pub fn set_source_name(&mut self, name: impl Into<String>) {
        self.source_name = Some(name.into());
    }

    /// Page names in load order
    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// The currently selected page name
    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }
}

impl NodeContent for TableSource {
    fn op_code(&self) -> &'static str {
        "table_source"
    }

    fn type_code(&self) -> &'static str {
        TYPE_DATA_SOURCE
    }

    fn title(&self) -> &'static str {
        "Table Source"
    }

    fn input_sockets(&self) -> Vec<SocketType> {
        Vec::new()
    }

    fn output_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn compute(&mut self, _inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
        let table = self
            .current_page
            .as_ref()
            .and_then(|page| self.pages.get(page))
            .or_else(|| self.pages.values().next())
            .ok_or_else(|| TransformError::Precondition("Select source data".into()))?;
        Ok(OutputValue::Single(Payload::Table(table.clone())))
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
