// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node library: tabular sources, sinks, and preprocessing
//! transforms.

pub mod adstock;
mod base;
pub mod binary;
pub mod filter;
pub mod lag;
pub mod sink;
pub mod source;
pub mod unary;

pub use adstock::Adstock;
pub use binary::{BinaryFn, BinaryOp};
pub use filter::FilterColumn;
pub use lag::LagOp;
pub use sink::TableSink;
pub use source::TableSource;
pub use unary::{UnaryFn, UnaryOp};

use crate::registry::{NodeConstructor, NodeRegistry};

/// Category for nodes that produce data
pub const TYPE_DATA_SOURCE: &str = "Data Source";
/// Category for nodes that consume data
pub const TYPE_DATA_DEST: &str = "Data Dest";
/// Category for nodes that transform tables
pub const TYPE_PREPROCESSING: &str = "Preprocessing";

/// Create a registry with every built-in node type registered
pub fn default_registry() -> NodeRegistry {
    let builtins: [(&str, &str, NodeConstructor); 7] = [
        ("table_source", TYPE_DATA_SOURCE, || {
            Box::new(TableSource::default())
        }),
        ("table_sink", TYPE_DATA_DEST, || Box::new(TableSink::default())),
        ("unary", TYPE_PREPROCESSING, || Box::new(UnaryOp::default())),
        ("binary", TYPE_PREPROCESSING, || Box::new(BinaryOp::default())),
        ("filter", TYPE_PREPROCESSING, || {
            Box::new(FilterColumn::default())
        }),
        ("lag", TYPE_PREPROCESSING, || Box::new(LagOp::default())),
        ("adstock", TYPE_PREPROCESSING, || Box::new(Adstock::default())),
    ];

    let mut registry = NodeRegistry::new();
    for (op_code, type_code, constructor) in builtins {
        registry
            .register(op_code, type_code, constructor)
            .expect("duplicate builtin node registration");
    }
    registry
}
