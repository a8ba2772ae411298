//! # Impact Graph
//!
//! Local symbol-relationship graph built from tree-sitter ASTs. It answers
//! the same questions a language server would for impact expansion:
//! who calls a method, who redefines it, who references a field or type.
//!
//! ## Architecture
//!
//! ```text
//! SourceFile[]
//!     │
//!     ├──> Graph Builder (AST analysis)
//!     │      ├─ Declarations → nodes (functions, methods, types, fields)
//!     │      ├─ Call sites → Calls edges
//!     │      ├─ Field/type references → Reads edges
//!     │      └─ Same-named methods under other types → Overrides edges
//!     │
//!     └──> Code Graph (petgraph)
//!            ├─ symbol_at(uri, byte_offset)
//!            └─ callers / overriders / readers
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::{build_project, build_project_with, SourceFile};
pub use error::{GraphError, Result};
pub use types::{CodeGraph, GraphEdge, GraphNode, RelationshipType, Symbol, SymbolType};
