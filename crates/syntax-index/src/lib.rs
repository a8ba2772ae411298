//! # Impact Syntax Index
//!
//! Answers "which declaration encloses this byte range" for one version of a
//! source file.
//!
//! ## Architecture
//!
//! ```text
//! Source Code / tree_sitter::Tree
//!     │
//!     ├──> Language Detection (from extension or name)
//!     │
//!     ├──> Tree-sitter Parsing → AST
//!     │
//!     └──> Pre-order walk
//!          ├─> Keep block-like kinds (methods, types, fields)
//!          └─> enclosing_block(start, end) → smallest containing block
//! ```
//!
//! ## Example
//!
//! ```rust
//! use impact_syntax_index::{BlockKinds, Language, SyntaxIndex};
//!
//! let code = "struct Point { x: i32 }\nfn norm(p: &Point) -> i32 { p.x }\n";
//! let kinds = BlockKinds::for_language(Language::Rust);
//! let index = SyntaxIndex::parse("file:///point.rs", code, Language::Rust, &kinds).unwrap();
//!
//! let block = index.enclosing_block(52, 55).unwrap();
//! assert_eq!(block.kind, "function_item");
//! ```

mod config;
mod error;
mod index;
mod language;

pub use config::{BlockClass, BlockKinds};
pub use error::{IndexError, Result};
pub use index::SyntaxIndex;
pub use language::Language;
