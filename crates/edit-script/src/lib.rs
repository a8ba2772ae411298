//! # Impact Edit Script
//!
//! Typed model and parser for the textual edit scripts emitted by AST diff
//! tools (GumTree `--format text` style output).
//!
//! ## Format
//!
//! ```text
//! ===
//! update-node
//! ---
//! SimpleName: total [120,125]
//! replace total by sum
//! ===
//! insert-tree
//! ---
//! ExpressionStatement [130,148]
//!     MethodInvocation [130,147]
//! to
//! Block [110,160]
//! at 2
//! ```
//!
//! Sections are separated by `===` lines, the action and its arguments by a
//! `---` line. `match` sections are dropped, malformed sections are skipped,
//! and unknown actions abort the parse.
//!
//! ## Example
//!
//! ```rust
//! use impact_edit_script::{parse, EditOperation};
//!
//! let script = "===\ndelete-node\n---\nIdentifier: tmp [4,7]\n===\n";
//! let ops = parse(script).unwrap();
//! assert!(matches!(ops[0], EditOperation::DeleteNode { .. }));
//! ```

mod error;
mod parser;
mod types;

pub use error::{EditScriptError, Result};
pub use parser::{parse, parse_with_diagnostics, ParsedScript, SkipReason, SkippedSection};
pub use types::{Action, EditOperation, Node};
