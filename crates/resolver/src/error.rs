use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

/// Fatal resolution errors. Symbol service failures are not among them:
/// they degrade the report to `partial` instead.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Edit script error: {0}")]
    EditScript(#[from] impact_edit_script::EditScriptError),

    #[error("Syntax index error: {0}")]
    Index(#[from] impact_syntax_index::IndexError),

    #[error("Symbol graph error: {0}")]
    Graph(#[from] impact_graph::GraphError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    Task(String),
}

/// Symbol service failures; always recovered by the expander
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Symbol service unavailable: {0}")]
    Unavailable(String),

    #[error("Symbol service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Symbol service error: {0}")]
    Backend(String),
}
