use thiserror::Error;

/// Result type for edit script parsing
pub type Result<T> = std::result::Result<T, EditScriptError>;

/// Fatal edit script errors.
///
/// Sections that merely fail the node pattern are not errors; they are
/// reported as [`crate::SkippedSection`] and parsing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditScriptError {
    /// Action token is not one of the recognized actions
    #[error("Unknown edit action `{action}` in section:\n{section}")]
    UnknownAction { action: String, section: String },

    /// `update-node` without a trailing `replace <old> by <new>` line
    #[error("update-node section has no `replace <old> by <new>` line:\n{section}")]
    MissingReplacement { section: String },

    /// `insert-tree`/`move-tree` without a destination node and index
    #[error("{action} section has no destination node and index:\n{section}")]
    MissingDestination { action: String, section: String },
}

impl EditScriptError {
    /// Raw section text the error was raised for
    pub fn section(&self) -> &str {
        match self {
            Self::UnknownAction { section, .. }
            | Self::MissingReplacement { section }
            | Self::MissingDestination { section, .. } => section,
        }
    }
}
