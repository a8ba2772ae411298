use crate::symbols::Relation;
use impact_edit_script::{EditOperation, Node};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// `symbol_kind` of a block that is not inside any declaration
pub const FILE_LEVEL_KIND: &str = "file";

/// `symbol_kind` of a related location in a file with no syntax index
pub const REFERENCE_KIND: &str = "reference";

/// Half-open byte range `[start_byte, end_byte)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteRange {
    pub start_byte: usize,
    pub end_byte: usize,
}

impl ByteRange {
    pub const fn new(start_byte: usize, end_byte: usize) -> Self {
        Self {
            start_byte,
            end_byte,
        }
    }

    /// Overlapping or adjacent (`[0,5)` touches `[5,9)`)
    pub const fn touches(&self, other: &ByteRange) -> bool {
        self.start_byte <= other.end_byte && other.start_byte <= self.end_byte
    }

    pub fn union(&self, other: &ByteRange) -> ByteRange {
        ByteRange::new(
            self.start_byte.min(other.start_byte),
            self.end_byte.max(other.end_byte),
        )
    }
}

impl From<&Node> for ByteRange {
    fn from(node: &Node) -> Self {
        Self::new(node.start_byte, node.end_byte)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start_byte, self.end_byte)
    }
}

/// How an operation reached a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Impact {
    /// The block encloses an edited node
    Direct,

    /// Reached through `hop` symbol relations, the last one being `relation`
    Transitive { relation: Relation, hop: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cause {
    pub operation: EditOperation,
    pub impact: Impact,
}

impl Cause {
    pub fn direct(operation: &EditOperation) -> Self {
        Self {
            operation: operation.clone(),
            impact: Impact::Direct,
        }
    }

    pub fn transitive(operation: &EditOperation, relation: Relation, hop: usize) -> Self {
        Self {
            operation: operation.clone(),
            impact: Impact::Transitive { relation, hop },
        }
    }

    pub const fn is_direct(&self) -> bool {
        matches!(self.impact, Impact::Direct)
    }
}

/// A code region that must be re-examined because of a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedBlock {
    pub uri: String,
    pub range: ByteRange,
    pub symbol_kind: String,
    pub causes: BTreeSet<Cause>,
    #[serde(default)]
    pub already_seen: bool,
}

impl AffectedBlock {
    pub fn new(
        uri: impl Into<String>,
        range: ByteRange,
        symbol_kind: impl Into<String>,
        cause: Cause,
    ) -> Self {
        Self {
            uri: uri.into(),
            range,
            symbol_kind: symbol_kind.into(),
            causes: BTreeSet::from([cause]),
            already_seen: false,
        }
    }

    pub fn is_file_level(&self) -> bool {
        self.symbol_kind == FILE_LEVEL_KIND
    }

    /// At least one operation edits this block directly
    pub fn is_direct(&self) -> bool {
        self.causes.iter().any(Cause::is_direct)
    }

    /// Same file and same byte range
    pub fn same_location(&self, other: &AffectedBlock) -> bool {
        self.uri == other.uri && self.range == other.range
    }
}

/// Previously resolved changes, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalContext {
    pub previous_changes: Vec<Change>,
}

impl TemporalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished change together with the blocks resolved for it.
    /// The stored change drops its own history so records do not nest.
    pub fn record(&mut self, change: Change, blocks: Vec<AffectedBlock>) {
        let mut change = change;
        change.temporal = TemporalContext::default();
        change.remediated = blocks;
        self.previous_changes.push(change);
    }

    /// A previous change already resolved this exact location
    pub fn is_remediated(&self, uri: &str, range: ByteRange) -> bool {
        self.previous_changes.iter().any(|change| {
            change
                .remediated
                .iter()
                .any(|block| block.uri == uri && block.range == range)
        })
    }

    pub fn len(&self) -> usize {
        self.previous_changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous_changes.is_empty()
    }
}

/// One edit-script diff of one file plus what came before it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Raw edit script text
    pub diff: String,
    pub uri: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub temporal: TemporalContext,
    #[serde(default)]
    pub remediated: Vec<AffectedBlock>,
}

impl Change {
    pub fn new(uri: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            uri: uri.into(),
            description: String::new(),
            temporal: TemporalContext::default(),
            remediated: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_temporal(mut self, temporal: TemporalContext) -> Self {
        self.temporal = temporal;
        self
    }
}

/// Result of resolving one change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub blocks: Vec<AffectedBlock>,

    /// Some transitive impact is missing because the symbol service failed
    pub partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_ranges() {
        let a = ByteRange::new(0, 5);
        assert!(a.touches(&ByteRange::new(5, 9)));
        assert!(a.touches(&ByteRange::new(2, 3)));
        assert!(!a.touches(&ByteRange::new(6, 9)));
        assert_eq!(a.union(&ByteRange::new(3, 9)), ByteRange::new(0, 9));
    }

    #[test]
    fn test_record_flattens_history() {
        let op = EditOperation::DeleteNode {
            node: Node::new("Name", 3, 4),
        };
        let block = AffectedBlock::new(
            "file:///a.java",
            ByteRange::new(0, 10),
            FILE_LEVEL_KIND,
            Cause::direct(&op),
        );

        let mut older = TemporalContext::new();
        older.record(Change::new("file:///a.java", "older"), vec![]);

        let mut history = TemporalContext::new();
        history.record(
            Change::new("file:///a.java", "diff").with_temporal(older),
            vec![block],
        );

        assert_eq!(history.len(), 1);
        assert!(history.previous_changes[0].temporal.is_empty());
        assert!(history.is_remediated("file:///a.java", ByteRange::new(0, 10)));
        assert!(!history.is_remediated("file:///a.java", ByteRange::new(0, 11)));
        assert!(!history.is_remediated("file:///b.java", ByteRange::new(0, 10)));
    }

    #[test]
    fn test_impact_serializes_tagged() {
        let impact = Impact::Transitive {
            relation: Relation::Callers,
            hop: 1,
        };
        let json = serde_json::to_value(impact).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "transitive", "relation": "callers", "hop": 1 })
        );
    }
}
