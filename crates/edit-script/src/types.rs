use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a syntax-tree node by label and half-open byte range
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    /// Semantic label as printed by the diff tool (e.g. "MethodDeclaration")
    #[serde(rename = "type")]
    pub kind: String,

    /// Start byte offset (inclusive)
    pub start_byte: usize,

    /// End byte offset (exclusive)
    pub end_byte: usize,
}

impl Node {
    /// Create a node reference. `start_byte` must not exceed `end_byte`.
    pub fn new(kind: impl Into<String>, start_byte: usize, end_byte: usize) -> Self {
        debug_assert!(start_byte <= end_byte, "inverted node range");
        Self {
            kind: kind.into(),
            start_byte,
            end_byte,
        }
    }

    /// Length of the range in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    /// Check whether the range is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    /// Check whether `[start, end)` lies inside this node
    #[must_use]
    pub const fn contains(&self, start: usize, end: usize) -> bool {
        self.start_byte <= start && end <= self.end_byte
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{},{}]", self.kind, self.start_byte, self.end_byte)
    }
}

/// Action token heading an edit script section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Match,
    UpdateNode,
    InsertTree,
    MoveTree,
    DeleteNode,
}

impl Action {
    /// Parse an action token; `None` for anything unrecognized
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "match" => Some(Self::Match),
            "update-node" => Some(Self::UpdateNode),
            "insert-tree" => Some(Self::InsertTree),
            "move-tree" => Some(Self::MoveTree),
            "delete-node" => Some(Self::DeleteNode),
            _ => None,
        }
    }

    /// Token as printed by the diff tool
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::UpdateNode => "update-node",
            Self::InsertTree => "insert-tree",
            Self::MoveTree => "move-tree",
            Self::DeleteNode => "delete-node",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tree edit. `match` correspondences never become an `EditOperation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum EditOperation {
    /// Leaf value changed in place
    UpdateNode { node: Node, old: String, new: String },

    /// `node` inserted as child `at` of `to`
    InsertTree { node: Node, to: Node, at: usize },

    /// `node` relocated to child `at` of `to`
    MoveTree { node: Node, to: Node, at: usize },

    /// `node` removed
    DeleteNode { node: Node },
}

impl EditOperation {
    /// Action this operation was parsed from
    pub const fn action(&self) -> Action {
        match self {
            Self::UpdateNode { .. } => Action::UpdateNode,
            Self::InsertTree { .. } => Action::InsertTree,
            Self::MoveTree { .. } => Action::MoveTree,
            Self::DeleteNode { .. } => Action::DeleteNode,
        }
    }

    /// The edited node
    pub const fn node(&self) -> &Node {
        match self {
            Self::UpdateNode { node, .. }
            | Self::InsertTree { node, .. }
            | Self::MoveTree { node, .. }
            | Self::DeleteNode { node } => node,
        }
    }

    /// Destination parent for inserts and moves
    pub const fn destination(&self) -> Option<&Node> {
        match self {
            Self::InsertTree { to, .. } | Self::MoveTree { to, .. } => Some(to),
            Self::UpdateNode { .. } | Self::DeleteNode { .. } => None,
        }
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateNode { node, old, new } => {
                write!(f, "update-node {node}: {old} -> {new}")
            }
            Self::InsertTree { node, to, at } => write!(f, "insert-tree {node} into {to} at {at}"),
            Self::MoveTree { node, to, at } => write!(f, "move-tree {node} into {to} at {at}"),
            Self::DeleteNode { node } => write!(f, "delete-node {node}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_contains() {
        let node = Node::new("Block", 10, 50);
        assert!(node.contains(10, 50));
        assert!(node.contains(20, 30));
        assert!(!node.contains(5, 20));
        assert!(!node.contains(40, 51));
        assert_eq!(node.len(), 40);
    }

    #[test]
    fn test_action_tokens() {
        for action in [
            Action::Match,
            Action::UpdateNode,
            Action::InsertTree,
            Action::MoveTree,
            Action::DeleteNode,
        ] {
            assert_eq!(Action::from_token(action.as_str()), Some(action));
        }
        assert_eq!(Action::from_token("insert-node"), None);
        assert_eq!(Action::from_token("Match"), None);
    }

    #[test]
    fn test_destination_only_for_tree_edits() {
        let node = Node::new("Name", 1, 2);
        let to = Node::new("Block", 0, 10);
        let insert = EditOperation::InsertTree {
            node: node.clone(),
            to: to.clone(),
            at: 0,
        };
        assert_eq!(insert.destination(), Some(&to));
        assert_eq!(insert.action(), Action::InsertTree);

        let delete = EditOperation::DeleteNode { node };
        assert_eq!(delete.destination(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let op = EditOperation::DeleteNode {
            node: Node::new("Identifier", 4, 7),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["action"], "delete-node");
        assert_eq!(json["node"]["type"], "Identifier");
        assert_eq!(json["node"]["start_byte"], 4);
    }
}
