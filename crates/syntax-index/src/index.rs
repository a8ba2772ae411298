use crate::config::{BlockClass, BlockKinds};
use crate::error::{IndexError, Result};
use crate::language::Language;
use impact_edit_script::Node;
use tree_sitter::Tree;

/// Block-like nodes of one file version, in tree pre-order.
///
/// Built once per `(uri, tree)`; holds no borrow of the tree so it can be
/// shared across tasks.
#[derive(Debug, Clone)]
pub struct SyntaxIndex {
    uri: String,
    kinds: BlockKinds,
    blocks: Vec<Node>,
    file_len: usize,
}

impl SyntaxIndex {
    /// Index an already parsed tree
    pub fn from_tree(uri: impl Into<String>, tree: &Tree, kinds: &BlockKinds) -> Self {
        let root = tree.root_node();
        let blocks = collect_blocks(tree, kinds);
        let uri = uri.into();

        log::debug!(
            "Indexed {} block(s) in {} ({} bytes)",
            blocks.len(),
            uri,
            root.end_byte()
        );

        Self {
            uri,
            kinds: kinds.clone(),
            blocks,
            file_len: root.end_byte(),
        }
    }

    /// Parse `source` with tree-sitter and index the result
    pub fn parse(
        uri: impl Into<String>,
        source: &str,
        language: Language,
        kinds: &BlockKinds,
    ) -> Result<Self> {
        let mut parser = language.parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| IndexError::parse("Failed to parse source code"))?;
        Ok(Self::from_tree(uri, &tree, kinds))
    }

    /// Build an index from explicit nodes, given in pre-order.
    /// Nodes whose kind is not in `kinds` are ignored.
    pub fn from_nodes(
        uri: impl Into<String>,
        nodes: impl IntoIterator<Item = Node>,
        kinds: &BlockKinds,
        file_len: usize,
    ) -> Self {
        Self {
            uri: uri.into(),
            kinds: kinds.clone(),
            blocks: nodes
                .into_iter()
                .filter(|node| kinds.contains(&node.kind))
                .collect(),
            file_len,
        }
    }

    /// Smallest block whose range contains `[start_byte, end_byte)`.
    ///
    /// Equal-sized candidates resolve to the one met first in pre-order.
    /// `None` means the range is only covered at file level.
    pub fn enclosing_block(&self, start_byte: usize, end_byte: usize) -> Option<&Node> {
        let mut best: Option<&Node> = None;
        for block in &self.blocks {
            if !block.contains(start_byte, end_byte) {
                continue;
            }
            match best {
                Some(current) if current.len() <= block.len() => {}
                _ => best = Some(block),
            }
        }
        best
    }

    /// Class of an indexed block kind
    pub fn class_of(&self, kind: &str) -> Option<BlockClass> {
        self.kinds.class_of(kind)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Source length in bytes
    pub fn file_len(&self) -> usize {
        self.file_len
    }

    /// All indexed blocks in pre-order
    pub fn blocks(&self) -> &[Node] {
        &self.blocks
    }
}

fn collect_blocks(tree: &Tree, kinds: &BlockKinds) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut cursor = tree.walk();

    'walk: loop {
        let node = cursor.node();
        if kinds.contains(node.kind()) {
            blocks.push(Node::new(node.kind(), node.start_byte(), node.end_byte()));
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    blocks
}
