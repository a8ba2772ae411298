use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared symbol (function, method, type, field)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name (e.g., "abs", "Complex")
    pub name: String,

    /// Enclosing type name, if declared inside one
    pub parent_scope: Option<String>,

    /// File URI
    pub uri: String,

    /// Byte range of the whole declaration
    pub start_byte: usize,
    pub end_byte: usize,

    /// Grammar node kind (e.g., "method_declaration")
    pub kind: String,

    pub symbol_type: SymbolType,
}

impl Symbol {
    /// "Parent.name" when scoped, otherwise the bare name
    pub fn qualified_name(&self) -> String {
        match &self.parent_scope {
            Some(scope) => format!("{scope}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset < self.end_byte
    }

    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolType {
    Function,
    Method,
    Type,
    Field,
}

impl SymbolType {
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }
}

/// Type of relationship between symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    /// A calls B (function call)
    Calls,

    /// A references field or type B
    Reads,

    /// A redefines method B under another type
    Overrides,
}

/// Node in code graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub symbol: Symbol,
}

/// Edge in code graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Type of relationship
    pub relationship: RelationshipType,

    /// Byte range of the first reference site inside the source symbol
    pub site: (usize, usize),
}

/// Symbol graph over a set of source files
#[derive(Debug)]
pub struct CodeGraph {
    /// Directed graph (symbol -> symbol with relationships)
    pub graph: DiGraph<GraphNode, GraphEdge>,

    /// Symbol name -> NodeIndex mapping for fast lookup
    pub name_index: HashMap<String, Vec<NodeIndex>>,

    /// File URI -> NodeIndex mapping
    pub uri_index: HashMap<String, Vec<NodeIndex>>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_index: HashMap::new(),
            uri_index: HashMap::new(),
        }
    }

    /// Add node to graph
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let name = node.symbol.name.clone();
        let uri = node.symbol.uri.clone();

        let idx = self.graph.add_node(node);

        // Update indices
        self.name_index.entry(name).or_default().push(idx);
        self.uri_index.entry(uri).or_default().push(idx);

        idx
    }

    /// Add edge unless one with the same relationship already connects the pair
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) -> bool {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().relationship == edge.relationship);
        if exists {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    /// Find nodes by symbol name
    pub fn find_nodes(&self, name: &str) -> &[NodeIndex] {
        self.name_index.get(name).map_or(&[], Vec::as_slice)
    }

    /// Find nodes declared in a file
    pub fn find_nodes_by_uri(&self, uri: &str) -> &[NodeIndex] {
        self.uri_index.get(uri).map_or(&[], Vec::as_slice)
    }

    /// Get node data
    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    /// Get symbol of a node
    pub fn symbol(&self, idx: NodeIndex) -> Option<&Symbol> {
        self.get_node(idx).map(|node| &node.symbol)
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for CodeGraph {
    fn default() -> Self {
        Self::new()
    }
}
