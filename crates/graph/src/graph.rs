use crate::types::{CodeGraph, RelationshipType};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl CodeGraph {
    /// Innermost symbol declared in `uri` whose range contains `offset`
    pub fn symbol_at(&self, uri: &str, offset: usize) -> Option<NodeIndex> {
        let mut best: Option<(NodeIndex, usize)> = None;
        for &idx in self.find_nodes_by_uri(uri) {
            let Some(symbol) = self.symbol(idx) else {
                continue;
            };
            if !symbol.contains(offset) {
                continue;
            }
            match best {
                Some((_, len)) if len <= symbol.len() => {}
                _ => best = Some((idx, symbol.len())),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Find all nodes that current node calls (outgoing Calls edges)
    pub fn get_callees(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, RelationshipType::Calls, Direction::Outgoing)
    }

    /// Find all nodes that call current node (incoming Calls edges)
    pub fn get_callers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, RelationshipType::Calls, Direction::Incoming)
    }

    /// Find all nodes that reference current node (incoming Reads edges)
    pub fn get_readers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, RelationshipType::Reads, Direction::Incoming)
    }

    /// Find all methods redefining current node (incoming Overrides edges)
    pub fn get_overriders(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, RelationshipType::Overrides, Direction::Incoming)
    }

    /// Neighbours over one relationship, in node order, deduplicated
    pub fn neighbors(
        &self,
        node: NodeIndex,
        relationship: RelationshipType,
        direction: Direction,
    ) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| e.weight().relationship == relationship)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
