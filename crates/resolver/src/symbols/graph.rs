use super::{Relation, RelatedLocation, SymbolService};
use crate::config::ImpactConfig;
use crate::error::{Result, SymbolError};
use crate::types::ByteRange;
use async_trait::async_trait;
use impact_graph::{build_project, build_project_with, CodeGraph, SourceFile};

/// Symbol service backed by a local tree-sitter symbol graph
pub struct GraphSymbolService {
    graph: CodeGraph,
}

impl GraphSymbolService {
    pub fn new(graph: CodeGraph) -> Self {
        Self { graph }
    }

    /// Build the graph for a set of source files
    pub fn from_sources(files: &[SourceFile]) -> Result<Self> {
        Ok(Self::new(build_project(files)?))
    }

    /// Build the graph with the block kinds `config` sets per language, so
    /// the graph declares the same blocks the syntax indexes do
    pub fn from_sources_with(files: &[SourceFile], config: &ImpactConfig) -> Result<Self> {
        let graph = build_project_with(files, |language| config.kinds_for(language))?;
        Ok(Self::new(graph))
    }

    pub fn graph(&self) -> &CodeGraph {
        &self.graph
    }

    /// Declarations related to the innermost symbol at `byte_offset`
    pub fn lookup(&self, uri: &str, byte_offset: usize, relation: Relation) -> Vec<RelatedLocation> {
        let Some(node) = self.graph.symbol_at(uri, byte_offset) else {
            log::debug!("No symbol declared at {uri}:{byte_offset}");
            return Vec::new();
        };

        let related = match relation {
            Relation::Callers => self.graph.get_callers(node),
            Relation::Overriders => self.graph.get_overriders(node),
            Relation::Readers => self.graph.get_readers(node),
        };

        let mut locations: Vec<RelatedLocation> = related
            .into_iter()
            .filter_map(|idx| self.graph.symbol(idx))
            .map(|symbol| {
                RelatedLocation::new(
                    symbol.uri.clone(),
                    ByteRange::new(symbol.start_byte, symbol.end_byte),
                )
            })
            .collect();
        locations.sort();
        locations.dedup();
        locations
    }
}

#[async_trait]
impl SymbolService for GraphSymbolService {
    async fn find_related(
        &mut self,
        uri: &str,
        byte_offset: usize,
        relation: Relation,
    ) -> std::result::Result<Vec<RelatedLocation>, SymbolError> {
        Ok(self.lookup(uri, byte_offset, relation))
    }
}
