use crate::config::ImpactConfig;
use crate::error::SymbolError;
use crate::symbols::{RelatedLocation, SymbolSession};
use crate::types::{AffectedBlock, ByteRange, Cause, FILE_LEVEL_KIND, REFERENCE_KIND};
use impact_edit_script::{EditOperation, Node};
use impact_syntax_index::{BlockClass, SyntaxIndex};
use std::collections::{HashMap, HashSet};

/// Blocks touched by one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub blocks: Vec<AffectedBlock>,

    /// Transitive impact was dropped after a symbol service failure
    pub partial: bool,
}

/// Maps edit operations to direct and transitive affected blocks
pub struct ImpactExpander {
    config: ImpactConfig,

    /// Indexes of other files, used to lift related locations to blocks
    related: HashMap<String, SyntaxIndex>,
}

impl ImpactExpander {
    pub fn new(config: ImpactConfig) -> Self {
        Self {
            config,
            related: HashMap::new(),
        }
    }

    pub fn with_index(mut self, index: SyntaxIndex) -> Self {
        self.add_index(index);
        self
    }

    pub fn add_index(&mut self, index: SyntaxIndex) {
        self.related.insert(index.uri().to_string(), index);
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Direct blocks of `op`, then its transitive blocks when the symbol
    /// service answers every query.
    pub async fn resolve(
        &self,
        op: &EditOperation,
        index: &SyntaxIndex,
        symbols: &SymbolSession,
    ) -> Expansion {
        let direct = self.direct_blocks(op, index);
        let mut expansion = Expansion {
            blocks: direct.clone(),
            partial: false,
        };

        match self.expand(op, index, &direct, symbols).await {
            Ok(transitive) => expansion.blocks.extend(transitive),
            Err(err) => {
                log::warn!("Keeping direct impact only for {op}: {err}");
                expansion.partial = true;
            }
        }

        expansion
    }

    /// Enclosing blocks of the nodes `op` touches in the edited file
    pub fn direct_blocks(&self, op: &EditOperation, index: &SyntaxIndex) -> Vec<AffectedBlock> {
        let touched: Vec<&Node> = match op {
            EditOperation::UpdateNode { node, .. } | EditOperation::DeleteNode { node } => {
                vec![node]
            }
            EditOperation::InsertTree { to, .. } => vec![to],
            EditOperation::MoveTree { node, to, .. } => vec![node, to],
        };

        let mut blocks: Vec<AffectedBlock> = Vec::with_capacity(touched.len());
        for node in touched {
            let block = match index.enclosing_block(node.start_byte, node.end_byte) {
                Some(enclosing) => AffectedBlock::new(
                    index.uri(),
                    ByteRange::from(enclosing),
                    enclosing.kind.clone(),
                    Cause::direct(op),
                ),
                None => AffectedBlock::new(
                    index.uri(),
                    ByteRange::from(node),
                    FILE_LEVEL_KIND,
                    Cause::direct(op),
                ),
            };
            if !blocks.iter().any(|seen| seen.same_location(&block)) {
                blocks.push(block);
            }
        }
        blocks
    }

    /// Breadth-first walk over symbol relations, `max_hops` deep.
    /// Any symbol failure aborts the walk for this operation.
    async fn expand(
        &self,
        op: &EditOperation,
        index: &SyntaxIndex,
        direct: &[AffectedBlock],
        symbols: &SymbolSession,
    ) -> Result<Vec<AffectedBlock>, SymbolError> {
        let mut found = Vec::new();
        if self.config.max_hops == 0 {
            return Ok(found);
        }

        let mut visited: HashSet<(String, ByteRange)> = direct
            .iter()
            .map(|block| (block.uri.clone(), block.range))
            .collect();
        let mut frontier: Vec<AffectedBlock> = direct
            .iter()
            .filter(|block| !block.is_file_level())
            .cloned()
            .collect();

        for hop in 1..=self.config.max_hops {
            let mut next = Vec::new();
            for block in &frontier {
                let Some(class) = self.class_of(block, index) else {
                    continue;
                };
                for &relation in self.config.relations.for_class(class) {
                    let locations = symbols
                        .find_related(&block.uri, block.range.start_byte, relation)
                        .await?;
                    for location in locations {
                        let related = self.lift(&location, index, Cause::transitive(op, relation, hop));
                        if visited.insert((related.uri.clone(), related.range)) {
                            next.push(related);
                        }
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            log::debug!("Hop {hop} of {op}: {} new block(s)", next.len());
            found.extend(next.iter().cloned());
            frontier = next;
        }

        Ok(found)
    }

    /// Class of a block's kind, looked up in the index of its file
    fn class_of(&self, block: &AffectedBlock, index: &SyntaxIndex) -> Option<BlockClass> {
        if block.uri == index.uri() {
            return index.class_of(&block.symbol_kind);
        }
        self.related
            .get(&block.uri)
            .and_then(|related| related.class_of(&block.symbol_kind))
    }

    /// Related location as a block: the enclosing block when the file is
    /// indexed, the bare location otherwise
    fn lift(&self, location: &RelatedLocation, index: &SyntaxIndex, cause: Cause) -> AffectedBlock {
        let file_index = if location.uri == index.uri() {
            Some(index)
        } else {
            self.related.get(&location.uri)
        };

        let Some(file_index) = file_index else {
            return AffectedBlock::new(location.uri.clone(), location.range, REFERENCE_KIND, cause);
        };

        match file_index.enclosing_block(location.range.start_byte, location.range.end_byte) {
            Some(enclosing) => AffectedBlock::new(
                location.uri.clone(),
                ByteRange::from(enclosing),
                enclosing.kind.clone(),
                cause,
            ),
            None => AffectedBlock::new(location.uri.clone(), location.range, FILE_LEVEL_KIND, cause),
        }
    }
}
