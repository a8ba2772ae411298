use crate::aggregator::aggregate;
use crate::config::ImpactConfig;
use crate::error::{ResolverError, Result};
use crate::expander::ImpactExpander;
use crate::symbols::SymbolSession;
use crate::types::{Change, ImpactReport};
use impact_syntax_index::{Language, SyntaxIndex};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Parses a change, expands every operation and aggregates the result
#[derive(Clone)]
pub struct ImpactResolver {
    expander: Arc<ImpactExpander>,
}

impl ImpactResolver {
    pub fn new(config: ImpactConfig) -> Self {
        Self::with_expander(ImpactExpander::new(config))
    }

    /// Resolver over an expander that already knows related file indexes
    pub fn with_expander(expander: ImpactExpander) -> Self {
        Self {
            expander: Arc::new(expander),
        }
    }

    pub fn config(&self) -> &ImpactConfig {
        self.expander.config()
    }

    /// Affected blocks of one change. Edit script errors are fatal; symbol
    /// service failures only mark the report partial.
    pub async fn resolve_change(
        &self,
        change: &Change,
        index: &SyntaxIndex,
        symbols: &SymbolSession,
    ) -> Result<ImpactReport> {
        if change.uri != index.uri() {
            log::warn!(
                "Change targets {} but the index covers {}",
                change.uri,
                index.uri()
            );
        }

        let operations = impact_edit_script::parse(&change.diff)?;
        let mut blocks = Vec::new();
        let mut partial = false;

        for op in &operations {
            let expansion = self.expander.resolve(op, index, symbols).await;
            partial |= expansion.partial;
            blocks.extend(expansion.blocks);
        }

        let blocks = aggregate(blocks, &change.temporal);
        log::info!(
            "Resolved {} operation(s) in {} to {} block(s){}",
            operations.len(),
            change.uri,
            blocks.len(),
            if partial { " (partial)" } else { "" }
        );

        Ok(ImpactReport { blocks, partial })
    }

    /// Resolve several changes concurrently; reports come back in input
    /// order. Symbol queries still go through the one session queue.
    pub async fn resolve_many(
        &self,
        jobs: Vec<(Change, SyntaxIndex)>,
        symbols: &SymbolSession,
    ) -> Vec<Result<ImpactReport>> {
        let total = jobs.len();
        let mut tasks = JoinSet::new();
        for (position, (change, index)) in jobs.into_iter().enumerate() {
            let resolver = self.clone();
            let symbols = symbols.clone();
            tasks.spawn(async move {
                let report = resolver.resolve_change(&change, &index, &symbols).await;
                (position, report)
            });
        }

        let mut slots: Vec<Option<Result<ImpactReport>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, report)) => slots[position] = Some(report),
                Err(e) => log::error!("Resolution task failed: {e}"),
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(ResolverError::Task("task aborted".to_string()))))
            .collect()
    }
}

/// Parse and index a source file on the blocking pool
pub async fn build_index(
    uri: impl Into<String>,
    source: String,
    language: Language,
    config: &ImpactConfig,
) -> Result<SyntaxIndex> {
    let uri = uri.into();
    let kinds = config.kinds_for(language);
    let index = tokio::task::spawn_blocking(move || SyntaxIndex::parse(uri, &source, language, &kinds))
        .await
        .map_err(|e| ResolverError::Task(e.to_string()))??;
    Ok(index)
}
