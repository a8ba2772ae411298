use anyhow::{Context, Result};
use impact_graph::SourceFile;
use impact_resolver::{
    build_index, GraphSymbolService, ImpactConfig, ImpactExpander, StaticSymbolService,
    TemporalContext,
};
use impact_syntax_index::Language;
use std::fs;
use std::path::Path;

/// `file://` URI of a local path
pub fn file_uri(path: &Path) -> Result<String> {
    let absolute = path
        .canonicalize()
        .with_context(|| format!("Invalid path {}", path.display()))?;
    Ok(format!("file://{}", absolute.display()))
}

pub fn read_text(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {what} {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<ImpactConfig> {
    match path {
        Some(path) => ImpactConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ImpactConfig::default()),
    }
}

pub fn load_history(path: Option<&Path>) -> Result<TemporalContext> {
    let Some(path) = path else {
        return Ok(TemporalContext::new());
    };
    if !path.exists() {
        log::info!("History {} not found, starting empty", path.display());
        return Ok(TemporalContext::new());
    }
    let raw = read_text(path, "history")?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid history JSON {}", path.display()))
}

pub fn save_history(path: &Path, history: &TemporalContext) -> Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    fs::write(path, json).with_context(|| format!("Failed to write history {}", path.display()))
}

pub fn load_relations(path: &Path) -> Result<StaticSymbolService> {
    StaticSymbolService::load(path)
        .with_context(|| format!("Failed to load relation table {}", path.display()))
}

/// Graph backend over `paths`, registering each parsable file with the
/// expander so related locations resolve to their enclosing blocks
pub async fn load_graph(
    paths: &[std::path::PathBuf],
    config: &ImpactConfig,
    expander: &mut ImpactExpander,
) -> Result<GraphSymbolService> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let uri = file_uri(path)?;
        let content = read_text(path, "graph source")?;
        let language = Language::from_path(path);
        if language.supports_ast() {
            let index = build_index(uri.clone(), content.clone(), language, config)
                .await
                .with_context(|| format!("Failed to index {}", path.display()))?;
            expander.add_index(index);
        }
        files.push(SourceFile::new(uri, content));
    }

    let service = GraphSymbolService::from_sources_with(&files, config)
        .context("Failed to build symbol graph")?;
    log::info!(
        "Symbol graph: {} symbols from {} file(s)",
        service.graph().node_count(),
        files.len()
    );
    Ok(service)
}
