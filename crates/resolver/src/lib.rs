//! # Impact Resolver
//!
//! Turns an edit-script diff of one file into the set of code blocks that
//! must be re-examined: blocks the edits touch directly, plus blocks related
//! through callers, overriders and readers as reported by a symbol service.
//!
//! ## Architecture
//!
//! ```text
//! Change (edit script + history)
//!     │
//!     ├──> impact-edit-script → EditOperation[]
//!     │
//!     ├──> ImpactExpander (per operation)
//!     │      ├─ SyntaxIndex::enclosing_block → direct blocks
//!     │      └─ SymbolSession (actor) → transitive blocks, max_hops deep
//!     │
//!     └──> aggregate → merged, ordered ImpactReport
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use impact_resolver::{
//!     build_index, Change, ImpactConfig, ImpactResolver, StaticSymbolService, SymbolSession,
//! };
//! use impact_syntax_index::Language;
//!
//! # async fn run(diff: String, source: String) -> impact_resolver::Result<()> {
//! let config = ImpactConfig::default();
//! let index = build_index("file:///Shape.java", source, Language::Java, &config).await?;
//! let session = SymbolSession::open("/project", StaticSymbolService::new(), &config);
//!
//! let resolver = ImpactResolver::new(config);
//! let report = resolver
//!     .resolve_change(&Change::new("file:///Shape.java", diff), &index, &session)
//!     .await?;
//! println!("{} block(s), partial: {}", report.blocks.len(), report.partial);
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod config;
mod error;
mod expander;
mod resolver;
mod symbols;
mod types;

pub use aggregator::aggregate;
pub use config::{ImpactConfig, RelationPolicy};
pub use error::{ResolverError, Result, SymbolError};
pub use expander::{Expansion, ImpactExpander};
pub use resolver::{build_index, ImpactResolver};
pub use symbols::{
    GraphSymbolService, Relation, RelatedLocation, RelationEntry, StaticSymbolService,
    SymbolService, SymbolSession,
};
pub use types::{
    AffectedBlock, ByteRange, Cause, Change, Impact, ImpactReport, TemporalContext,
    FILE_LEVEL_KIND, REFERENCE_KIND,
};
