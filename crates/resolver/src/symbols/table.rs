use super::{Relation, RelatedLocation, SymbolService};
use crate::error::{ResolverError, Result, SymbolError};
use crate::types::ByteRange;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of a relation table: symbols at `range` in `uri` have `related`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub uri: String,
    pub range: ByteRange,
    pub relation: Relation,
    pub related: Vec<RelatedLocation>,
}

/// In-memory relation table.
///
/// JSON form is a list of entries:
///
/// ```json
/// [
///   {
///     "uri": "file:///src/Shape.java",
///     "range": { "start_byte": 40, "end_byte": 90 },
///     "relation": "callers",
///     "related": [
///       { "uri": "file:///src/Report.java", "range": { "start_byte": 25, "end_byte": 110 } }
///     ]
///   }
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticSymbolService {
    entries: Vec<RelationEntry>,
}

impl StaticSymbolService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(
        mut self,
        uri: impl Into<String>,
        range: ByteRange,
        relation: Relation,
        related: Vec<RelatedLocation>,
    ) -> Self {
        self.entries.push(RelationEntry {
            uri: uri.into(),
            range,
            relation,
            related,
        });
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ResolverError::InvalidConfig(format!("malformed relation table: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn entries(&self) -> &[RelationEntry] {
        &self.entries
    }

    /// Related locations of every entry containing `byte_offset`, deduplicated
    pub fn lookup(&self, uri: &str, byte_offset: usize, relation: Relation) -> Vec<RelatedLocation> {
        let mut found: Vec<RelatedLocation> = self
            .entries
            .iter()
            .filter(|entry| entry.uri == uri && entry.relation == relation)
            .filter(|entry| {
                entry.range.start_byte <= byte_offset && byte_offset < entry.range.end_byte
            })
            .flat_map(|entry| entry.related.iter().cloned())
            .collect();
        found.sort();
        found.dedup();
        found
    }
}

#[async_trait]
impl SymbolService for StaticSymbolService {
    async fn find_related(
        &mut self,
        uri: &str,
        byte_offset: usize,
        relation: Relation,
    ) -> std::result::Result<Vec<RelatedLocation>, SymbolError> {
        Ok(self.lookup(uri, byte_offset, relation))
    }
}
