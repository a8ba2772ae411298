use crate::error::{ResolverError, Result};
use crate::symbols::Relation;
use impact_syntax_index::{BlockClass, BlockKinds, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Relations queried for each block class during transitive expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationPolicy {
    pub callable: Vec<Relation>,
    pub types: Vec<Relation>,
    pub fields: Vec<Relation>,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self {
            callable: vec![Relation::Callers, Relation::Overriders],
            types: vec![Relation::Readers],
            fields: vec![Relation::Readers],
        }
    }
}

impl RelationPolicy {
    pub fn for_class(&self, class: BlockClass) -> &[Relation] {
        match class {
            BlockClass::Callable => &self.callable,
            BlockClass::Type => &self.types,
            BlockClass::Field => &self.fields,
        }
    }
}

/// Resolver configuration, usually loaded from `impact.toml`
///
/// ```toml
/// max_hops = 2
/// symbol_timeout_ms = 2000
///
/// [block_kinds.java]
/// lambda_expression = "callable"
///
/// [relations]
/// callable = ["callers"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Transitive expansion depth (0 disables expansion)
    pub max_hops: usize,

    /// Upper bound for a single symbol service query
    pub symbol_timeout_ms: u64,

    /// Pending requests the symbol session accepts before senders wait
    pub queue_capacity: usize,

    /// Extra block kinds per language name, merged over the defaults
    pub block_kinds: BTreeMap<String, BlockKinds>,

    pub relations: RelationPolicy,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            max_hops: 1,
            symbol_timeout_ms: 5_000,
            queue_capacity: 64,
            block_kinds: BTreeMap::new(),
            relations: RelationPolicy::default(),
        }
    }
}

impl ImpactConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| ResolverError::InvalidConfig(format!("malformed TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("Loaded impact config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol_timeout_ms == 0 {
            return Err(ResolverError::InvalidConfig(
                "symbol_timeout_ms must be positive".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ResolverError::InvalidConfig(
                "queue_capacity must be positive".to_string(),
            ));
        }
        for name in self.block_kinds.keys() {
            if !Language::from_name(name).supports_ast() {
                return Err(ResolverError::InvalidConfig(format!(
                    "block_kinds: unknown language '{name}'"
                )));
            }
        }
        Ok(())
    }

    pub fn symbol_timeout(&self) -> Duration {
        Duration::from_millis(self.symbol_timeout_ms)
    }

    /// Default block kinds for `language` with configured overrides applied
    pub fn kinds_for(&self, language: Language) -> BlockKinds {
        let mut kinds = BlockKinds::for_language(language);
        for (name, overrides) in &self.block_kinds {
            if Language::from_name(name) == language {
                kinds.extend(overrides);
            }
        }
        kinds
    }
}
