use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse semantic class of a block-like node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockClass {
    /// Method, function or constructor declaration
    Callable,

    /// Class, struct, interface, enum, trait or impl block
    Type,

    /// Field, constant or static variable declaration
    Field,
}

impl BlockClass {
    /// Get human-readable name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Callable => "callable",
            Self::Type => "type",
            Self::Field => "field",
        }
    }
}

/// Node kinds treated as "blocks" by the index, with their class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKinds {
    kinds: BTreeMap<String, BlockClass>,
}

impl BlockKinds {
    /// Default block kinds for a tree-sitter grammar
    pub fn for_language(language: Language) -> Self {
        let table: &[(&str, BlockClass)] = match language {
            Language::Rust => &[
                ("function_item", BlockClass::Callable),
                ("function_signature_item", BlockClass::Callable),
                ("struct_item", BlockClass::Type),
                ("enum_item", BlockClass::Type),
                ("union_item", BlockClass::Type),
                ("trait_item", BlockClass::Type),
                ("impl_item", BlockClass::Type),
                ("type_item", BlockClass::Type),
                ("field_declaration", BlockClass::Field),
                ("const_item", BlockClass::Field),
                ("static_item", BlockClass::Field),
            ],
            Language::Java => &[
                ("method_declaration", BlockClass::Callable),
                ("constructor_declaration", BlockClass::Callable),
                ("class_declaration", BlockClass::Type),
                ("interface_declaration", BlockClass::Type),
                ("enum_declaration", BlockClass::Type),
                ("record_declaration", BlockClass::Type),
                ("annotation_type_declaration", BlockClass::Type),
                ("field_declaration", BlockClass::Field),
                ("constant_declaration", BlockClass::Field),
            ],
            Language::Python => &[
                ("function_definition", BlockClass::Callable),
                ("class_definition", BlockClass::Type),
            ],
            Language::JavaScript | Language::TypeScript => &[
                ("function_declaration", BlockClass::Callable),
                ("generator_function_declaration", BlockClass::Callable),
                ("method_definition", BlockClass::Callable),
                ("class_declaration", BlockClass::Type),
                ("abstract_class_declaration", BlockClass::Type),
                ("interface_declaration", BlockClass::Type),
                ("enum_declaration", BlockClass::Type),
                ("type_alias_declaration", BlockClass::Type),
                ("field_definition", BlockClass::Field),
                ("public_field_definition", BlockClass::Field),
            ],
            Language::Unknown => &[],
        };

        table
            .iter()
            .map(|(kind, class)| ((*kind).to_string(), *class))
            .collect()
    }

    /// Builder: add or reclassify a kind
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>, class: BlockClass) -> Self {
        self.kinds.insert(kind.into(), class);
        self
    }

    /// Builder: stop treating a kind as a block
    #[must_use]
    pub fn without_kind(mut self, kind: &str) -> Self {
        self.kinds.remove(kind);
        self
    }

    /// Merge overrides on top of these kinds
    pub fn extend(&mut self, overrides: &BlockKinds) {
        for (kind, class) in &overrides.kinds {
            self.kinds.insert(kind.clone(), *class);
        }
    }

    /// Class of a node kind, `None` when the kind is not block-like
    pub fn class_of(&self, kind: &str) -> Option<BlockClass> {
        self.kinds.get(kind).copied()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }
}

impl FromIterator<(String, BlockClass)> for BlockKinds {
    fn from_iter<I: IntoIterator<Item = (String, BlockClass)>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}
