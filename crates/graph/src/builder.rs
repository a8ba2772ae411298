use crate::error::{GraphError, Result};
use crate::types::*;
use impact_syntax_index::{BlockClass, BlockKinds, Language};
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tree_sitter::{Node, Parser, Tree};

/// Leaf kinds that name a field, type or variable at a use site
const REFERENCE_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "type_identifier",
    "property_identifier",
];

/// Source file fed to the graph builder
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub uri: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
        }
    }

    pub fn language(&self) -> Language {
        Language::from_path(&self.uri)
    }
}

/// Per-language parser and declaration kinds used while building a graph
struct GraphBuilder {
    language: Language,
    kinds: BlockKinds,
    parser: Parser,
}

impl GraphBuilder {
    fn new(language: Language, kinds: BlockKinds) -> Result<Self> {
        let parser = language.parser()?;
        Ok(Self {
            language,
            kinds,
            parser,
        })
    }

    fn parse(&mut self, file: &SourceFile) -> Result<Tree> {
        self.parser
            .parse(&file.content, None)
            .ok_or_else(|| GraphError::BuildError(format!("Failed to parse {}", file.uri)))
    }

    /// Add a node per named declaration
    fn declare(&self, graph: &mut CodeGraph, file: &SourceFile, tree: &Tree) {
        self.traverse_for_declarations(graph, file, tree.root_node(), None);
    }

    fn traverse_for_declarations(
        &self,
        graph: &mut CodeGraph,
        file: &SourceFile,
        node: Node,
        scope: Option<&str>,
    ) {
        let mut child_scope = scope.map(str::to_string);

        if let Some(class) = self.kinds.class_of(node.kind()) {
            if let Some(name) = declaration_name(node, &file.content) {
                let symbol_type = match class {
                    BlockClass::Callable if scope.is_some() => SymbolType::Method,
                    BlockClass::Callable => SymbolType::Function,
                    BlockClass::Type => SymbolType::Type,
                    BlockClass::Field => SymbolType::Field,
                };
                graph.add_node(GraphNode {
                    symbol: Symbol {
                        name: name.clone(),
                        parent_scope: scope.map(str::to_string),
                        uri: file.uri.clone(),
                        start_byte: node.start_byte(),
                        end_byte: node.end_byte(),
                        kind: node.kind().to_string(),
                        symbol_type,
                    },
                });
                if class == BlockClass::Type {
                    child_scope = Some(name);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.traverse_for_declarations(graph, file, child, child_scope.as_deref());
        }
    }

    /// Add Calls and Reads edges from every reference site
    fn link_references(&self, graph: &mut CodeGraph, file: &SourceFile, tree: &Tree) {
        let mut callee_sites = HashSet::new();
        self.traverse_for_references(graph, file, tree.root_node(), &mut callee_sites);
    }

    fn traverse_for_references(
        &self,
        graph: &mut CodeGraph,
        file: &SourceFile,
        node: Node,
        callee_sites: &mut HashSet<usize>,
    ) {
        if let Some(callee) = self.callee_leaf(node) {
            callee_sites.insert(callee.id());
            if let Some(name) = node_text(callee, &file.content) {
                let site = (node.start_byte(), node.end_byte());
                link_site(graph, &file.uri, &name, site, RelationshipType::Calls);
            }
        } else if REFERENCE_KINDS.contains(&node.kind())
            && !callee_sites.contains(&node.id())
            && !self.is_declaration_name(node)
        {
            if let Some(name) = node_text(node, &file.content) {
                let site = (node.start_byte(), node.end_byte());
                link_site(graph, &file.uri, &name, site, RelationshipType::Reads);
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.traverse_for_references(graph, file, child, callee_sites);
        }
    }

    /// Name leaf of a call site, language-specific
    fn callee_leaf<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        match (self.language, node.kind()) {
            (Language::Java, "method_invocation") => node.child_by_field_name("name"),
            (Language::Java, "object_creation_expression") => node
                .child_by_field_name("type")
                .filter(|ty| ty.kind() == "type_identifier"),
            (Language::Rust | Language::JavaScript | Language::TypeScript, "call_expression")
            | (Language::Python, "call") => {
                callee_name_leaf(node.child_by_field_name("function")?)
            }
            _ => None,
        }
    }

    /// Identifier naming its own declaration rather than referencing one
    fn is_declaration_name(&self, node: Node) -> bool {
        let Some(parent) = node.parent() else {
            return false;
        };
        let is_field = |field: &str| {
            parent
                .child_by_field_name(field)
                .is_some_and(|named| named.id() == node.id())
        };
        is_field("name") || (self.kinds.contains(parent.kind()) && is_field("property"))
    }
}

/// Build one graph from files of any supported languages, using the
/// default declaration kinds of each language.
///
/// Files whose language cannot be detected from the URI are skipped.
pub fn build_project(files: &[SourceFile]) -> Result<CodeGraph> {
    build_project_with(files, BlockKinds::for_language)
}

/// Like [`build_project`], with the declaration kinds of each language
/// supplied by `kinds_for`
pub fn build_project_with(
    files: &[SourceFile],
    kinds_for: impl Fn(Language) -> BlockKinds,
) -> Result<CodeGraph> {
    let mut builders: BTreeMap<Language, GraphBuilder> = BTreeMap::new();
    let mut parsed: Vec<(Language, &SourceFile, Tree)> = Vec::new();
    let mut graph = CodeGraph::new();

    for file in files {
        let language = file.language();
        if !language.supports_ast() {
            log::warn!("Skipping {}: unsupported language", file.uri);
            continue;
        }
        let builder = match builders.entry(language) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(GraphBuilder::new(language, kinds_for(language))?)
            }
        };
        let tree = builder.parse(file)?;
        builder.declare(&mut graph, file, &tree);
        parsed.push((language, file, tree));
    }

    for (language, file, tree) in &parsed {
        if let Some(builder) = builders.get(language) {
            builder.link_references(&mut graph, file, tree);
        }
    }
    link_overrides(&mut graph);

    log::info!(
        "Built project graph from {} file(s): {} nodes, {} edges",
        parsed.len(),
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}

/// Edge from the innermost symbol around `site` to every same-named target
fn link_site(
    graph: &mut CodeGraph,
    uri: &str,
    name: &str,
    site: (usize, usize),
    relationship: RelationshipType,
) {
    let Some(from) = graph.symbol_at(uri, site.0) else {
        return;
    };

    let targets: Vec<NodeIndex> = graph
        .find_nodes(name)
        .iter()
        .copied()
        .filter(|&idx| idx != from)
        .filter(|&idx| {
            graph.symbol(idx).is_some_and(|symbol| match relationship {
                RelationshipType::Calls => symbol.symbol_type.is_callable(),
                RelationshipType::Reads => {
                    matches!(symbol.symbol_type, SymbolType::Field | SymbolType::Type)
                }
                RelationshipType::Overrides => false,
            })
        })
        .collect();

    for to in targets {
        graph.add_edge(from, to, GraphEdge { relationship, site });
    }
}

/// Same-named methods declared under different types override each other.
/// Name based: there is no type hierarchy to consult.
fn link_overrides(graph: &mut CodeGraph) {
    let mut by_name: HashMap<String, Vec<NodeIndex>> = HashMap::new();
    for idx in graph.graph.node_indices() {
        if let Some(symbol) = graph.symbol(idx) {
            if symbol.symbol_type == SymbolType::Method {
                by_name.entry(symbol.name.clone()).or_default().push(idx);
            }
        }
    }

    for methods in by_name.values() {
        for &a in methods {
            for &b in methods {
                let (Some(sa), Some(sb)) = (graph.symbol(a), graph.symbol(b)) else {
                    continue;
                };
                if a == b || sa.parent_scope == sb.parent_scope {
                    continue;
                }
                let site = (sa.start_byte, sa.end_byte);
                graph.add_edge(
                    a,
                    b,
                    GraphEdge {
                        relationship: RelationshipType::Overrides,
                        site,
                    },
                );
            }
        }
    }
}

fn callee_name_leaf(function: Node) -> Option<Node> {
    match function.kind() {
        "identifier" | "field_identifier" | "property_identifier" => Some(function),
        "field_expression" => function.child_by_field_name("field"),
        "member_expression" => function.child_by_field_name("property"),
        "attribute" => function.child_by_field_name("attribute"),
        "scoped_identifier" => function.child_by_field_name("name"),
        "generic_function" => callee_name_leaf(function.child_by_field_name("function")?),
        _ => None,
    }
}

/// Name of a declaration node
fn declaration_name(node: Node, content: &str) -> Option<String> {
    if node.kind() == "impl_item" {
        return type_base_name(node.child_by_field_name("type")?, content);
    }
    for field in ["name", "property"] {
        if let Some(named) = node.child_by_field_name(field) {
            return node_text(named, content);
        }
    }
    // Java field_declaration: name lives on the first variable_declarator
    let declarator = node.child_by_field_name("declarator")?;
    node_text(declarator.child_by_field_name("name")?, content)
}

/// `Car` for `Car`, `Car<T>` and `module::Car`
fn type_base_name(node: Node, content: &str) -> Option<String> {
    match node.kind() {
        "generic_type" => type_base_name(node.child_by_field_name("type")?, content),
        "scoped_type_identifier" => node_text(node.child_by_field_name("name")?, content),
        _ => node_text(node, content),
    }
}

fn node_text(node: Node, content: &str) -> Option<String> {
    content
        .get(node.start_byte()..node.end_byte())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
