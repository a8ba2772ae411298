use impact_edit_script::{
    parse, parse_with_diagnostics, EditOperation, EditScriptError, Node, SkipReason,
};
use pretty_assertions::assert_eq;

const UPDATE: &str = "\
===
update-node
---
SimpleName: total [120,125]
replace total by sum
";

const INSERT: &str = "\
===
insert-tree
---
ExpressionStatement [130,148]
    MethodInvocation [130,147]
        SimpleName: log [130,133]
to
Block [110,160]
at 2
";

const MOVE: &str = "\
===
move-tree
---
MethodDeclaration [200,260]
    SimpleName: helper [212,218]
to
TypeDeclaration [0,400]
at 5
";

const DELETE: &str = "\
===
delete-node
---
Identifier: unused [42,48]
";

const MATCH: &str = "\
===
match
---
MethodDeclaration [10,90]
MethodDeclaration [10,95]
";

#[test]
fn update_node_section_parses_verbatim() {
    let ops = parse(UPDATE).unwrap();
    assert_eq!(
        ops,
        vec![EditOperation::UpdateNode {
            node: Node::new("SimpleName: total", 120, 125),
            old: "total".to_string(),
            new: "sum".to_string(),
        }]
    );
}

#[test]
fn insert_tree_section_parses_destination() {
    let ops = parse(INSERT).unwrap();
    assert_eq!(
        ops,
        vec![EditOperation::InsertTree {
            node: Node::new("ExpressionStatement", 130, 148),
            to: Node::new("Block", 110, 160),
            at: 2,
        }]
    );
}

#[test]
fn move_tree_section_parses_destination() {
    let ops = parse(MOVE).unwrap();
    assert_eq!(
        ops,
        vec![EditOperation::MoveTree {
            node: Node::new("MethodDeclaration", 200, 260),
            to: Node::new("TypeDeclaration", 0, 400),
            at: 5,
        }]
    );
}

#[test]
fn delete_node_section_parses_node_only() {
    let ops = parse(DELETE).unwrap();
    assert_eq!(
        ops,
        vec![EditOperation::DeleteNode {
            node: Node::new("Identifier: unused", 42, 48),
        }]
    );
}

#[test]
fn match_sections_produce_nothing() {
    assert_eq!(parse(MATCH).unwrap(), vec![]);
}

#[test]
fn replacement_values_are_opaque() {
    let raw = "===\nupdate-node\n---\nStringLiteral: \"a b\" [5,12]\nreplace \"a b\" by \"a by b\"\n";
    let ops = parse(raw).unwrap();
    match &ops[0] {
        EditOperation::UpdateNode { old, new, .. } => {
            assert_eq!(old, "\"a b\"");
            assert_eq!(new, "\"a by b\"");
        }
        other => panic!("expected update-node, got {other:?}"),
    }
}

#[test]
fn garbled_section_is_skipped_without_disturbing_neighbours() {
    let garbled = "===\ndelete-node\n---\nthis line has no range\n";
    let script = format!("{UPDATE}{garbled}{INSERT}{MATCH}{DELETE}");

    let parsed = parse_with_diagnostics(&script).unwrap();
    let actions: Vec<_> = parsed
        .operations
        .iter()
        .map(|op| op.action().as_str())
        .collect();
    assert_eq!(actions, vec!["update-node", "insert-tree", "delete-node"]);

    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].ordinal, 1);
    assert!(matches!(
        parsed.skipped[0].reason,
        SkipReason::NodePattern { .. }
    ));
}

#[test]
fn section_without_part_delimiter_is_skipped() {
    let advisory = "===\nnote: 3 actions\n";
    let script = format!("{advisory}{DELETE}");
    let ops = parse(&script).unwrap();
    assert_eq!(ops.len(), 1);
}

#[test]
fn unknown_action_is_fatal() {
    let unknown = "===\ninsert-node\n---\nIdentifier [1,2]\nto\nBlock [0,9]\nat 0\n";
    let script = format!("{UPDATE}{unknown}{DELETE}");

    let err = parse(&script).unwrap_err();
    match &err {
        EditScriptError::UnknownAction { action, section } => {
            assert_eq!(action, "insert-node");
            assert!(section.contains("Block [0,9]"));
        }
        other => panic!("expected UnknownAction, got {other:?}"),
    }
    assert!(err.section().starts_with("insert-node"));
}

#[test]
fn update_without_replacement_is_fatal() {
    let raw = "===\nupdate-node\n---\nSimpleName: x [1,2]\n";
    assert!(matches!(
        parse(raw),
        Err(EditScriptError::MissingReplacement { .. })
    ));
}

#[test]
fn insert_without_index_is_fatal() {
    let raw = "===\ninsert-tree\n---\nStatement [1,5]\nto\nBlock [0,9]\n";
    assert!(matches!(
        parse(raw),
        Err(EditScriptError::MissingDestination { .. })
    ));
}

#[test]
fn output_preserves_section_order() {
    let script = format!("{DELETE}{MOVE}{UPDATE}");
    let ops = parse(&script).unwrap();
    let starts: Vec<_> = ops.iter().map(|op| op.node().start_byte).collect();
    assert_eq!(starts, vec![42, 200, 120]);
}
