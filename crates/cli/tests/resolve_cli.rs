use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SHAPE: &str = r"public class Shape {
    public double area() {
        return 0;
    }

    public double scaled() {
        return area() * 2;
    }
}
";

#[allow(deprecated)]
fn impact() -> Command {
    Command::cargo_bin("impact").expect("binary")
}

/// Writes Shape.java and a diff updating the literal inside `area`
fn setup(root: &Path) {
    fs::write(root.join("Shape.java"), SHAPE).unwrap();
    let start = SHAPE.find("0;").unwrap();
    fs::write(
        root.join("change.diff"),
        format!(
            "===\nmatch\n---\nMethodDeclaration [25,90]\nMethodDeclaration [25,90]\n\
             ===\nupdate-node\n---\nNumberLiteral: 0 [{start},{}]\nreplace 0 by 1\n",
            start + 1
        ),
    )
    .unwrap();
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn resolve_prints_direct_block() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    setup(root);

    let report = run_json(
        impact()
            .current_dir(root)
            .args(["--quiet", "resolve", "--diff", "change.diff", "--source", "Shape.java"])
            .args(["--uri", "file:///Shape.java", "--max-hops", "0"]),
    );

    assert_eq!(report["partial"], false);
    let blocks = report["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["uri"], "file:///Shape.java");
    assert_eq!(blocks[0]["symbol_kind"], "method_declaration");
    assert_eq!(
        blocks[0]["range"]["start_byte"],
        SHAPE.find("public double area").unwrap()
    );
    assert_eq!(blocks[0]["causes"][0]["impact"]["kind"], "direct");
    assert_eq!(blocks[0]["causes"][0]["operation"]["action"], "update-node");
}

#[test]
fn graph_backend_reports_callers() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    setup(root);

    let report = run_json(
        impact()
            .current_dir(root)
            .args(["--quiet", "resolve", "--diff", "change.diff", "--source", "Shape.java"])
            .args(["--graph", "Shape.java"]),
    );

    let blocks = report["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[1]["range"]["start_byte"],
        SHAPE.find("public double scaled").unwrap()
    );
    assert_eq!(blocks[1]["causes"][0]["impact"]["relation"], "callers");
    assert_eq!(blocks[1]["causes"][0]["impact"]["hop"], 1);
}

#[test]
fn recorded_history_marks_repeat_blocks() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    setup(root);

    let resolve = || {
        let mut cmd = impact();
        cmd.current_dir(root)
            .args(["--quiet", "resolve", "--diff", "change.diff", "--source", "Shape.java"])
            .args(["--max-hops", "0", "--history", "history.json", "--record"]);
        cmd
    };

    let first = run_json(&mut resolve());
    assert_eq!(first["blocks"][0]["already_seen"], false);
    assert!(root.join("history.json").exists());

    let second = run_json(&mut resolve());
    assert_eq!(second["blocks"][0]["already_seen"], true);

    let history: Value =
        serde_json::from_str(&fs::read_to_string(root.join("history.json")).unwrap()).unwrap();
    assert_eq!(history["previous_changes"].as_array().unwrap().len(), 2);
}

#[test]
fn parse_reports_skipped_sections() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(
        root.join("garbled.diff"),
        "===\ndelete-node\n---\nIdentifier: tmp [4,7]\n===\ndelete-node\n---\nno range here\n",
    )
    .unwrap();

    let parsed = run_json(
        impact()
            .current_dir(root)
            .args(["--quiet", "parse", "--diff", "garbled.diff"]),
    );

    assert_eq!(parsed["operations"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["operations"][0]["node"]["type"], "Identifier: tmp");
    assert_eq!(parsed["skipped"][0]["ordinal"], 1);
    assert_eq!(parsed["skipped"][0]["reason"], "node_pattern");
}

#[test]
fn unknown_action_fails() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    setup(root);
    fs::write(
        root.join("bad.diff"),
        "===\nupdate-tree\n---\nSimpleName: x [1,2]\n",
    )
    .unwrap();

    impact()
        .current_dir(root)
        .args(["resolve", "--diff", "bad.diff", "--source", "Shape.java"])
        .assert()
        .failure()
        .stderr(contains("update-tree"));
}

const COUNTER: &str = r"public class Counter {
    public int next() {
        int step = 2;
        return step + 1;
    }
}
";

#[test]
fn config_block_kinds_reach_the_graph_backend() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("Counter.java"), COUNTER).unwrap();
    let start = COUNTER.find("2;").unwrap();
    fs::write(
        root.join("change.diff"),
        format!(
            "===\nupdate-node\n---\nNumberLiteral: 2 [{start},{}]\nreplace 2 by 3\n",
            start + 1
        ),
    )
    .unwrap();
    fs::write(
        root.join("impact.toml"),
        "[block_kinds.java]\nlocal_variable_declaration = \"field\"\n",
    )
    .unwrap();

    let report = run_json(
        impact()
            .current_dir(root)
            .args(["--quiet", "resolve", "--diff", "change.diff", "--source", "Counter.java"])
            .args(["--config", "impact.toml", "--graph", "Counter.java"]),
    );

    let blocks = report["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    let relations: Vec<&Value> = blocks[0]["causes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|cause| &cause["impact"]["relation"])
        .collect();
    assert!(relations.contains(&&Value::from("readers")));
}
