use crate::error::{EditScriptError, Result};
use crate::types::{Action, EditOperation, Node};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const SECTION_DELIMITER: &str = "===";
const PART_DELIMITER: &str = "---";

/// Lazy on the type so labels may themselves contain spaces or brackets;
/// only the trailing `[start,end]` is structural.
fn node_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*?)\s\[(\d+),(\d+)\]$").expect("static node pattern"))
}

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*?)\s(\d+)$").expect("static index pattern"))
}

fn replace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^replace\s(.*?)\sby\s(.*)$").expect("static replace pattern")
    })
}

/// Why a section was dropped without failing the parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Section did not split into exactly one action and one argument block
    PartCount { parts: usize },

    /// First argument line is not `<type> [<start>,<end>]`
    NodePattern { line: String },

    /// Node range has `start > end`
    InvertedRange { start: usize, end: usize },
}

/// Diagnostic record for a skipped section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSection {
    /// Position among the non-empty sections of the script (0-based)
    pub ordinal: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Parse result with the recovered (skipped) sections kept for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedScript {
    pub operations: Vec<EditOperation>,
    pub skipped: Vec<SkippedSection>,
}

/// Parse an edit script into operations, in section order.
///
/// Equivalent to [`parse_with_diagnostics`] without the skip report.
pub fn parse(raw: &str) -> Result<Vec<EditOperation>> {
    parse_with_diagnostics(raw).map(|parsed| parsed.operations)
}

/// Parse an edit script, reporting which sections were skipped and why.
pub fn parse_with_diagnostics(raw: &str) -> Result<ParsedScript> {
    let mut parsed = ParsedScript::default();

    for (ordinal, section) in split_sections(raw).into_iter().enumerate() {
        match parse_section(&section)? {
            SectionOutcome::Operation(op) => parsed.operations.push(op),
            SectionOutcome::Match => {}
            SectionOutcome::Skipped(reason) => {
                log::debug!("Skipping edit script section {ordinal}: {reason:?}");
                parsed.skipped.push(SkippedSection { ordinal, reason });
            }
        }
    }

    Ok(parsed)
}

enum SectionOutcome {
    Operation(EditOperation),
    Match,
    Skipped(SkipReason),
}

/// Split on `===` lines, dropping sections that contain only whitespace
fn split_sections(raw: &str) -> Vec<Vec<&str>> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.trim_end() == SECTION_DELIMITER {
            sections.push(std::mem::take(&mut current));
        } else {
            current.push(line);
        }
    }
    sections.push(current);

    sections
        .into_iter()
        .filter(|lines| lines.iter().any(|line| !line.trim().is_empty()))
        .collect()
}

fn parse_section(lines: &[&str]) -> Result<SectionOutcome> {
    let parts: Vec<&[&str]> = lines
        .split(|line| line.trim_end() == PART_DELIMITER)
        .collect();
    if parts.len() != 2 {
        return Ok(SectionOutcome::Skipped(SkipReason::PartCount { parts: parts.len() }));
    }

    let action_text = parts[0].join("\n");
    let action_token = action_text.trim();
    let action = Action::from_token(action_token).ok_or_else(|| EditScriptError::UnknownAction {
        action: action_token.to_string(),
        section: lines.join("\n"),
    })?;

    let argument_text = parts[1].join("\n");
    let arguments: Vec<&str> = argument_text.trim().split('\n').collect();

    // `match` arguments are never validated
    let node = match capture_node(arguments[0]) {
        Ok(node) => node,
        Err(_) if action == Action::Match => return Ok(SectionOutcome::Match),
        Err(reason) => return Ok(SectionOutcome::Skipped(reason)),
    };

    let op = match action {
        Action::Match => return Ok(SectionOutcome::Match),
        Action::UpdateNode => {
            let last = arguments.last().copied().unwrap_or_default();
            let caps = replace_pattern().captures(last).ok_or_else(|| {
                EditScriptError::MissingReplacement {
                    section: lines.join("\n"),
                }
            })?;
            EditOperation::UpdateNode {
                node,
                old: caps[1].to_string(),
                new: caps[2].to_string(),
            }
        }
        Action::InsertTree | Action::MoveTree => {
            let (to, at) = capture_destination(&arguments).ok_or_else(|| {
                EditScriptError::MissingDestination {
                    action: action.as_str().to_string(),
                    section: lines.join("\n"),
                }
            })?;
            if action == Action::InsertTree {
                EditOperation::InsertTree { node, to, at }
            } else {
                EditOperation::MoveTree { node, to, at }
            }
        }
        Action::DeleteNode => EditOperation::DeleteNode { node },
    };

    Ok(SectionOutcome::Operation(op))
}

fn capture_node(line: &str) -> std::result::Result<Node, SkipReason> {
    let line = line.trim_end();
    let no_match = || SkipReason::NodePattern {
        line: line.to_string(),
    };

    let caps = node_pattern().captures(line).ok_or_else(no_match)?;
    let start: usize = caps[2].parse().map_err(|_| no_match())?;
    let end: usize = caps[3].parse().map_err(|_| no_match())?;
    if start > end {
        return Err(SkipReason::InvertedRange { start, end });
    }

    Ok(Node::new(&caps[1], start, end))
}

/// Second-to-last line is the destination node, last line is `<label> <index>`.
/// Requires a node line before them, so at least three argument lines.
fn capture_destination(arguments: &[&str]) -> Option<(Node, usize)> {
    if arguments.len() < 3 {
        return None;
    }

    let to = capture_node(arguments[arguments.len() - 2].trim()).ok()?;
    let last = arguments[arguments.len() - 1].trim();
    let at = index_pattern().captures(last)?[2].parse().ok()?;

    Some((to, at))
}
