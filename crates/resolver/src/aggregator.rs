use crate::types::{AffectedBlock, TemporalContext, FILE_LEVEL_KIND, REFERENCE_KIND};
use std::collections::BTreeMap;

/// Merge per-operation blocks into the final, ordered set for one change.
///
/// Blocks of one file whose ranges overlap or touch become one block with
/// the union of ranges and causes. Blocks that exactly match a location
/// remediated by a previous change are flagged `already_seen`, never
/// dropped. Output is sorted by uri, then start offset; running it again on
/// its own output changes nothing.
pub fn aggregate(current: Vec<AffectedBlock>, temporal: &TemporalContext) -> Vec<AffectedBlock> {
    let mut by_uri: BTreeMap<String, Vec<AffectedBlock>> = BTreeMap::new();
    for block in current {
        by_uri.entry(block.uri.clone()).or_default().push(block);
    }

    let mut merged = Vec::new();
    for (_, mut blocks) in by_uri {
        blocks.sort_by_key(|block| (block.range.start_byte, block.range.end_byte));

        let mut file_blocks: Vec<AffectedBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match file_blocks.last_mut() {
                Some(last) if last.range.touches(&block.range) => absorb(last, block),
                _ => file_blocks.push(block),
            }
        }
        merged.extend(file_blocks);
    }

    for block in &mut merged {
        if temporal.is_remediated(&block.uri, block.range) {
            block.already_seen = true;
        }
    }

    merged
}

fn absorb(into: &mut AffectedBlock, block: AffectedBlock) {
    into.range = into.range.union(&block.range);
    if specificity(&block.symbol_kind) > specificity(&into.symbol_kind) {
        into.symbol_kind = block.symbol_kind;
    }
    into.causes.extend(block.causes);
    into.already_seen |= block.already_seen;
}

/// Declaration kinds beat bare references, which beat the file sentinel
fn specificity(kind: &str) -> u8 {
    match kind {
        FILE_LEVEL_KIND => 0,
        REFERENCE_KIND => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ByteRange, Cause, Change};
    use impact_edit_script::{EditOperation, Node};
    use pretty_assertions::assert_eq;

    fn delete(start: usize) -> EditOperation {
        EditOperation::DeleteNode {
            node: Node::new("Name", start, start + 1),
        }
    }

    fn block(uri: &str, start: usize, end: usize, kind: &str) -> AffectedBlock {
        AffectedBlock::new(
            uri,
            ByteRange::new(start, end),
            kind,
            Cause::direct(&delete(start)),
        )
    }

    #[test]
    fn test_overlap_merge() {
        let out = aggregate(
            vec![
                block("file:///a.java", 40, 60, "method_declaration"),
                block("file:///a.java", 10, 50, "method_declaration"),
            ],
            &TemporalContext::new(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].range, ByteRange::new(10, 60));
        assert_eq!(out[0].causes.len(), 2);
    }

    #[test]
    fn test_adjacent_ranges_merge() {
        let out = aggregate(
            vec![
                block("file:///a.java", 0, 5, FILE_LEVEL_KIND),
                block("file:///a.java", 5, 9, "field_declaration"),
                block("file:///a.java", 10, 12, "field_declaration"),
            ],
            &TemporalContext::new(),
        );
        let ranges: Vec<ByteRange> = out.iter().map(|b| b.range).collect();
        assert_eq!(ranges, vec![ByteRange::new(0, 9), ByteRange::new(10, 12)]);
        assert_eq!(out[0].symbol_kind, "field_declaration");
    }

    #[test]
    fn test_order_and_idempotence() {
        let input = vec![
            block("file:///b.java", 0, 10, "class_declaration"),
            block("file:///a.java", 30, 40, "method_declaration"),
            block("file:///a.java", 5, 20, "method_declaration"),
            block("file:///a.java", 15, 25, FILE_LEVEL_KIND),
        ];
        let once = aggregate(input, &TemporalContext::new());
        let keys: Vec<(&str, usize)> = once
            .iter()
            .map(|b| (b.uri.as_str(), b.range.start_byte))
            .collect();
        assert_eq!(
            keys,
            vec![("file:///a.java", 5), ("file:///a.java", 30), ("file:///b.java", 0)]
        );

        let twice = aggregate(once.clone(), &TemporalContext::new());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_already_seen_is_annotated_not_removed() {
        let mut history = TemporalContext::new();
        history.record(
            Change::new("file:///a.java", "earlier"),
            vec![block("file:///a.java", 10, 50, "method_declaration")],
        );

        let out = aggregate(
            vec![
                block("file:///a.java", 10, 50, "method_declaration"),
                block("file:///a.java", 70, 90, "method_declaration"),
            ],
            &history,
        );
        assert_eq!(out.len(), 2);
        assert!(out[0].already_seen);
        assert!(!out[1].already_seen);
    }
}
