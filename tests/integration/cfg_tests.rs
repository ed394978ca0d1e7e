//! CFG construction integration tests.
//!
//! Exercises the public pipeline from raw source text to a serialized
//! control flow graph.

use blockflow::{cfg_from_source, BlockId, Cfg, EdgeType, StatementKind};

fn cfg_of(source: &str) -> Cfg {
    cfg_from_source(source)
}

fn has_edge(cfg: &Cfg, from: usize, to: usize, edge_type: EdgeType) -> bool {
    cfg.edges
        .iter()
        .any(|e| e.from == BlockId(from) && e.to == BlockId(to) && e.edge_type == edge_type)
}

// =============================================================================
// Full-pipeline shape tests
// =============================================================================

#[test]
fn function_body_with_branch_and_loop() {
    let source = "\
int total = 0;
int i = 0;
while (i < n)
total = total + i;
i = i + 1;
if (total > 100)
return total;
total = 0;
return total;
";
    let cfg = cfg_of(source);

    // Leaders: 0 (first), 2 (while), 3 (after while), 5 (if), 6 (after if),
    // 7 (after return).
    assert_eq!(cfg.node_count(), 6);

    // Loop wiring around the while header.
    assert!(has_edge(&cfg, 1, 2, EdgeType::LoopBody));
    assert!(has_edge(&cfg, 2, 1, EdgeType::BackEdge));

    // Branch wiring around the if.
    assert!(has_edge(&cfg, 3, 4, EdgeType::True));
    assert!(has_edge(&cfg, 3, 5, EdgeType::False));

    // The return-terminated block has no sequential successor.
    let return_block = cfg
        .blocks
        .iter()
        .find(|b| b.last_kind() == Some(StatementKind::Return) && b.id != cfg.blocks.last().unwrap().id)
        .expect("mid-stream return block");
    assert!(
        !cfg.edges.iter().any(
            |e| e.from == return_block.id && e.edge_type == EdgeType::Sequential
        ),
        "return block {} must not fall through",
        return_block.id
    );
}

#[test]
fn comments_do_not_shift_block_boundaries() {
    let with_comments = "\
x = 1; // seed
/* a block
   comment */
if (x)
y = 2;
";
    let without_comments = "x = 1;\nif (x)\ny = 2;\n";

    let a = cfg_of(with_comments);
    let b = cfg_of(without_comments);

    assert_eq!(a.node_count(), b.node_count());
    assert_eq!(a.edge_count(), b.edge_count());
    for (ba, bb) in a.blocks.iter().zip(b.blocks.iter()) {
        assert_eq!(ba.start, bb.start);
        assert_eq!(ba.end, bb.end);
    }
}

#[test]
fn switch_fans_out_to_all_case_blocks() {
    let source = "\
switch (op)
case ADD:
r = a + b;
break;
case SUB:
r = a - b;
break;
default:
r = 0;
";
    let cfg = cfg_of(source);

    let case_blocks: Vec<BlockId> = cfg
        .blocks
        .iter()
        .filter(|b| b.contains_case_label())
        .map(|b| b.id)
        .collect();
    assert_eq!(case_blocks.len(), 3);

    for case in case_blocks {
        assert!(
            has_edge(&cfg, 0, case.0, EdgeType::Sequential),
            "switch header must dispatch to {case}"
        );
    }
}

#[test]
fn every_block_is_a_node_even_when_unreachable() {
    // The block after the unconditional return has no incoming edges.
    let cfg = cfg_of("return 0;\nx = 1;\ny = 2;\n");
    assert_eq!(cfg.node_count(), 2);
    assert!(cfg.predecessors(BlockId(1)).is_empty());
    assert!(cfg.successors(BlockId(0)).is_empty());
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn cfg_survives_json_round_trip() {
    let cfg = cfg_of("a = 1;\nif (a)\nb = 2;\nwhile (b)\nb = b - 1;\n");

    let json = serde_json::to_string(&cfg).expect("serializes");
    // Edge types use stable snake_case labels.
    assert!(json.contains("\"loop_body\""));
    assert!(json.contains("\"back_edge\""));

    let back: Cfg = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back.node_count(), cfg.node_count());
    assert_eq!(back.edges, cfg.edges);
    // The adjacency cache is rebuilt on demand after deserialization.
    assert_eq!(back.successors(BlockId(0)), cfg.successors(BlockId(0)));
}
