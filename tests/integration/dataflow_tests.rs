//! Reaching-definitions integration tests.
//!
//! Runs the public analysis entry points end to end and checks dataflow
//! facts, convergence history, and reporting.

use std::io::Write as _;
use std::path::PathBuf;

use blockflow::dataflow::SetPosition;
use blockflow::{analyze_file, analyze_files, analyze_source, DefId, FlowError};

fn ids(v: &[usize]) -> Vec<DefId> {
    v.iter().map(|&n| DefId(n)).collect()
}

// =============================================================================
// Dataflow facts
// =============================================================================

#[test]
fn straight_line_definitions_accumulate() {
    let analysis = analyze_source("straight", "a = 1;\nb = a;\nc = b;\n").expect("analyzes");

    // One block, three definitions, nothing reaches its entry.
    assert_eq!(analysis.cfg.node_count(), 1);
    assert_eq!(analysis.dataflow.reaching_in[&0], ids(&[]));
    assert_eq!(analysis.dataflow.reaching_out[&0], ids(&[1, 2, 3]));
    assert_eq!(analysis.dataflow.passes, 2);
}

#[test]
fn branch_merges_definitions_downstream() {
    let analysis =
        analyze_source("branch", "x = 1;\nif (x > 0) y = 2;\nz = 3;\n").expect("analyzes");

    // The branch line assigns y; both x and y reach the final block.
    assert_eq!(analysis.dataflow.reaching_in[&2], ids(&[1, 2]));
    assert_eq!(analysis.dataflow.reaching_out[&2], ids(&[1, 2, 3]));
}

#[test]
fn loop_feeds_its_own_definitions_back() {
    let analysis = analyze_source(
        "loop",
        "sum = 0;\nwhile (sum < 10)\nsum = sum + 1;\nr = sum;\n",
    )
    .expect("analyzes");

    // The loop header sees the initial definition of sum plus everything
    // the loop body produced, carried around by the back edge.
    let header_in = &analysis.dataflow.reaching_in[&1];
    assert_eq!(header_in, &ids(&[1, 2, 3]));

    // The ambiguity is reported at the header.
    assert!(analysis
        .multi_def_sites
        .iter()
        .any(|s| s.variable == "sum" && s.position == SetPosition::In));
}

#[test]
fn redefinition_kills_across_blocks() {
    // sum is redefined after the branch; the old definition must not
    // survive past the redefining block's exit.
    let analysis = analyze_source(
        "kill",
        "sum = 1;\nif (sum)\nt = sum;\nsum = 2;\nr = sum;\n",
    )
    .expect("analyzes");

    let sum_defs: Vec<DefId> = analysis
        .definitions
        .iter()
        .filter(|d| d.variable == "sum")
        .map(|d| d.id)
        .collect();
    assert_eq!(sum_defs, ids(&[1, 3]));

    let redefining_block = analysis
        .definitions
        .iter()
        .find(|d| d.id == DefId(3))
        .expect("redefinition exists")
        .block;
    let out = &analysis.dataflow.reaching_out[&redefining_block.0];
    assert!(out.contains(&DefId(3)));
    assert!(!out.contains(&DefId(1)), "killed definition leaked: {out:?}");
}

#[test]
fn history_records_every_pass_and_ends_stable() {
    let analysis = analyze_source(
        "history",
        "x = 1;\nwhile (x)\nx = x - 1;\ny = x;\n",
    )
    .expect("analyzes");

    let history = &analysis.dataflow.history;
    assert_eq!(history.len(), analysis.dataflow.passes);
    assert!(history.len() >= 2);
    assert_eq!(history[history.len() - 1], history[history.len() - 2]);

    // The final snapshot agrees with the reported fixpoint.
    for sets in history.last().expect("non-empty history") {
        assert_eq!(
            &analysis.dataflow.reaching_in[&sets.block.0],
            &sets.reaching_in
        );
        assert_eq!(
            &analysis.dataflow.reaching_out[&sets.block.0],
            &sets.reaching_out
        );
    }
}

// =============================================================================
// Reporting and serialization
// =============================================================================

#[test]
fn analysis_report_serializes_to_json() {
    let analysis =
        analyze_source("report", "x = 1;\nif (x)\ny = 2;\nz = y;\n").expect("analyzes");

    let json = serde_json::to_value(&analysis).expect("serializes");
    assert_eq!(json["name"], "report");
    assert_eq!(json["metrics"]["nodes"], analysis.metrics.nodes);
    assert!(json["dataflow"]["history"].is_array());
    assert!(json["gen_kill"].is_array());
}

#[test]
fn def_and_block_display_names() {
    let analysis = analyze_source("names", "x = 1;\n").expect("analyzes");
    assert_eq!(analysis.definitions[0].id.to_string(), "D1");
    assert_eq!(analysis.cfg.blocks[0].name(), "B0");
    assert_eq!(SetPosition::In.to_string(), "IN");
}

// =============================================================================
// File and batch entry points
// =============================================================================

#[test]
fn analyze_file_round_trips_through_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "a = 1;\nif (a)\nb = 2;\nc = a + b;\n").expect("write");

    let analysis = analyze_file(file.path()).expect("analyzes");
    assert_eq!(analysis.definitions.len(), 3);
}

#[test]
fn batch_keeps_order_and_isolates_errors() {
    let mut first = tempfile::NamedTempFile::new().expect("temp file");
    write!(first, "x = 1;\n").expect("write");
    let mut second = tempfile::NamedTempFile::new().expect("temp file");
    write!(second, "y = 2;\nz = y;\n").expect("write");

    let paths = vec![
        first.path().to_path_buf(),
        PathBuf::from("/nonexistent/gone.c"),
        second.path().to_path_buf(),
    ];
    let results = analyze_files(&paths);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].1.as_ref().expect("first ok").definitions.len(), 1);
    assert!(matches!(results[1].1, Err(FlowError::Io { .. })));
    assert_eq!(results[2].1.as_ref().expect("third ok").definitions.len(), 2);
}
