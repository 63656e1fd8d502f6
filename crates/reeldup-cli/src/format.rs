//! Report rendering: TSV pairs and JSON lines.
//!
//! - **TSV** (default): one `ref<TAB>dup` line per duplicate, no header,
//!   ascending by representative then duplicate.
//! - **JSON**: one object `{"representative": .., "duplicates": [..]}` per
//!   equivalence class, one class per line.
//!
//! An empty result renders as the empty string in both modes.
use reeldup_core::{Clusters, DedupStats};

use crate::OutputFormat;

/// Renders `clusters` in the requested layout.
///
/// # Errors
///
/// Propagates a `serde_json` serialization error (JSON mode only).
pub fn render(clusters: &Clusters, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Tsv => Ok(render_tsv(clusters)),
        OutputFormat::Json => render_json_lines(clusters),
    }
}

/// One `ref<TAB>dup` line per duplicate.
pub fn render_tsv(clusters: &Clusters) -> String {
    let mut out = String::new();
    for (representative, duplicate) in clusters.pairs() {
        out.push_str(representative.as_str());
        out.push('\t');
        out.push_str(duplicate.as_str());
        out.push('\n');
    }
    out
}

/// One JSON object per class, newline-terminated.
///
/// # Errors
///
/// Propagates a `serde_json` serialization error.
pub fn render_json_lines(clusters: &Clusters) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for class in clusters.classes() {
        out.push_str(&serde_json::to_string(class)?);
        out.push('\n');
    }
    Ok(out)
}

/// Run counters as a single-line JSON object.
///
/// # Errors
///
/// Propagates a `serde_json` serialization error.
pub fn render_stats(stats: &DedupStats, clusters: &Clusters) -> Result<String, serde_json::Error> {
    let value = serde_json::json!({
        "records": stats.records,
        "windows": stats.windows,
        "buckets": stats.buckets,
        "candidates": stats.candidates,
        "matches": stats.matches,
        "classes": clusters.len(),
        "duplicates": clusters.duplicate_count(),
    });
    serde_json::to_string(&value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use reeldup_core::{EquivalenceMerger, MatchEdge, MovieId};

    use super::*;

    fn id(s: &str) -> MovieId {
        MovieId::try_from(s).expect("valid id")
    }

    fn clusters(edges: &[(&str, &str)]) -> Clusters {
        let mut merger = EquivalenceMerger::new();
        for (a, b) in edges {
            merger.add_edge(&MatchEdge::new(id(a), id(b)));
        }
        merger.finalize()
    }

    #[test]
    fn tsv_lists_one_line_per_duplicate() {
        let c = clusters(&[("tt4", "tt1"), ("tt3", "tt1"), ("tt9", "tt8")]);
        assert_eq!(render_tsv(&c), "tt1\ttt3\ntt1\ttt4\ntt8\ttt9\n");
    }

    #[test]
    fn empty_result_renders_empty_in_both_modes() {
        let c = Clusters::default();
        assert_eq!(render(&c, OutputFormat::Tsv).expect("tsv"), "");
        assert_eq!(render(&c, OutputFormat::Json).expect("json"), "");
    }

    #[test]
    fn json_lines_one_object_per_class() {
        let c = clusters(&[("b", "a"), ("c", "a"), ("y", "x")]);
        let text = render_json_lines(&c).expect("json");
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).expect("each line is JSON"))
            .collect();
        assert_eq!(
            lines,
            vec![
                serde_json::json!({"representative": "a", "duplicates": ["b", "c"]}),
                serde_json::json!({"representative": "x", "duplicates": ["y"]}),
            ]
        );
    }

    #[test]
    fn stats_include_class_totals() {
        let c = clusters(&[("b", "a"), ("c", "a")]);
        let stats = DedupStats {
            records: 5,
            windows: 1,
            buckets: 2,
            candidates: 4,
            matches: 2,
        };
        let value: serde_json::Value =
            serde_json::from_str(&render_stats(&stats, &c).expect("stats")).expect("JSON");
        assert_eq!(value["records"], 5);
        assert_eq!(value["classes"], 1);
        assert_eq!(value["duplicates"], 2);
    }
}
