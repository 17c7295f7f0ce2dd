//! Markdown build report.

use crate::error::Result;
use crate::jsonl;
use crate::merge::MergeOutcome;
use crate::paper::Paper;
use crate::taxonomy::{self, Label};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the report needs to know about one build.
#[derive(Debug)]
pub struct ReportInput<'a> {
    pub papers: &'a [Paper],
    pub generated_rows: usize,
    pub merge: MergeOutcome,
    pub science_training: &'a Path,
    pub packs: &'a [PathBuf],
    pub report: &'a Path,
}

/// Paper count per domain tag, sorted by tag.
pub fn domain_coverage(papers: &[Paper]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for paper in papers {
        *counts.entry(paper.domain.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Paper count per taxonomy label, sorted by label text.
pub fn label_coverage(papers: &[Paper]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for paper in papers {
        let label: Label = taxonomy::classify(&paper.domain);
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    counts
}

pub fn render(input: &ReportInput<'_>, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "# Swift Scientific Corpus Build Report".to_string(),
        String::new(),
        format!("- Generated at (UTC): {}", generated_at.to_rfc3339()),
        format!("- Scientific papers loaded: {}", input.papers.len()),
        format!("- Research-derived training rows generated: {}", input.generated_rows),
        format!("- Rows merged into base dataset: {}", input.merge.added),
        format!("- Existing rows updated in base dataset: {}", input.merge.updated),
        format!("- Base dataset total rows: {}", input.merge.total),
    ];

    lines.extend(table_header("Domain coverage", "Domain"));
    for (domain, count) in domain_coverage(input.papers) {
        lines.push(format!("| {domain} | {count} |"));
    }

    lines.extend(table_header("Label mapping coverage", "Label"));
    for (label, count) in label_coverage(input.papers) {
        lines.push(format!("| {label} | {count} |"));
    }

    lines.extend([String::new(), "## Outputs".to_string(), String::new()]);
    for pack in input.packs {
        lines.push(format!("- research pack: `{}`", pack.display()));
    }
    lines.push(format!(
        "- generated science training rows: `{}`",
        input.science_training.display()
    ));
    lines.push(format!("- report: `{}`", input.report.display()));

    lines.extend(
        [
            "",
            "## Next step",
            "",
            "Run local training to update Swift model payloads:",
            "",
            "```bash",
            "./scripts/train-local-model-loop.sh",
            "```",
        ]
        .map(String::from),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn table_header(title: &str, column: &str) -> [String; 5] {
    [
        String::new(),
        format!("## {title}"),
        String::new(),
        format!("| {column} | Count |"),
        "| --- | ---: |".to_string(),
    ]
}

/// Render with the current time and write to `input.report`.
pub fn write_report(input: &ReportInput<'_>) -> Result<()> {
    let content = render(input, Utc::now());
    jsonl::write_text(input.report, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn paper(title: &str, domain: &str) -> Paper {
        Paper {
            id: title.to_lowercase(),
            title: title.to_string(),
            year: 2020,
            domain: domain.to_string(),
            actionable_insight: "i".to_string(),
            action_hint: "h".to_string(),
            source_url: "https://doi.org/".to_string(),
            keywords: vec![],
        }
    }

    #[test]
    fn test_coverage_counts() {
        let papers = vec![paper("A", "travel"), paper("B", "mobility"), paper("C", "zzz")];
        let domains = domain_coverage(&papers);
        assert_eq!(domains.into_iter().collect::<Vec<_>>(), vec![("mobility", 1), ("travel", 1), ("zzz", 1)]);

        let labels = label_coverage(&papers);
        assert_eq!(labels.get("travel_design_journey_ops"), Some(&2));
        assert_eq!(labels.get("travel_design_strategy"), Some(&1));
    }

    #[test]
    fn test_render_contains_counts_and_paths() {
        let papers = vec![paper("A", "wealth")];
        let packs = vec![PathBuf::from("/out/ios.swift")];
        let input = ReportInput {
            papers: &papers,
            generated_rows: 3,
            merge: MergeOutcome { added: 2, updated: 1, total: 10 },
            science_training: Path::new("/out/science.jsonl"),
            packs: &packs,
            report: Path::new("/out/report.md"),
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid time");

        let md = render(&input, at);
        assert!(md.contains("- Generated at (UTC): 2024-01-02T03:04:05+00:00"));
        assert!(md.contains("- Research-derived training rows generated: 3"));
        assert!(md.contains("- Existing rows updated in base dataset: 1"));
        assert!(md.contains("| wealth | 1 |"));
        assert!(md.contains("| travel_design_revenue | 1 |"));
        assert!(md.contains("- research pack: `/out/ios.swift`"));
        assert!(md.ends_with("```\n"));
    }
}
