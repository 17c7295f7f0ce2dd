//! End-to-end corpus build.
//!
//! load + dedup → cap → research packs → synthesize → science training file
//! → optional base merge → report. Any fatal error aborts before later stages
//! write anything.

use crate::config::BuildConfig;
use crate::error::Result;
use crate::merge::{self, MergeOutcome};
use crate::report::{self, ReportInput};
use crate::{corpus, jsonl, research_pack, synth};
use std::path::PathBuf;
use tracing::info;

/// Counts and output locations of a finished build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub loaded_papers: usize,
    pub generated_rows: usize,
    /// `None` when the merge step was not requested.
    pub merge: Option<MergeOutcome>,
    pub science_training: PathBuf,
    pub research_packs: Vec<PathBuf>,
    pub report: PathBuf,
}

impl BuildSummary {
    /// Machine-readable `key=value` lines for stdout.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("loaded_papers={}", self.loaded_papers),
            format!("generated_training_rows={}", self.generated_rows),
        ];
        if let Some(merge) = &self.merge {
            lines.push(format!("merged_added={}", merge.added));
            lines.push(format!("merged_updated={}", merge.updated));
            lines.push(format!("base_total={}", merge.total));
        }
        lines.push(format!("science_training={}", self.science_training.display()));
        for pack in &self.research_packs {
            lines.push(format!("pack={}", pack.display()));
        }
        lines.push(format!("report={}", self.report.display()));
        lines
    }
}

/// Run the whole build described by `config`.
pub fn run_build(config: &BuildConfig) -> Result<BuildSummary> {
    let mut papers = corpus::load_corpus(&config.inputs)?;
    papers.truncate(config.paper_cap(papers.len()));
    info!(papers = papers.len(), cap = config.max_papers, "Corpus ready");

    for pack in &config.research_packs {
        research_pack::write_pack(pack, &papers)?;
    }

    let rows = synth::synthesize_all(&papers);
    jsonl::write_records(&config.science_training, &rows)?;
    info!(
        rows = rows.len(),
        path = %config.science_training.display(),
        "Wrote science training rows"
    );

    let merge = if config.merge_into_base {
        Some(merge::merge_into_base(&config.base_training, &rows)?)
    } else {
        None
    };

    let report_counts = merge.unwrap_or(MergeOutcome {
        added: 0,
        updated: 0,
        total: rows.len(),
    });
    report::write_report(&ReportInput {
        papers: &papers,
        generated_rows: rows.len(),
        merge: report_counts,
        science_training: &config.science_training,
        packs: &config.research_packs,
        report: &config.report,
    })?;

    Ok(BuildSummary {
        loaded_papers: papers.len(),
        generated_rows: rows.len(),
        merge,
        science_training: config.science_training.clone(),
        research_packs: config.research_packs.clone(),
        report: config.report.clone(),
    })
}
