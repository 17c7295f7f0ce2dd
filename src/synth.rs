//! Training row synthesis.
//!
//! Every paper yields three templated prompts plus one per matching
//! [`BonusGroup`]. All rows from a paper share its label, action hint and
//! provenance.

use crate::paper::Paper;
use crate::taxonomy::{self, BonusGroup, Label};
use serde::{Deserialize, Serialize};

/// One synthesized prompt/label example with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub prompt: String,
    pub label: Label,
    pub next_action: String,
    pub paper_id: String,
    pub source_url: String,
}

/// Expand one paper into its training rows (always at least three).
pub fn synthesize(paper: &Paper) -> Vec<TrainingRow> {
    let label = taxonomy::classify(&paper.domain);

    let mut prompts = vec![
        format!(
            "Travel design brief: use evidence from '{}' to define one next field action for {}.",
            paper.title, paper.domain
        ),
        format!(
            "Research-backed travel design execution request: {}",
            paper.actionable_insight
        ),
        format!(
            "Translate this scientific finding into Atlas travel design workflow now: {}",
            paper.action_hint
        ),
    ];
    prompts.extend(
        BonusGroup::matching(&paper.domain)
            .into_iter()
            .map(|group| group.prompt().to_string()),
    );

    prompts
        .into_iter()
        .map(|prompt| TrainingRow {
            prompt,
            label,
            next_action: paper.action_hint.clone(),
            paper_id: paper.id.clone(),
            source_url: paper.source_url.clone(),
        })
        .collect()
}

/// Synthesize rows for a whole corpus, preserving paper order.
pub fn synthesize_all(papers: &[Paper]) -> Vec<TrainingRow> {
    papers.iter().flat_map(synthesize).collect()
}
