//! Corpus loading and deduplication.
//!
//! Sources are read in order; each line goes through the normalizer and the
//! survivors are collapsed on (lower-cased title, year). Later records replace
//! earlier ones wholesale.

use crate::error::{CorpusError, Result};
use crate::jsonl;
use crate::paper::{self, Paper, RawRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Deduplicating accumulator for [`Paper`] records.
#[derive(Debug, Default)]
pub struct Corpus {
    papers: HashMap<(String, i64), Paper>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a paper, replacing any earlier one with the same key.
    pub fn insert(&mut self, paper: Paper) {
        self.papers.insert(paper.key(), paper);
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Finish the corpus: descending year, then ascending title.
    pub fn into_sorted(self) -> Vec<Paper> {
        let mut papers: Vec<Paper> = self.papers.into_values().collect();
        papers.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.title.cmp(&b.title)));
        papers
    }
}

/// Load every input file into one deduplicated, sorted paper list.
///
/// A missing file or an unparseable line aborts the whole load.
pub fn load_corpus(paths: &[PathBuf]) -> Result<Vec<Paper>> {
    let mut corpus = Corpus::new();

    for path in paths {
        let (kept, dropped) = load_source(path, &mut corpus)?;
        info!(path = %path.display(), kept, "Loaded corpus source");
        if dropped > 0 {
            debug!(path = %path.display(), dropped, "Skipped invalid records");
        }
    }

    let papers = corpus.into_sorted();
    info!(sources = paths.len(), papers = papers.len(), "Corpus deduplicated");
    Ok(papers)
}

/// Normalize one source into `corpus`, returning (kept, dropped) counts.
fn load_source(path: &Path, corpus: &mut Corpus) -> Result<(usize, usize)> {
    if !path.exists() {
        return Err(CorpusError::MissingInput(path.to_path_buf()));
    }

    let records: Vec<RawRecord> = jsonl::read_records(path)?;
    let mut kept = 0;
    let mut dropped = 0;
    for raw in &records {
        match paper::normalize(raw) {
            Some(p) => {
                corpus.insert(p);
                kept += 1;
            }
            None => dropped += 1,
        }
    }
    Ok((kept, dropped))
}
