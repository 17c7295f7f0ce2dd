//! Build and fetch configuration.
//!
//! Every path the pipelines touch lives in these structs; nothing is read
//! from process-wide state, so tests can point a build at a temp directory.

use std::path::{Path, PathBuf};

/// Training data directory relative to the project root.
const TRAINING_DIR: &str = "atlas-concierge/kb/training";

/// Paths and switches for one corpus build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// JSONL corpus files, processed in order (later wins on collisions).
    pub inputs: Vec<PathBuf>,
    /// Science training rows, rewritten every run.
    pub science_training: PathBuf,
    /// Persisted base dataset the rows are merged into.
    pub base_training: PathBuf,
    /// Generated Swift research packs.
    pub research_packs: Vec<PathBuf>,
    /// Markdown build report.
    pub report: PathBuf,
    /// Cap on papers kept after dedup (at least one is always kept).
    pub max_papers: usize,
    /// Merge rows into `base_training` instead of only writing `science_training`.
    pub merge_into_base: bool,
}

impl BuildConfig {
    /// Conventional project layout under `root`.
    pub fn with_root(root: &Path) -> Self {
        let training = root.join(TRAINING_DIR);
        Self {
            inputs: vec![training.join("scientific_papers_seed.jsonl")],
            science_training: training.join("local_reasoner_training_science.jsonl"),
            base_training: training.join("local_reasoner_training.jsonl"),
            research_packs: vec![
                root.join("ios-app/AtlasMasaIOS/Sources/Core/AtlasResearchPack.swift"),
                root.join("macos-app/AtlasMasaMacOS/Sources/Core/AtlasResearchPack.swift"),
            ],
            report: root.join("docs/ai/swift-scientific-corpus-report.md"),
            max_papers: 5000,
            merge_into_base: false,
        }
    }

    /// Number of papers to keep from a corpus of `available`.
    pub fn paper_cap(&self, available: usize) -> usize {
        available.min(self.max_papers.max(1))
    }
}

/// Parameters for the OpenAlex acquisition run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Queries given directly (searched before query-file entries).
    pub queries: Vec<String>,
    /// Optional newline-delimited query file; `#` lines are comments.
    pub query_file: Option<PathBuf>,
    /// Pages fetched per query.
    pub pages: u32,
    /// Works per page.
    pub per_page: u32,
    /// Lower bound on publication year.
    pub from_year: i64,
    /// Stop once this many unique papers are held.
    pub max_papers: usize,
    /// Contact address for the polite pool.
    pub mailto: Option<String>,
    /// JSONL output path.
    pub output: PathBuf,
    /// Delay between page requests, in milliseconds.
    pub sleep_ms: u64,
}

impl FetchConfig {
    pub fn with_root(root: &Path) -> Self {
        let training = root.join(TRAINING_DIR);
        Self {
            queries: Vec::new(),
            query_file: Some(training.join("openalex_atlas_queries.txt")),
            pages: 5,
            per_page: 100,
            from_year: 1990,
            max_papers: 25_000,
            mailto: None,
            output: training.join("scientific_papers_openalex.jsonl"),
            sleep_ms: 200,
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let config = BuildConfig::with_root(Path::new("/proj"));
        assert_eq!(
            config.base_training,
            PathBuf::from("/proj/atlas-concierge/kb/training/local_reasoner_training.jsonl")
        );
        assert_eq!(config.research_packs.len(), 2);
        assert!(!config.merge_into_base);
    }

    #[test]
    fn test_paper_cap_keeps_at_least_one() {
        let mut config = BuildConfig::with_root(Path::new("."));
        config.max_papers = 0;
        assert_eq!(config.paper_cap(10), 1);
        config.max_papers = 3;
        assert_eq!(config.paper_cap(10), 3);
        assert_eq!(config.paper_cap(2), 2);
        assert_eq!(config.paper_cap(0), 0);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/x")), PathBuf::from("/abs/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/data")), home.join("data"));
        }
    }
}
