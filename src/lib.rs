//! # atlascorpus
//!
//! Scientific Paper Corpus Builder - normalize, classify, synthesize, merge
//!
//! ## Modules
//!
//! - [`paper`] - Canonical paper record and record normalizer
//! - [`corpus`] - Multi-source loading and (title, year) deduplication
//! - [`taxonomy`] - Domain tags, taxonomy labels and the classifier
//! - [`synth`] - Training row synthesis
//! - [`merge`] - Idempotent merge into the persisted base dataset
//! - [`pipeline`] - End-to-end build with summary
//! - [`openalex`] - OpenAlex acquisition adapter
//! - [`research_pack`] / [`report`] - Generated artifacts
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atlascorpus::{config::BuildConfig, pipeline};
//! use std::path::Path;
//!
//! fn main() -> atlascorpus::Result<()> {
//!     let mut config = BuildConfig::with_root(Path::new("."));
//!     config.merge_into_base = true;
//!     let summary = pipeline::run_build(&config)?;
//!     for line in summary.summary_lines() {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod error;
mod hash;
pub mod jsonl;
pub mod merge;
pub mod openalex;
pub mod paper;
pub mod pipeline;
pub mod report;
pub mod research_pack;
pub mod synth;
pub mod taxonomy;

pub use error::{CorpusError, Result};
