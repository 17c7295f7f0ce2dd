//! Idempotent merge of synthesized rows into the persisted base dataset.
//!
//! The base dataset is keyed by normalized prompt (trimmed, lower-cased).
//! A merge is a full read-modify-write: load everything, update labels and
//! actions in place, append unseen prompts, then atomically rewrite the file.
//! There is no locking; callers must not run two merges on one file at once.

use crate::error::Result;
use crate::jsonl;
use crate::synth::TrainingRow;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persisted training row. Provenance fields never reach this shape.
///
/// `label` and `next_action` hold whatever JSON the file had: `None` means
/// the key was absent, `Some(Value::Null)` an explicit null. Fields other
/// than the three known ones are kept as-is. A row the merge does not touch
/// is written back with the same values it was read with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseDatasetRow {
    #[serde(default)]
    pub prompt: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_action: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BaseDatasetRow {
    pub fn label_str(&self) -> Option<&str> {
        self.label.as_ref().and_then(Value::as_str)
    }

    pub fn next_action_str(&self) -> Option<&str> {
        self.next_action.as_ref().and_then(Value::as_str)
    }
}

impl From<&TrainingRow> for BaseDatasetRow {
    fn from(row: &TrainingRow) -> Self {
        Self {
            prompt: row.prompt.clone(),
            label: Some(Value::from(row.label.as_str())),
            next_action: Some(Value::from(row.next_action.as_str())),
            extra: Map::new(),
        }
    }
}

// A present key, null included, is `Some`; only an absent key falls back to
// `None` through `default`.
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Counts reported by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub added: usize,
    pub updated: usize,
    pub total: usize,
}

/// Merge key: trimmed, lower-cased prompt.
pub fn merge_key(prompt: &str) -> String {
    prompt.trim().to_lowercase()
}

/// In-memory view of the base dataset file.
#[derive(Debug)]
pub struct BaseDataset {
    path: PathBuf,
    rows: Vec<BaseDatasetRow>,
    index: HashMap<String, usize>,
}

impl BaseDataset {
    /// Load the dataset at `path`; a missing file is an empty dataset.
    ///
    /// The file is our own output, so it is read without the corpus newline
    /// quirk.
    pub fn load(path: &Path) -> Result<Self> {
        let rows: Vec<BaseDatasetRow> = if path.exists() {
            jsonl::read_records_raw(path)?
        } else {
            debug!(path = %path.display(), "Base dataset not found, starting empty");
            Vec::new()
        };

        let mut index = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let key = merge_key(&row.prompt);
            if key.is_empty() {
                continue;
            }
            // pre-existing duplicates: first occurrence wins
            index.entry(key).or_insert(idx);
        }

        Ok(Self {
            path: path.to_path_buf(),
            rows,
            index,
        })
    }

    pub fn rows(&self) -> &[BaseDatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply `generated` rows, returning (added, updated).
    pub fn apply(&mut self, generated: &[TrainingRow]) -> (usize, usize) {
        let mut added = 0;
        let mut updated = 0;

        for row in generated {
            let key = merge_key(&row.prompt);
            let label = row.label.as_str();

            if let Some(&idx) = self.index.get(&key) {
                let existing = &mut self.rows[idx];
                // non-string or null values never match, so they get replaced
                let changed = existing.label_str() != Some(label)
                    || existing.next_action_str() != Some(row.next_action.as_str());
                if changed {
                    existing.label = Some(Value::from(label));
                    existing.next_action = Some(Value::from(row.next_action.as_str()));
                    updated += 1;
                }
                continue;
            }

            self.rows.push(BaseDatasetRow::from(row));
            self.index.insert(key, self.rows.len() - 1);
            added += 1;
        }

        (added, updated)
    }

    /// Rewrite the whole dataset file.
    pub fn save(&self) -> Result<()> {
        jsonl::write_records(&self.path, &self.rows)
    }
}

/// Load, merge and rewrite the base dataset at `path`.
///
/// If loading or writing fails the previous file is left untouched.
pub fn merge_into_base(path: &Path, generated: &[TrainingRow]) -> Result<MergeOutcome> {
    let mut dataset = BaseDataset::load(path)?;
    let before = dataset.len();
    let (added, updated) = dataset.apply(generated);
    dataset.save()?;

    let outcome = MergeOutcome {
        added,
        updated,
        total: dataset.len(),
    };
    info!(
        path = %path.display(),
        before,
        added = outcome.added,
        updated = outcome.updated,
        total = outcome.total,
        "Merged into base dataset"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Label;
    use std::fs;
    use tempfile::TempDir;

    fn row(prompt: &str, label: Label, action: &str) -> TrainingRow {
        TrainingRow {
            prompt: prompt.to_string(),
            label,
            next_action: action.to_string(),
            paper_id: "w1".to_string(),
            source_url: "https://doi.org/".to_string(),
        }
    }

    #[test]
    fn test_missing_base_creates_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");

        let outcome = merge_into_base(&path, &[row("P1", Label::TravelDesignRevenue, "a")])?;
        assert_eq!(outcome, MergeOutcome { added: 1, updated: 0, total: 1 });

        let content = fs::read_to_string(&path)?;
        assert_eq!(
            content,
            "{\"prompt\":\"P1\",\"label\":\"travel_design_revenue\",\"next_action\":\"a\"}\n"
        );
        Ok(())
    }

    #[test]
    fn test_second_merge_is_noop() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        let rows = vec![
            row("P1", Label::TravelDesignRevenue, "a"),
            row("P2", Label::TravelDesignRecovery, "b"),
        ];

        let first = merge_into_base(&path, &rows)?;
        assert_eq!((first.added, first.updated), (2, 0));

        let second = merge_into_base(&path, &rows)?;
        assert_eq!(second, MergeOutcome { added: 0, updated: 0, total: 2 });
        Ok(())
    }

    #[test]
    fn test_changed_label_updates_in_place() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(
            &path,
            "{\"prompt\":\"P\",\"label\":\"A\",\"next_action\":\"go\"}\n{\"prompt\":\"Q\",\"label\":\"A\",\"next_action\":\"go\"}\n",
        )?;

        let outcome = merge_into_base(&path, &[row("P", Label::TravelDesignStrategy, "go")])?;
        assert_eq!(outcome, MergeOutcome { added: 0, updated: 1, total: 2 });

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].label_str(), Some("travel_design_strategy"));
        assert_eq!(dataset.rows()[1].label_str(), Some("A"));
        Ok(())
    }

    #[test]
    fn test_changed_action_counts_once() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(&path, "{\"prompt\":\"P\",\"label\":\"A\",\"next_action\":\"old\"}\n")?;

        let outcome = merge_into_base(&path, &[row("P", Label::TravelDesignStrategy, "new")])?;
        assert_eq!(outcome.updated, 1);

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].next_action_str(), Some("new"));
        Ok(())
    }

    #[test]
    fn test_new_prompt_appends_one_row() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(&path, "{\"prompt\":\"P\",\"label\":\"A\",\"next_action\":\"go\"}\n")?;

        let outcome = merge_into_base(&path, &[row("Fresh", Label::TravelDesignExecution, "go")])?;
        assert_eq!(outcome, MergeOutcome { added: 1, updated: 0, total: 2 });

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[1].prompt, "Fresh");
        Ok(())
    }

    #[test]
    fn test_key_ignores_case_and_whitespace() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(
            &path,
            "{\"prompt\":\"  Hello World \",\"label\":\"travel_design_strategy\",\"next_action\":\"go\"}\n",
        )?;

        let outcome = merge_into_base(&path, &[row("hello world", Label::TravelDesignStrategy, "go")])?;
        assert_eq!(outcome, MergeOutcome { added: 0, updated: 0, total: 1 });
        Ok(())
    }

    #[test]
    fn test_duplicate_generated_prompts_collapse() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        let rows = vec![
            row("Same", Label::TravelDesignRevenue, "a"),
            row("same ", Label::TravelDesignRevenue, "a"),
        ];
        let outcome = merge_into_base(&path, &rows)?;
        assert_eq!(outcome, MergeOutcome { added: 1, updated: 0, total: 1 });
        Ok(())
    }

    #[test]
    fn test_batch_collision_with_different_label_counts_update() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        let rows = vec![
            row("Shared", Label::TravelDesignRevenue, "a"),
            row("Shared", Label::TravelDesignRecovery, "a"),
        ];

        let outcome = merge_into_base(&path, &rows)?;
        assert_eq!(outcome, MergeOutcome { added: 1, updated: 1, total: 1 });

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].label_str(), Some("travel_design_recovery"));
        Ok(())
    }

    #[test]
    fn test_existing_duplicates_first_wins_and_survive() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(
            &path,
            "{\"prompt\":\"P\",\"label\":\"A\",\"next_action\":\"go\"}\n{\"prompt\":\"p\",\"label\":\"B\",\"next_action\":\"go\"}\n",
        )?;

        let outcome = merge_into_base(&path, &[row("P", Label::TravelDesignRevenue, "go")])?;
        assert_eq!(outcome, MergeOutcome { added: 0, updated: 1, total: 2 });

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].label_str(), Some("travel_design_revenue"));
        assert_eq!(dataset.rows()[1].label_str(), Some("B"));
        Ok(())
    }

    #[test]
    fn test_unknown_fields_preserved() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(
            &path,
            "{\"prompt\":\"P\",\"label\":\"A\",\"next_action\":\"go\",\"reviewed\":true}\n",
        )?;

        merge_into_base(&path, &[row("Other", Label::TravelDesignRevenue, "go")])?;
        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].extra.get("reviewed"), Some(&Value::Bool(true)));
        Ok(())
    }

    #[test]
    fn test_prompt_with_newline_survives_remerge() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        let rows = vec![
            row("line one\nline two", Label::TravelDesignRevenue, "a\nb"),
            row("Plain", Label::TravelDesignRecovery, "c"),
        ];

        let first = merge_into_base(&path, &rows)?;
        assert_eq!(first, MergeOutcome { added: 2, updated: 0, total: 2 });

        let second = merge_into_base(&path, &rows)?;
        assert_eq!(second, MergeOutcome { added: 0, updated: 0, total: 2 });

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].prompt, "line one\nline two");
        assert_eq!(dataset.rows()[0].next_action_str(), Some("a\nb"));
        Ok(())
    }

    #[test]
    fn test_untouched_null_fields_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(
            &path,
            "{\"prompt\":\"P\",\"label\":null,\"next_action\":null}\n{\"prompt\":\"Q\",\"label\":\"A\"}\n",
        )?;

        merge_into_base(&path, &[row("Other", Label::TravelDesignRevenue, "go")])?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<Value> = content
            .lines()
            .map(serde_json::from_str::<Value>)
            .collect::<std::result::Result<_, _>>()?;
        assert_eq!(lines[0], serde_json::json!({"prompt": "P", "label": null, "next_action": null}));
        assert_eq!(lines[1], serde_json::json!({"prompt": "Q", "label": "A"}));
        assert_eq!(lines.len(), 3);
        Ok(())
    }

    #[test]
    fn test_non_string_label_is_replaced_on_match() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        fs::write(
            &path,
            "{\"prompt\":\"P\",\"label\":5,\"next_action\":\"go\"}\n{\"prompt\":\"Q\",\"label\":[1],\"next_action\":\"go\"}\n",
        )?;

        let outcome = merge_into_base(&path, &[row("P", Label::TravelDesignRevenue, "go")])?;
        assert_eq!(outcome, MergeOutcome { added: 0, updated: 1, total: 2 });

        let dataset = BaseDataset::load(&path)?;
        assert_eq!(dataset.rows()[0].label_str(), Some("travel_design_revenue"));
        assert_eq!(dataset.rows()[1].label, Some(serde_json::json!([1])));
        Ok(())
    }

    #[test]
    fn test_malformed_base_leaves_file_untouched() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base.jsonl");
        let original = "{\"prompt\":\"P\"}\n{nope\n";
        fs::write(&path, original)?;

        assert!(merge_into_base(&path, &[row("X", Label::TravelDesignRevenue, "go")]).is_err());
        assert_eq!(fs::read_to_string(&path)?, original);
        Ok(())
    }
}
