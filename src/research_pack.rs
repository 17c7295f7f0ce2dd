//! Swift research pack generation.
//!
//! The app targets load the corpus from a generated Swift source file that
//! embeds the papers as a raw-string JSON payload.

use crate::error::Result;
use crate::jsonl;
use crate::paper::Paper;
use std::path::Path;
use tracing::info;

/// Render the Swift source for `papers`.
pub fn render(papers: &[Paper]) -> Result<String> {
    let payload = serde_json::to_string_pretty(papers)?;
    Ok(format!(
        r####"import Foundation

enum AtlasResearchPack {{
    static func load() -> [AtlasResearchPaper] {{
        guard let data = atlasResearchPackJSON.data(using: .utf8) else {{
            return []
        }}
        return (try? JSONDecoder().decode([AtlasResearchPaper].self, from: data)) ?? []
    }}
}}

private let atlasResearchPackJSON = #"""
{payload}
"""#
"####
    ))
}

/// Write the rendered pack to `path`.
pub fn write_pack(path: &Path, papers: &[Paper]) -> Result<()> {
    let content = render(papers)?;
    jsonl::write_text(path, &content)?;
    info!(path = %path.display(), papers = papers.len(), "Wrote research pack");
    Ok(())
}
