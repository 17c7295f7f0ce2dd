//! OpenAlex acquisition adapter.
//!
//! Pages through the OpenAlex works search for each query and turns works
//! with abstracts into corpus records. Pages are fetched one at a time with a
//! fixed delay between requests to stay inside the API's rate limit.
//!
//! API Best Practices (per OpenAlex docs):
//! - Use `mailto:email` parameter for polite pool (10 req/s vs 1 req/s)
//! - Implement exponential backoff for retries

use crate::config::FetchConfig;
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::jsonl;
use crate::paper::Paper;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// OpenAlex API base URL
const OPENALEX_API_BASE: &str = "https://api.openalex.org";

/// Concepts considered per work when building keywords
const MAX_CONCEPTS: usize = 8;

/// Keywords kept per record
const MAX_KEYWORDS: usize = 12;

/// Queries used when neither the CLI nor the query file supplies any.
pub const DEFAULT_QUERIES: &[&str] = &[
    "goal setting performance",
    "implementation intentions behavior change",
    "habit formation self regulation",
    "sleep deprivation executive function",
    "stress decision making",
    "resilience trauma recovery",
    "financial behavior savings automation",
    "transport safety fatigue driving",
    "mobility wellbeing",
    "time management productivity",
];

/// Totals from a fetch run.
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    pub queries: usize,
    pub papers: usize,
    pub failed_pages: usize,
}

/// OpenAlex API response structures
#[derive(Debug, Deserialize)]
struct OpenAlexResponse {
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i64>,
    doi: Option<String>,
    #[serde(rename = "abstract_inverted_index")]
    abstract_index: Option<serde_json::Value>,
    concepts: Option<Vec<OpenAlexConcept>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexConcept {
    display_name: Option<String>,
}

/// Merge CLI queries with query-file entries, falling back to the defaults.
///
/// Blank entries are dropped and repeats removed case-insensitively, keeping
/// first-seen order.
pub fn resolve_queries(cli: &[String], query_file: Option<&Path>) -> Result<Vec<String>> {
    let mut queries: Vec<String> = cli.to_vec();
    if let Some(path) = query_file {
        queries.extend(read_query_file(path)?);
    }
    if queries.is_empty() {
        queries = DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect();
    }

    let mut seen = HashSet::new();
    Ok(queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .filter(|q| seen.insert(q.to_lowercase()))
        .collect())
}

/// Read a query file; a missing file contributes nothing.
fn read_query_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "Query file not found");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// Query keywords → domain tag, first match wins.
const DOMAIN_RULES: &[(&[&str], &str)] = &[
    (&["financial", "savings", "revenue", "wealth"], "wealth"),
    (&["transport", "mobility", "driving", "travel"], "travel"),
    (&["stress", "resilience", "trauma", "safety"], "resilience"),
    (&["sleep", "recovery", "wellbeing", "health"], "recovery"),
    (
        &["time management", "productivity", "habit", "goal", "implementation"],
        "execution",
    ),
];

/// Pick the domain tag a query's papers are filed under.
pub fn domain_from_query(query: &str) -> &'static str {
    let q = query.to_lowercase();
    DOMAIN_RULES
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| q.contains(k)))
        .map_or("planning", |(_, domain)| *domain)
}

/// Fetch every query and write the deduplicated corpus to `config.output`.
pub async fn fetch_corpus(config: &FetchConfig) -> Result<FetchSummary> {
    let queries = resolve_queries(&config.queries, config.query_file.as_deref())?;

    let user_agent = match &config.mailto {
        Some(mail) => format!("atlascorpus/1.0 (mailto:{mail})"),
        None => "atlascorpus/1.0".to_string(),
    };
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent)
        .build()?;

    info!(queries = queries.len(), pages = config.pages, "Starting OpenAlex fetch");

    let delay = Duration::from_millis(config.sleep_ms);
    let mut corpus = Corpus::new();
    let mut failed_pages = 0;
    let mut requested = false;

    'queries: for query in &queries {
        let domain = domain_from_query(query);

        for page in 1..=config.pages.max(1) {
            // fixed gap between consecutive requests, failed ones included
            if requested {
                tokio::time::sleep(delay).await;
            }
            requested = true;

            let url = build_search_url(query, page, config);
            debug!(url = %url, page, "Fetching OpenAlex page");

            let body = match fetch_page(&client, &url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(query = %query, page, error = %e, "Failed to fetch page");
                    failed_pages += 1;
                    continue;
                }
            };
            let works = match parse_response(&body) {
                Ok(works) => works,
                Err(e) => {
                    warn!(query = %query, page, error = %e, "Parse error");
                    failed_pages += 1;
                    continue;
                }
            };
            if works.is_empty() {
                break;
            }
            debug!(query = %query, page, results = works.len(), "Parsed OpenAlex results");

            for work in works {
                if let Some(paper) = work_to_paper(work, domain, config.from_year) {
                    corpus.insert(paper);
                    if corpus.len() >= config.max_papers {
                        break 'queries;
                    }
                }
            }
        }
    }

    let papers = corpus.into_sorted();
    jsonl::write_records(&config.output, &papers)?;

    info!(
        papers = papers.len(),
        failed_pages,
        output = %config.output.display(),
        "OpenAlex fetch complete"
    );
    Ok(FetchSummary {
        queries: queries.len(),
        papers: papers.len(),
        failed_pages,
    })
}

/// Build OpenAlex API search URL
fn build_search_url(query: &str, page: u32, config: &FetchConfig) -> String {
    let filter = format!(
        "has_abstract:true,type:article,from_publication_date:{}-01-01",
        config.from_year
    );
    let mut url = format!(
        "{}/works?search={}&filter={}&per-page={}&page={}",
        OPENALEX_API_BASE,
        urlencoding::encode(query),
        urlencoding::encode(&filter),
        config.per_page,
        page
    );
    if let Some(mail) = config.mailto.as_deref().filter(|m| !m.is_empty()) {
        url.push_str(&format!("&mailto={}", urlencoding::encode(mail)));
    }
    url
}

/// Fetch page content from OpenAlex API
async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let mut retries = 0;
    let max_retries = 3;

    loop {
        let response = client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return response.text().await.map_err(CorpusError::Network);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            if retries < max_retries {
                let backoff = Duration::from_secs(2u64.pow(retries));
                warn!(
                    retries = retries,
                    backoff_secs = backoff.as_secs(),
                    "Rate limited, backing off"
                );
                tokio::time::sleep(backoff).await;
                retries += 1;
                continue;
            }
            return Err(CorpusError::RateLimited(60));
        }

        return Err(CorpusError::Api {
            code: status.as_u16() as i32,
            message: format!("OpenAlex API error: {}", status),
        });
    }
}

fn parse_response(json_str: &str) -> Result<Vec<OpenAlexWork>> {
    let response: OpenAlexResponse = serde_json::from_str(json_str)
        .map_err(|e| CorpusError::Parse(format!("Failed to parse OpenAlex response: {}", e)))?;
    Ok(response.results)
}

/// Convert one work into a corpus record.
///
/// Works without an id, a title, a year at or after `from_year`, or abstract
/// text are dropped.
fn work_to_paper(work: OpenAlexWork, domain: &str, from_year: i64) -> Option<Paper> {
    let work_id = work.id.as_deref().map(str::trim).unwrap_or_default().to_string();
    let title = work.display_name.as_deref().map(str::trim).unwrap_or_default().to_string();
    let year = work.publication_year.unwrap_or(0);
    if work_id.is_empty() || title.is_empty() || year < from_year {
        return None;
    }

    let abstract_text = work
        .abstract_index
        .as_ref()
        .map(reconstruct_abstract)
        .unwrap_or_default();
    if abstract_text.is_empty() {
        return None;
    }

    let keywords: BTreeSet<String> = work
        .concepts
        .unwrap_or_default()
        .into_iter()
        .take(MAX_CONCEPTS)
        .filter_map(|c| c.display_name)
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    Some(Paper {
        id: work_id.rsplit('/').next().unwrap_or_default().to_lowercase(),
        source_url: best_source_url(work.doi.as_deref(), &work_id),
        actionable_insight: build_actionable_insight(&abstract_text, domain),
        action_hint: format!("Apply one {domain} action today and verify outcome with a checkpoint."),
        title,
        year,
        domain: domain.to_string(),
        keywords: keywords.into_iter().take(MAX_KEYWORDS).collect(),
    })
}

/// DOI as a resolvable URL, otherwise the OpenAlex work id.
fn best_source_url(doi: Option<&str>, work_id: &str) -> String {
    let doi = doi.map(str::trim).unwrap_or_default();
    if doi.starts_with("https://doi.org/") {
        doi.to_string()
    } else if !doi.is_empty() {
        format!("https://doi.org/{doi}")
    } else {
        work_id.to_string()
    }
}

/// First two sentences of the abstract, bounded in length.
fn build_actionable_insight(abstract_text: &str, domain: &str) -> String {
    let fallback = || {
        format!(
            "Research in {domain} indicates measurable behavior and performance effects under real constraints."
        )
    };

    let parts: Vec<&str> = abstract_text
        .split(". ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .take(2)
        .collect();
    let joined = parts.join(". ");
    let joined = joined.trim();

    let len = joined.chars().count();
    if len < 30 {
        fallback()
    } else if len > 320 {
        let head: String = joined.chars().take(317).collect();
        format!("{}...", head.trim_end())
    } else {
        joined.to_string()
    }
}

/// Reconstruct abstract text from inverted index
/// OpenAlex provides abstract as inverted index for legal reasons.
fn reconstruct_abstract(inverted_index: &serde_json::Value) -> String {
    if let Some(obj) = inverted_index.as_object() {
        let mut words: Vec<(i64, &str)> = Vec::new();

        for (word, positions) in obj {
            if let Some(pos_array) = positions.as_array() {
                for pos in pos_array {
                    if let Some(p) = pos.as_i64() {
                        words.push((p, word.as_str()));
                    }
                }
            }
        }

        words.sort_by_key(|(pos, _)| *pos);
        words.iter().map(|(_, w)| *w).collect::<Vec<_>>().join(" ")
    } else {
        String::new()
    }
}
