use crate::domain::model::{MatchMode, MirrorRecord, StatusEntry, TierOneIndex};
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct StatusFeed {
    urls: serde_json::Value,
}

/// Parses the `urls` array of the mirror status feed, keeping feed order.
pub fn parse_status_feed(feed: &str) -> Result<Vec<StatusEntry>> {
    let feed: StatusFeed = serde_json::from_str(feed).map_err(|e| EtlError::StatusFeedError {
        message: format!("invalid status JSON: {}", e),
    })?;

    let serde_json::Value::Array(urls) = feed.urls else {
        return Err(EtlError::StatusFeedError {
            message: "'urls' is not an array".to_string(),
        });
    };

    urls.into_iter()
        .enumerate()
        .map(|(index, value)| StatusEntry::from_value(index, value))
        .collect()
}

/// Joins the status feed against the tier 1 mirrors, bucketing matching
/// feed entries by their protocol.
///
/// An empty feed is what the fetcher hands over when the status endpoint
/// was unavailable; it produces an index with three empty buckets.
pub fn extract_tier1_servers(
    feed: &str,
    mirrors: &[MirrorRecord],
    mode: MatchMode,
) -> Result<TierOneIndex> {
    let mut index = TierOneIndex::default();

    if feed.trim().is_empty() {
        tracing::warn!("Status feed is empty, no tier 1 urls can be matched");
        return Ok(index);
    }

    let entries = parse_status_feed(feed)?;
    tracing::debug!(
        "Matching {} status entries against {} tier 1 mirrors ({:?} mode)",
        entries.len(),
        mirrors.len(),
        mode
    );

    let domains: Vec<String> = mirrors.iter().map(|m| m.domain.to_lowercase()).collect();

    for entry in entries {
        match mode {
            MatchMode::Substring => {
                let url = entry.url.to_lowercase();
                let hits = domains.iter().filter(|d| url.contains(d.as_str())).count();
                for _ in 0..hits {
                    index.push(entry.clone());
                }
            }
            MatchMode::Host => {
                let Some(host) = url_host(&entry.url) else {
                    tracing::debug!("Skipping status url without a host: {}", entry.url);
                    continue;
                };
                if domains.iter().any(|d| *d == host) {
                    index.push(entry);
                }
            }
        }
    }

    Ok(index)
}

fn url_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|host| host.to_lowercase())
}
