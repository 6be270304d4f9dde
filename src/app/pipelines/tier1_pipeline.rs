use crate::core::correlator::extract_tier1_servers;
use crate::core::fetcher::MirrorsClient;
use crate::core::parser::parse_tier1_list;
use crate::core::{ConfigProvider, Extracted, Pipeline, Storage, TierOneIndex};
use crate::utils::error::Result;

/// File name used when the index is written without an explicit path.
pub const DEFAULT_OUTPUT_FILE: &str = "tier1.json";

pub struct Tier1Pipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: MirrorsClient,
}

impl<S: Storage, C: ConfigProvider> Tier1Pipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = MirrorsClient::new(&config)?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for Tier1Pipeline<S, C> {
    async fn extract(&self) -> Result<Extracted> {
        tracing::debug!("Fetching tier 1 page from: {}", self.client.tier1_url());
        let html = self.client.fetch_tier1_html().await;
        let mirrors = parse_tier1_list(&html)?;
        for mirror in &mirrors {
            tracing::debug!(
                "Tier 1 mirror {} ({}, protocols: {:?})",
                mirror.domain,
                mirror.country,
                mirror.protocols
            );
        }

        tracing::debug!("Fetching mirror status from: {}", self.client.status_url());
        let status_feed = self.client.fetch_status_json().await;

        Ok(Extracted {
            mirrors,
            status_feed,
        })
    }

    async fn transform(&self, data: Extracted) -> Result<TierOneIndex> {
        extract_tier1_servers(&data.status_feed, &data.mirrors, self.config.match_mode())
    }

    async fn load(&self, index: TierOneIndex) -> Result<String> {
        let json = if self.config.pretty() {
            serde_json::to_string_pretty(&index)?
        } else {
            serde_json::to_string(&index)?
        };

        let path = self.config.output_path().unwrap_or(DEFAULT_OUTPUT_FILE);
        tracing::debug!("Writing index ({} bytes) to storage", json.len());
        self.storage.write_file(path, json.as_bytes()).await?;

        Ok(self.storage.describe(path))
    }
}
