use crate::domain::model::{Extracted, MatchMode, TierOneIndex};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human readable location of `path` for log and CLI output.
    fn describe(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn tier1_path(&self) -> &str;
    fn status_path(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn match_mode(&self) -> MatchMode;
    fn output_path(&self) -> Option<&str>;
    fn pretty(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extracted>;
    async fn transform(&self, data: Extracted) -> Result<TierOneIndex>;
    async fn load(&self, index: TierOneIndex) -> Result<String>;
}
