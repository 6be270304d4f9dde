use crate::core::Pipeline;
use crate::domain::model::Protocol;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order and returns where the
    /// index was written.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting tier 1 mirror collection");

        // Extract
        let extracted = self.pipeline.extract().await?;
        tracing::info!("Found {} file-sync tier 1 mirrors", extracted.mirrors.len());

        // Transform
        let index = self.pipeline.transform(extracted).await?;
        for protocol in Protocol::ALL {
            tracing::info!("{}: {} tier 1 urls", protocol, index.bucket(protocol).len());
        }

        // Load
        let output_path = self.pipeline.load(index).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
