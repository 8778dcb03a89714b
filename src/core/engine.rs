use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct SplitEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SplitEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<Vec<String>> {
        // Extract
        tracing::info!("📥 Extracting input data...");
        let document = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} rows with {} columns",
            document.rows.len(),
            document.headers.len()
        );

        // Partition
        tracing::info!("🔀 Partitioning rows into split groups...");
        let allocation = self.pipeline.partition(document).await?;
        tracing::info!(
            "🔀 Created {} groups covering {} rows",
            allocation.groups.len(),
            allocation.total_rows()
        );

        // Deliver
        tracing::info!("💾 Writing output files...");
        let written = self.pipeline.deliver(allocation).await?;
        tracing::info!("💾 Wrote {} files", written.len());

        Ok(written)
    }
}
