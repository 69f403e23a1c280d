use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// Drives one extract → transform → load pass of a pipeline.
pub struct ValuationRunner<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> ValuationRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting valuation run");
        self.monitor.log_stats("Start");

        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} parcel records and {} reference values",
            input.records.len(),
            input.references.len()
        );
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(input).await?;
        tracing::info!(
            "Valued {} parcels ({} failed), {} comparable with a reference",
            result.batch.summary.valued_count,
            result.batch.summary.failed_count,
            result.consolidation.summary.comparable
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
