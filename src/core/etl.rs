use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of one run, reported by the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records_extracted: usize,
    pub rows_written: usize,
    pub output_path: String,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting report build");

        tracing::info!("Extracting records...");
        let raw_data = self.pipeline.extract().await?;
        let records_extracted = raw_data.len();
        tracing::info!("Extracted {} records", records_extracted);
        self.monitor.log_stats("Extract");

        tracing::info!("Filtering and shaping rows...");
        let transformed = self.pipeline.transform(raw_data).await?;
        let rows_written = transformed.rows.len();
        tracing::info!(
            "Kept {} rows ({} filtered out)",
            rows_written,
            transformed.records_dropped
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing workbook...");
        let output_path = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            records_extracted,
            rows_written,
            output_path,
        })
    }
}
