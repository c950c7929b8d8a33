use crate::core::Pipeline;
use crate::domain::model::{DatasetSlot, ReconReport};
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a pipeline through extract, check and report.
pub struct ReconRunner<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReconRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ReconReport> {
        let started = Instant::now();
        tracing::info!("Starting reconciliation");

        tracing::info!("Loading inputs...");
        let inputs = self.pipeline.extract().await?;
        for slot in [&inputs.gtn, &inputs.payrun] {
            match slot {
                DatasetSlot::Loaded(dataset) => tracing::info!(
                    "{}: {} rows, {} columns",
                    dataset.name,
                    dataset.len(),
                    dataset.columns.len()
                ),
                DatasetSlot::Unavailable { name, .. } => {
                    tracing::warn!("{}: not loaded, dependent checks will error", name)
                }
            }
        }
        tracing::info!("Mapping: {} entries", inputs.mapping.len());

        tracing::info!("Running checks...");
        let report = self.pipeline.transform(inputs).await?;
        tracing::info!(
            "{} of {} checks passed",
            report.outcomes.len() - report.failed_checks().len(),
            report.outcomes.len()
        );

        tracing::info!("Writing report...");
        let report = self.pipeline.load(report).await?;
        tracing::info!("Reconciliation finished in {:?}", started.elapsed());

        Ok(report)
    }
}
