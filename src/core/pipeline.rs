use crate::adapters::spreadsheet::parse_dataset;
use crate::core::mapping::MappingTable;
use crate::core::report::render_files;
use crate::core::suite::CheckSuite;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{DatasetSlot, ReconInputs, ReconReport};
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Reads the three inputs through a `Storage`, runs the check suite and
/// writes the requested report files back through the same storage.
pub struct FilePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> FilePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// A dataset that cannot be read or parsed only disables the checks that need it.
    async fn load_dataset(&self, name: &str, path: &str) -> DatasetSlot {
        let loaded = match self.storage.read_file(path).await {
            Ok(bytes) => parse_dataset(name, path, bytes, self.config.layout().sheet.as_deref()),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(dataset) => DatasetSlot::Loaded(dataset),
            Err(e) => {
                tracing::warn!("{} dataset unavailable ({}): {}", name, path, e);
                DatasetSlot::Unavailable {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(path)
        .to_string()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FilePipeline<S, C> {
    async fn extract(&self) -> Result<ReconInputs> {
        tracing::debug!("Reading mapping from {}", self.config.mapping_path());
        let mapping_bytes = self.storage.read_file(self.config.mapping_path()).await?;
        let mapping = MappingTable::from_json_slice(&mapping_bytes)?;

        let gtn = self.load_dataset("GTN", self.config.gtn_path()).await;
        let payrun = self.load_dataset("Payrun", self.config.payrun_path()).await;

        Ok(ReconInputs {
            gtn_file: file_name(self.config.gtn_path()),
            payrun_file: file_name(self.config.payrun_path()),
            gtn,
            payrun,
            mapping,
        })
    }

    async fn transform(&self, inputs: ReconInputs) -> Result<ReconReport> {
        let suite = CheckSuite::standard(self.config.layout()).with_enabled(self.config.enabled_checks());
        let outcomes = suite.run(Arc::new(inputs)).await;
        Ok(ReconReport::new(self.config.run_name(), outcomes))
    }

    async fn load(&self, report: ReconReport) -> Result<ReconReport> {
        for (name, contents) in render_files(&report, self.config.report_formats())? {
            let path = Path::new(self.config.output_path()).join(name);
            let path = path.to_string_lossy();
            tracing::debug!("Writing {} ({} bytes)", path, contents.len());
            self.storage.write_file(&path, contents.as_bytes()).await?;
        }
        Ok(report)
    }
}
