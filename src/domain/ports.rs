use crate::config::layout::LayoutConfig;
use crate::domain::model::{CheckKind, CheckOutcome, ReconInputs, ReconReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn run_name(&self) -> &str;
    fn gtn_path(&self) -> &str;
    fn payrun_path(&self) -> &str;
    fn mapping_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_formats(&self) -> &[String];
    fn enabled_checks(&self) -> Vec<CheckKind>;
    fn layout(&self) -> &LayoutConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ReconInputs>;
    async fn transform(&self, inputs: ReconInputs) -> Result<ReconReport>;
    async fn load(&self, report: ReconReport) -> Result<ReconReport>;
}

/// A check component. Pure over its inputs; one outcome per kind it owns.
pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;
    fn kinds(&self) -> &'static [CheckKind];
    fn run(&self, inputs: &ReconInputs) -> Vec<CheckOutcome>;
}
