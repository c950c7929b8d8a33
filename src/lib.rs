pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, layout::LayoutConfig, toml_config::TomlConfig};
pub use core::{
    mapping::{MappingElementEntry, MappingTable},
    pipeline::FilePipeline,
    runner::ReconRunner,
    suite::CheckSuite,
};
pub use domain::model::{CheckKind, CheckOutcome, Discrepancy, ReconReport};
pub use utils::error::{ReconError, Result};
