pub mod elements;
pub mod extract;
pub mod identity;
pub mod mapping;
pub mod numeric;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod structural;
pub mod suite;

pub use crate::domain::model::{Dataset, Record, ReconInputs, ReconReport};
pub use crate::domain::ports::{Check, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
