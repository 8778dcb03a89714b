pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{local::LocalStorage, plan::SplitPlan, CliConfig};
pub use core::{engine::SplitEngine, pipeline::FileSplitPipeline};
pub use domain::model::{Allocation, Document, Row, SplitGroup, SplitSpec};
pub use utils::error::{Result, SplitError};
