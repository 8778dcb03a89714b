pub mod allocate;
pub mod csv;
pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{Allocation, Document, Row, SplitGroup, SplitSpec};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
