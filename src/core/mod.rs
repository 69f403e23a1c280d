pub mod batch;
pub mod catalog;
pub mod classifier;
pub mod consolidator;
pub mod pipeline;
pub mod runner;
pub mod service;
pub mod territory;
pub mod valuator;

pub use crate::domain::model::{ExtractedInput, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
