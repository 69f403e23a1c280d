pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use core::{
    pipeline::{load_valuator, ValuationPipeline},
    runner::ValuationRunner,
    valuator::Valuator,
};
pub use utils::error::{Result, ValuationError};
