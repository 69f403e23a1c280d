pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_run_paths, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "parcel-valuation")]
#[command(about = "Estimate market values for batches of cadastral parcels")]
pub struct CliConfig {
    #[arg(long, help = "JSON document with the parcel records")]
    pub records: String,

    #[arg(long, help = "JSON document with official reference values")]
    pub references: Option<String>,

    #[arg(long, default_value = "config/catalog.toml")]
    pub catalog: String,

    #[arg(long, default_value = "config/territories.toml")]
    pub territories: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle all output files into a single ZIP archive")]
    pub compress: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage at each phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn records_path(&self) -> &str {
        &self.records
    }

    fn references_path(&self) -> Option<&str> {
        self.references.as_deref()
    }

    fn catalog_path(&self) -> &str {
        &self.catalog
    }

    fn territories_path(&self) -> &str {
        &self.territories
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn compress_output(&self) -> bool {
        self.compress
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_run_paths(
            &self.records,
            self.references.as_deref(),
            &self.catalog,
            &self.territories,
            &self.output_path,
            &self.formats,
        )
    }
}
