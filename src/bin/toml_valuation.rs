use clap::Parser;
use parcel_valuation::config::toml_config::TomlConfig;
use parcel_valuation::core::ConfigProvider;
use parcel_valuation::utils::error::{ErrorSeverity, ValuationError};
use parcel_valuation::utils::{logger, validation::Validate};
use parcel_valuation::{load_valuator, LocalStorage, ValuationPipeline, ValuationRunner, Valuator};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "toml-valuation")]
#[command(about = "Parcel valuation driven by a TOML run configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "valuation.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Load and check the catalog and territory mapping without valuing anything
    #[arg(long)]
    dry_run: bool,
}

fn fail(e: &ValuationError) -> ! {
    tracing::error!(
        "Valuation run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("Error: {}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());

    let code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(code)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML");
            std::process::exit(3);
        }
    };

    logger::init_cli_logger_with_level(args.verbose, config.log_level());
    tracing::info!("Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        fail(&e);
    }
    tracing::info!("Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    let storage = LocalStorage::new(".");
    let valuator = match load_valuator(&storage, config.catalog_path(), config.territories_path()).await {
        Ok(valuator) => valuator,
        Err(e) => fail(&e),
    };

    if args.dry_run {
        tracing::info!("DRY RUN MODE - no records will be valued");
        display_engine_summary(&valuator);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let pipeline = ValuationPipeline::new(storage, config, Arc::new(valuator));
    let runner = ValuationRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(output_path) => {
            println!("Valuation run completed successfully");
            println!("Output saved to: {}", output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if !config.run.description.is_empty() {
        println!("  Description: {}", config.run.description);
    }
    println!("  Records: {}", config.records_path());
    println!(
        "  References: {}",
        config.references_path().unwrap_or("(none)")
    );
    println!("  Catalog: {}", config.catalog_path());
    println!("  Territories: {}", config.territories_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if config.compress_output() {
        println!("  Compression: ZIP");
    }
    if args.dry_run {
        println!("  DRY RUN MODE ENABLED");
    }
    println!();
}

fn display_engine_summary(valuator: &Valuator) {
    let catalog = valuator.catalog();
    println!("Engine Check:");
    println!("  Catalog version: {}", catalog.version());
    for source in catalog.provenance() {
        println!("  Source: {}", source);
    }
    println!(
        "  Rural territories: {}",
        catalog.rural_territories().collect::<Vec<_>>().join(", ")
    );
    println!(
        "  National default territory: {}",
        valuator.resolver().national_default()
    );
    println!("  Classifier rules: {}", valuator.classifier().rules().len());
    println!();
    println!("Dry run complete. Catalog and territory mapping are usable.");
}
