use crate::core::ConfigProvider;
use crate::utils::error::{Result, ValuationError};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{validate_run_paths, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    pub inputs: InputsConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub records: String,
    pub references: Option<String>,
    pub catalog: String,
    pub territories: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default)]
    pub compress: bool,
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string(), "csv".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn env_placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ValuationError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left
    /// in place so validation reports them as literal paths.
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn records_path(&self) -> &str {
        &self.inputs.records
    }

    fn references_path(&self) -> Option<&str> {
        self.inputs.references.as_deref()
    }

    fn catalog_path(&self) -> &str {
        &self.inputs.catalog
    }

    fn territories_path(&self) -> &str {
        &self.inputs.territories
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn compress_output(&self) -> bool {
        self.output.compress
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if self.run.name.trim().is_empty() {
            return Err(ValuationError::MissingConfigError {
                field: "run.name".to_string(),
            });
        }
        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level) {
                return Err(ValuationError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Supported levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }
        validate_run_paths(
            &self.inputs.records,
            self.inputs.references.as_deref(),
            &self.inputs.catalog,
            &self.inputs.territories,
            &self.output.path,
            &self.output.formats,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[run]
name = "safor-2025"
description = "La Safor portfolio"

[inputs]
records = "data/parcels.json"
references = "data/references.json"
catalog = "config/catalog.toml"
territories = "config/territories.toml"

[output]
path = "./output"
formats = ["json"]
compress = true

[monitoring]
enabled = true
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.run.name, "safor-2025");
        assert_eq!(config.records_path(), "data/parcels.json");
        assert_eq!(config.references_path(), Some("data/references.json"));
        assert_eq!(config.output_formats(), ["json".to_string()]);
        assert!(config.compress_output());
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
[run]
name = "minimal"

[inputs]
records = "parcels.json"
catalog = "catalog.json"
territories = "territories.json"

[output]
path = "out"
"#,
        )
        .unwrap();

        assert_eq!(config.output_formats(), ["json".to_string(), "csv".to_string()]);
        assert!(!config.compress_output());
        assert!(!config.monitoring_enabled());
        assert_eq!(config.references_path(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PARCEL_VALUATION_TEST_RECORDS", "/data/oliva.json");

        let content = BASIC.replace("data/parcels.json", "${PARCEL_VALUATION_TEST_RECORDS}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.records_path(), "/data/oliva.json");

        std::env::remove_var("PARCEL_VALUATION_TEST_RECORDS");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let content = BASIC.replace("./output", "${PARCEL_VALUATION_UNSET_VAR}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.output_path(), "${PARCEL_VALUATION_UNSET_VAR}");
    }

    #[test]
    fn test_config_validation() {
        let content = BASIC.replace("config/catalog.toml", "config/catalog.yaml");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());

        let content = BASIC.replace(r#"formats = ["json"]"#, r#"formats = ["tsv"]"#);
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        assert_eq!(config.log_level(), None);

        let content = BASIC.replace("enabled = true", "enabled = true\nlog_level = \"debug\"");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());

        let content = BASIC.replace("enabled = true", "enabled = true\nlog_level = \"loud\"");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValuationError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.run.name, "safor-2025");
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let err = TomlConfig::from_toml_str("[run]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, ValuationError::ConfigValidationError { .. }));
    }
}
