use crate::utils::error::{ValuationError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        match Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(DocumentFormat::Toml),
            Some("json") => Ok(DocumentFormat::Json),
            other => Err(ValuationError::InvalidConfigValueError {
                field: "document".to_string(),
                value: path.to_string(),
                reason: format!(
                    "Unsupported document extension: {}. Allowed extensions: toml, json",
                    other.unwrap_or("<none>")
                ),
            }),
        }
    }
}

/// Parses a configuration document, picking TOML or JSON from the file name.
pub fn parse_document<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T> {
    let content = std::str::from_utf8(bytes).map_err(|e| ValuationError::ConfigValidationError {
        field: path.to_string(),
        message: format!("document is not valid UTF-8: {}", e),
    })?;

    match DocumentFormat::from_path(path)? {
        DocumentFormat::Toml => toml::from_str(content).map_err(|e| {
            ValuationError::ConfigValidationError {
                field: path.to_string(),
                message: format!("TOML parsing error: {}", e),
            }
        }),
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| {
            ValuationError::ConfigValidationError {
                field: path.to_string(),
                message: format!("JSON parsing error: {}", e),
            }
        }),
    }
}
