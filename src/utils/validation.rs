use crate::utils::error::{Result, ValuationError};
use std::collections::HashSet;

pub const OUTPUT_FORMATS: &[&str] = &["json", "csv"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["toml", "json"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ValuationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ValuationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(ValuationError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(ValuationError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(ValuationError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(ValuationError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValuationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Paths shared by every run configuration: inputs, collaborator documents
/// and output settings.
pub fn validate_run_paths(
    records_path: &str,
    references_path: Option<&str>,
    catalog_path: &str,
    territories_path: &str,
    output_path: &str,
    output_formats: &[String],
) -> Result<()> {
    validate_path("records", records_path)?;
    if let Some(references) = references_path {
        validate_path("references", references)?;
    }
    validate_path("catalog", catalog_path)?;
    validate_path("territories", territories_path)?;
    validate_file_extensions(
        "catalog",
        &[catalog_path, territories_path],
        DOCUMENT_EXTENSIONS,
    )?;
    validate_path("output_path", output_path)?;
    validate_output_formats("output_formats", output_formats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("records", "parcels.json").is_ok());
        assert!(validate_path("records", "").is_err());
        assert!(validate_path("records", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("catalog", &["catalog.toml", "map.json"], DOCUMENT_EXTENSIONS).is_ok());
        assert!(validate_file_extensions("catalog", &["catalog.yaml"], DOCUMENT_EXTENSIONS).is_err());
        assert!(validate_file_extensions("catalog", &["catalog"], DOCUMENT_EXTENSIONS).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        assert!(validate_output_formats("formats", &["json".to_string(), "csv".to_string()]).is_ok());
        assert!(validate_output_formats("formats", &["tsv".to_string()]).is_err());
        assert!(matches!(
            validate_output_formats("formats", &[]),
            Err(ValuationError::MissingConfigError { .. })
        ));
    }
}
