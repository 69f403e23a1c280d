use crate::core::Storage;
use crate::utils::error::{Result, ValuationError};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, Validate, DOCUMENT_EXTENSIONS,
};
use aws_sdk_s3::Client as S3Client;
use std::env;

/// Where the Lambda handler finds its collaborator documents.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub s3_region: String,
    pub catalog_key: String,
    pub territories_key: String,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            s3_bucket: env::var("S3_BUCKET").map_err(|_| ValuationError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "eu-south-2".to_string()),
            catalog_key: env::var("CATALOG_KEY")
                .unwrap_or_else(|_| "config/catalog.toml".to_string()),
            territories_key: env::var("TERRITORIES_KEY")
                .unwrap_or_else(|_| "config/territories.toml".to_string()),
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;
        validate_aws_region("s3_region", &self.s3_region)?;
        validate_file_extensions(
            "catalog_key",
            &[&self.catalog_key, &self.territories_key],
            DOCUMENT_EXTENSIONS,
        )?;

        tracing::info!("Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let invalid = |reason: &str| ValuationError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid("S3 bucket name must be between 3 and 63 characters"));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid("S3 bucket name cannot start or end with a hyphen"));
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValuationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| ValuationError::ConfigError {
                message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| ValuationError::ConfigError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| ValuationError::ProcessingError {
                message: format!("Failed to write s3://{}/{}: {}", self.bucket, path, e),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bucket: &str, region: &str) -> LambdaConfig {
        LambdaConfig {
            s3_bucket: bucket.to_string(),
            s3_region: region.to_string(),
            catalog_key: "config/catalog.toml".to_string(),
            territories_key: "config/territories.json".to_string(),
        }
    }

    #[test]
    fn test_validate_lambda_config() {
        assert!(config("valuation-inputs", "eu-south-2").validate().is_ok());
        assert!(config("Bad_Bucket", "eu-south-2").validate().is_err());
        assert!(config("-bucket-", "eu-south-2").validate().is_err());
        assert!(config("valuation-inputs", "EU South").validate().is_err());
        assert!(config("valuation-inputs", "").validate().is_err());
    }
}
