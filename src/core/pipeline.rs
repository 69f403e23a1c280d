use crate::core::consolidator::{consolidate, estimates_by_id, references_by_id};
use crate::core::valuator::Valuator;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    BatchEntry, BatchOutcome, Consolidation, ExtractedInput, HigherValue, ParcelRecord,
    ReferenceValue, ResolutionTier, TransformResult, ValuationKind, ValuationMethod,
};
use crate::utils::error::{Result, ValuationError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_FILENAME: &str = "valuation_output.zip";

/// Reads the price catalog and territory mapping through `storage` and
/// builds the engine. Any failure here aborts the run before a single
/// record is valued.
pub async fn load_valuator<S: Storage>(
    storage: &S,
    catalog_path: &str,
    territories_path: &str,
) -> Result<Valuator> {
    let catalog_bytes = storage.read_file(catalog_path).await.map_err(|e| {
        ValuationError::catalog(format!("cannot read price catalog '{}': {}", catalog_path, e))
    })?;
    let territory_bytes = storage.read_file(territories_path).await.map_err(|e| {
        ValuationError::catalog(format!(
            "cannot read territory mapping '{}': {}",
            territories_path, e
        ))
    })?;

    let valuator = Valuator::from_documents(
        catalog_path,
        &catalog_bytes,
        territories_path,
        &territory_bytes,
    )?;
    tracing::info!(
        "Loaded price catalog '{}' with {} rural territories",
        valuator.catalog().version(),
        valuator.catalog().rural_territories().count()
    );
    Ok(valuator)
}

// Either a bare array or the same `{ "records": [...] }` body the service accepts.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsDocument {
    List(Vec<ParcelRecord>),
    Wrapped { records: Vec<ParcelRecord> },
}

impl From<RecordsDocument> for Vec<ParcelRecord> {
    fn from(document: RecordsDocument) -> Self {
        match document {
            RecordsDocument::List(records) | RecordsDocument::Wrapped { records } => records,
        }
    }
}

#[derive(Debug, Serialize)]
struct ValuationRow<'a> {
    parcel_id: &'a str,
    status: &'static str,
    kind: Option<ValuationKind>,
    method: Option<ValuationMethod>,
    territory: Option<&'a str>,
    resolution_tier: Option<ResolutionTier>,
    total_area_ha: Option<f64>,
    estimate: Option<f64>,
    value_per_hectare: Option<f64>,
    price_source: Option<&'a str>,
    caveats: String,
    error: Option<&'a str>,
}

impl<'a> From<&'a BatchEntry> for ValuationRow<'a> {
    fn from(entry: &'a BatchEntry) -> Self {
        match entry {
            BatchEntry::Valued(result) => ValuationRow {
                parcel_id: &result.parcel_id,
                status: "valued",
                kind: Some(result.kind),
                method: Some(result.method),
                territory: Some(&result.territory),
                resolution_tier: Some(result.resolution_tier),
                total_area_ha: Some(result.total_area_ha),
                estimate: result.estimate,
                value_per_hectare: Some(result.value_per_hectare),
                price_source: Some(&result.price_source),
                caveats: result.caveats.join(" | "),
                error: None,
            },
            BatchEntry::Failed { parcel_id, error } => ValuationRow {
                parcel_id,
                status: "failed",
                kind: None,
                method: None,
                territory: None,
                resolution_tier: None,
                total_area_ha: None,
                estimate: None,
                value_per_hectare: None,
                price_source: None,
                caveats: String::new(),
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ComparisonRow<'a> {
    parcel_id: &'a str,
    estimate: Option<f64>,
    reference: Option<f64>,
    diff: Option<f64>,
    diff_pct: Option<f64>,
    higher: Option<HigherValue>,
}

fn valuations_csv(batch: &BatchOutcome) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in &batch.entries {
        writer.serialize(ValuationRow::from(entry))?;
    }
    writer
        .into_inner()
        .map_err(|e| ValuationError::ProcessingError {
            message: format!("failed to flush CSV output: {}", e),
        })
}

fn consolidated_csv(consolidation: &Consolidation) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in &consolidation.records {
        writer.serialize(ComparisonRow {
            parcel_id: &record.parcel_id,
            estimate: record.estimate,
            reference: record.reference,
            diff: record.deviation.as_ref().map(|d| d.diff),
            diff_pct: record.deviation.as_ref().map(|d| d.diff_pct),
            higher: record.deviation.as_ref().map(|d| d.higher),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| ValuationError::ProcessingError {
            message: format!("failed to flush CSV output: {}", e),
        })
}

/// Renders every output file for the configured formats as `(name, bytes)`.
pub fn render_outputs(result: &TransformResult, formats: &[String]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for format in formats {
        match format.as_str() {
            "json" => {
                files.push((
                    "valuations.json".to_string(),
                    serde_json::to_vec_pretty(&result.batch)?,
                ));
                files.push((
                    "consolidated.json".to_string(),
                    serde_json::to_vec_pretty(&result.consolidation)?,
                ));
            }
            "csv" => {
                files.push(("valuations.csv".to_string(), valuations_csv(&result.batch)?));
                files.push((
                    "consolidated.csv".to_string(),
                    consolidated_csv(&result.consolidation)?,
                ));
            }
            other => {
                return Err(ValuationError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported format. Valid formats: json, csv".to_string(),
                })
            }
        }
    }
    Ok(files)
}

fn bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

pub struct ValuationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    valuator: Arc<Valuator>,
}

impl<S: Storage, C: ConfigProvider> ValuationPipeline<S, C> {
    pub fn new(storage: S, config: C, valuator: Arc<Valuator>) -> Self {
        Self {
            storage,
            config,
            valuator,
        }
    }

    fn output_file(&self, name: &str) -> String {
        let base = self.config.output_path().trim_end_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ValuationPipeline<S, C> {
    async fn extract(&self) -> Result<ExtractedInput> {
        tracing::debug!("Reading parcel records from {}", self.config.records_path());
        let bytes = self.storage.read_file(self.config.records_path()).await?;
        let records: Vec<ParcelRecord> = serde_json::from_slice::<RecordsDocument>(&bytes)?.into();
        if records.is_empty() {
            tracing::warn!("No parcel records found in {}", self.config.records_path());
        }

        let references = match self.config.references_path() {
            Some(path) => {
                tracing::debug!("Reading reference values from {}", path);
                let bytes = self.storage.read_file(path).await?;
                serde_json::from_slice::<Vec<ReferenceValue>>(&bytes)?
            }
            None => Vec::new(),
        };

        Ok(ExtractedInput {
            records,
            references,
        })
    }

    async fn transform(&self, input: ExtractedInput) -> Result<TransformResult> {
        let batch = self.valuator.valuate_all(&input.records);
        let consolidation = consolidate(
            &input.records,
            &estimates_by_id(&batch.entries),
            &references_by_id(&input.references),
        );
        Ok(TransformResult {
            batch,
            consolidation,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let files = render_outputs(&result, self.config.output_formats())?;

        if self.config.compress_output() {
            tracing::debug!("Bundling {} files into {}", files.len(), BUNDLE_FILENAME);
            let zip_data = bundle(&files)?;
            let path = self.output_file(BUNDLE_FILENAME);
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&path, &zip_data).await?;
            return Ok(path);
        }

        for (name, data) in &files {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, data).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}
