use crate::core::valuator::Valuator;
use crate::domain::model::{BatchEntry, BatchOutcome, BatchSummary, ParcelRecord};

impl Valuator {
    /// Values every record in order. A record that fails is kept in its slot
    /// as [`BatchEntry::Failed`] and the loop carries on.
    pub fn valuate_all(&self, records: &[ParcelRecord]) -> BatchOutcome {
        let mut entries = Vec::with_capacity(records.len());
        let mut total_estimate = 0.0;
        let mut failed_count = 0;

        for record in records {
            match self.valuate(record) {
                Ok(result) => {
                    total_estimate += result.estimate.unwrap_or(0.0);
                    entries.push(BatchEntry::Valued(result));
                }
                Err(e) => {
                    tracing::warn!("Skipping parcel '{}': {}", record.parcel_id, e);
                    failed_count += 1;
                    entries.push(BatchEntry::Failed {
                        parcel_id: record.parcel_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = BatchSummary {
            record_count: records.len(),
            valued_count: records.len() - failed_count,
            failed_count,
            total_estimate,
            catalog_version: self.catalog().version().to_string(),
            provenance: self.catalog().provenance().to_vec(),
        };

        tracing::info!(
            "Valued {} of {} parcels, total estimate {:.2}",
            summary.valued_count,
            summary.record_count,
            summary.total_estimate
        );

        BatchOutcome { entries, summary }
    }
}
