//! Joins computed estimates with official reference values per parcel and
//! measures how far apart they are.

use crate::domain::model::{
    BatchEntry, ComparisonRecord, Consolidation, Deviation, DeviationStats, HigherValue,
    ParcelRecord, PortfolioSummary, ReferenceValue,
};
use std::collections::HashMap;

/// Estimate per parcel id, for valued entries that produced one.
pub fn estimates_by_id(entries: &[BatchEntry]) -> HashMap<String, f64> {
    entries
        .iter()
        .filter_map(|entry| entry.estimate().map(|e| (entry.parcel_id().to_string(), e)))
        .collect()
}

/// Reference value per parcel id. A later duplicate replaces an earlier one.
pub fn references_by_id(references: &[ReferenceValue]) -> HashMap<String, f64> {
    references
        .iter()
        .map(|reference| (reference.parcel_id.clone(), reference.value))
        .collect()
}

fn is_comparable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn compare(estimate: f64, reference: f64) -> Deviation {
    let diff = estimate - reference;
    let higher = if estimate > reference {
        HigherValue::ComputedHigher
    } else if reference > estimate {
        HigherValue::ReferenceHigher
    } else {
        HigherValue::Equal
    };

    Deviation {
        diff,
        diff_pct: 100.0 * diff / reference,
        higher,
    }
}

pub fn consolidate(
    records: &[ParcelRecord],
    estimates_by_id: &HashMap<String, f64>,
    references_by_id: &HashMap<String, f64>,
) -> Consolidation {
    let mut comparisons = Vec::with_capacity(records.len());
    let mut with_estimate = 0;
    let mut with_reference = 0;
    let mut estimate_sum = 0.0;
    let mut reference_sum = 0.0;
    let mut deviations_pct = Vec::new();

    for record in records {
        let estimate = estimates_by_id.get(&record.parcel_id).copied();
        let reference = references_by_id.get(&record.parcel_id).copied();
        with_estimate += usize::from(estimate.is_some());
        with_reference += usize::from(reference.is_some());

        let deviation = match (estimate, reference) {
            (Some(e), Some(r)) if is_comparable(e) && is_comparable(r) => {
                let deviation = compare(e, r);
                estimate_sum += e;
                reference_sum += r;
                deviations_pct.push(deviation.diff_pct);
                Some(deviation)
            }
            _ => None,
        };

        comparisons.push(ComparisonRecord {
            parcel_id: record.parcel_id.clone(),
            estimate,
            reference,
            deviation,
        });
    }

    let deviation_stats = if deviations_pct.is_empty() {
        None
    } else {
        let count = deviations_pct.len() as f64;
        Some(DeviationStats {
            mean_pct: deviations_pct.iter().sum::<f64>() / count,
            min_pct: deviations_pct.iter().copied().fold(f64::INFINITY, f64::min),
            max_pct: deviations_pct.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    };

    let summary = PortfolioSummary {
        total_records: records.len(),
        with_estimate,
        with_reference,
        comparable: deviations_pct.len(),
        estimate_sum,
        reference_sum,
        total_difference: estimate_sum - reference_sum,
        deviation_stats,
    };

    tracing::info!(
        "Consolidated {} parcels: {} with estimate, {} with reference, {} comparable",
        summary.total_records,
        summary.with_estimate,
        summary.with_reference,
        summary.comparable
    );

    Consolidation {
        records: comparisons,
        summary,
    }
}
