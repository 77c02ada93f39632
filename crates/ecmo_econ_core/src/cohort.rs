//! Cohort evaluation
//!
//! Every patient is costed and QALY'd independently. Each one draws from its
//! own `SmallRng` seeded from `(seed, index)`, so a cohort evaluates to the
//! same bits whether it runs sequentially or on the rayon pool.

use rand::SeedableRng;
use rand::rngs::SmallRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ParameterSet;
use crate::cost::cost;
use crate::error::{AnalysisError, RecordError};
use crate::model::{CohortResult, PatientEconomicRecord, PatientResult};
use crate::qaly::qaly;

/// Seed for the `index`-th independent stream derived from `seed`.
///
/// A SplitMix64 finalizer over the pair, so neighbouring indices and
/// neighbouring seeds land far apart.
pub fn stream_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// RNG for one patient or one Monte Carlo iteration
pub fn stream_rng(seed: u64, index: usize) -> SmallRng {
    SmallRng::seed_from_u64(stream_seed(seed, index as u64))
}

/// Cost and QALY one patient using the stream for position `index`.
pub fn evaluate_patient(
    record: &PatientEconomicRecord,
    params: &ParameterSet,
    seed: u64,
    index: usize,
) -> Result<PatientResult, RecordError> {
    let mut rng = stream_rng(seed, index);
    let cost = cost(record, params, &mut rng)?;
    let qaly = qaly(record, params, params.reference_life_expectancy())?;
    Ok(PatientResult {
        survived: record.survived,
        cost,
        qaly,
    })
}

/// Evaluate a whole cohort, aborting on the lowest-index invalid record.
pub fn evaluate_cohort(
    records: &[PatientEconomicRecord],
    params: &ParameterSet,
    seed: u64,
) -> Result<CohortResult, AnalysisError> {
    #[cfg(feature = "parallel")]
    let results: Vec<Result<PatientResult, RecordError>> = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| evaluate_patient(record, params, seed, index))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<PatientResult, RecordError>> = records
        .iter()
        .enumerate()
        .map(|(index, record)| evaluate_patient(record, params, seed, index))
        .collect();

    let patients = results
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.map_err(|e| AnalysisError::record(index, e)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(patients = patients.len(), seed, "cohort evaluated");
    Ok(CohortResult::new(patients))
}

/// Records split into those every engine accepts and those it rejects
#[derive(Debug, Clone, Default)]
pub struct PartitionedRecords {
    pub valid: Vec<PatientEconomicRecord>,
    /// Original index and reason for each rejected record
    pub rejected: Vec<(usize, RecordError)>,
}

/// Separate invalid records so a caller can choose to skip them.
///
/// A record is valid when its numeric fields pass [`PatientEconomicRecord::validate`]
/// and, for survivors, its outcome has a utility in `params`.
pub fn partition_valid(
    records: &[PatientEconomicRecord],
    params: &ParameterSet,
) -> PartitionedRecords {
    let mut partitioned = PartitionedRecords::default();
    for (index, record) in records.iter().enumerate() {
        match check_record(record, params) {
            Ok(()) => partitioned.valid.push(record.clone()),
            Err(e) => partitioned.rejected.push((index, e)),
        }
    }
    partitioned
}

fn check_record(record: &PatientEconomicRecord, params: &ParameterSet) -> Result<(), RecordError> {
    record.validate()?;
    if record.survived {
        let outcome = record.outcome.ok_or(RecordError::MissingOutcome)?;
        params
            .utility(outcome)
            .ok_or(RecordError::UnknownOutcome(outcome))?;
    }
    Ok(())
}
