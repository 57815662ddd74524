//! Paired driving/walking travel metrics for a candidate set.

use h3o::LatLng;
use log::debug;

use crate::candidates::RankedCandidate;
use crate::matrix::{MatrixError, MatrixProvider, ModeMetric, TravelMode, UnitSystem};
use crate::member::Member;

/// Travel metrics for one candidate against the incident target. Either mode
/// may be [`ModeMetric::Unavailable`]; the record is kept regardless.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMetric {
    pub member: Member,
    pub driving: ModeMetric,
    pub walking: ModeMetric,
}

/// Batched lookup of driving and walking metrics for `candidates` against
/// the single `target`.
///
/// The two mode calls are independent and run concurrently; both must
/// complete before any record is produced, since each record carries both
/// modes. A per-origin miss becomes `Unavailable` on that record; a failed
/// call fails the whole fetch with no partial metrics. No retries here.
pub fn fetch_metrics(
    provider: &dyn MatrixProvider,
    candidates: &[RankedCandidate],
    target: LatLng,
    units: UnitSystem,
) -> Result<Vec<TravelMetric>, MatrixError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let origins: Vec<LatLng> = candidates.iter().map(|candidate| candidate.coordinate).collect();

    let (driving, walking) = std::thread::scope(|scope| {
        let driving_handle =
            scope.spawn(|| provider.travel_times(&origins, target, TravelMode::Driving, units));
        let walking = provider.travel_times(&origins, target, TravelMode::Walking, units);
        let driving = driving_handle
            .join()
            .unwrap_or_else(|_| Err(MatrixError::Api("driving lookup panicked".to_string())));
        (driving, walking)
    });
    let driving = driving?;
    let walking = walking?;

    if driving.len() != candidates.len() {
        return Err(MatrixError::ShapeMismatch {
            expected: candidates.len(),
            got: driving.len(),
        });
    }
    if walking.len() != candidates.len() {
        return Err(MatrixError::ShapeMismatch {
            expected: candidates.len(),
            got: walking.len(),
        });
    }

    debug!("fetched travel metrics for {} candidates", candidates.len());

    Ok(candidates
        .iter()
        .zip(driving.into_iter().zip(walking))
        .map(|(candidate, (driving, walking))| TravelMetric {
            member: candidate.member.clone(),
            driving,
            walking,
        })
        .collect())
}
