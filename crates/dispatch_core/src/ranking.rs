//! Budget filter and final ordering of travel metrics.

use crate::metrics::TravelMetric;

/// Keep metrics whose driving duration fits the budget, sort ascending by
/// driving seconds, and truncate to `top_k`.
///
/// A driving [`Unavailable`](crate::matrix::ModeMetric::Unavailable) has no
/// computable duration and is always dropped by the budget filter — it is
/// never ranked as "fast". The sort is stable, so equal durations keep their
/// candidate order.
pub fn rank_and_bound(
    metrics: Vec<TravelMetric>,
    max_driving_minutes: u32,
    top_k: usize,
) -> Vec<TravelMetric> {
    let budget_secs = u64::from(max_driving_minutes) * 60;
    let mut ranked: Vec<(u64, TravelMetric)> = metrics
        .into_iter()
        .filter_map(|metric| match metric.driving.duration_secs() {
            Some(secs) if secs <= budget_secs => Some((secs, metric)),
            _ => None,
        })
        .collect();

    ranked.sort_by_key(|(secs, _)| *secs);
    ranked.truncate(top_k);
    ranked.into_iter().map(|(_, metric)| metric).collect()
}
