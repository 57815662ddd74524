//! Straight-line candidate narrowing ahead of the travel-time lookup.

use std::cmp::Ordering;

use h3o::LatLng;

use crate::member::Member;
use crate::spatial::distance_meters;

/// A member provisionally considered for dispatch, with the resolved home
/// coordinate and the straight-line distance that put it in the window.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub member: Member,
    pub coordinate: LatLng,
    pub straight_line_meters: f64,
}

/// Narrow the population to the `limit` members closest to `target` by
/// great-circle distance, ascending. Members without a geocoded location are
/// excluded.
///
/// The matrix service is billed per origin/destination pair, so the full
/// population is never sent to it; the window (default 20, 4x the final cut)
/// leaves room for travel-time re-ordering relative to straight-line order.
/// This is an accepted approximation, not a guarantee that the true top
/// responders by travel time always land inside the window.
pub fn select_candidates(members: &[Member], target: LatLng, limit: usize) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = members
        .iter()
        .filter_map(|member| {
            let coordinate = member.location?;
            Some(RankedCandidate {
                member: member.clone(),
                coordinate,
                straight_line_meters: distance_meters(coordinate, target),
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.straight_line_meters
            .partial_cmp(&b.straight_line_meters)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(limit);
    candidates
}
