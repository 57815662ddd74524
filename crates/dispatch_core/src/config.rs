//! Tunables for a dispatch session.

use h3o::LatLng;

use crate::matrix::UnitSystem;
use crate::spatial::default_center;

/// Candidates sent to the matrix service per search (4x the final cut).
pub const DEFAULT_CANDIDATE_LIMIT: usize = 20;
/// Responders surfaced to the operator.
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MAX_DRIVING_MINUTES: u32 = 15;
/// The budget slider runs 5..=60 in steps of 5.
pub const MIN_DRIVING_MINUTES: u32 = 5;
pub const MAX_DRIVING_MINUTES: u32 = 60;
pub const DRIVING_MINUTES_STEP: u32 = 5;

/// Snap a requested budget onto the slider scale: clamped to
/// [`MIN_DRIVING_MINUTES`, `MAX_DRIVING_MINUTES`], rounded to the nearest
/// [`DRIVING_MINUTES_STEP`].
pub fn clamp_driving_minutes(minutes: u32) -> u32 {
    let clamped = minutes.clamp(MIN_DRIVING_MINUTES, MAX_DRIVING_MINUTES);
    let snapped = (clamped + DRIVING_MINUTES_STEP / 2) / DRIVING_MINUTES_STEP
        * DRIVING_MINUTES_STEP;
    snapped.clamp(MIN_DRIVING_MINUTES, MAX_DRIVING_MINUTES)
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub candidate_limit: usize,
    pub top_k: usize,
    /// Initial budget; each search may override it within the slider range.
    pub max_driving_minutes: u32,
    pub units: UnitSystem,
    /// Where the view recenters on reset.
    pub default_center: LatLng,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            top_k: DEFAULT_TOP_K,
            max_driving_minutes: DEFAULT_MAX_DRIVING_MINUTES,
            units: UnitSystem::default(),
            default_center: default_center(),
        }
    }
}

impl DispatchConfig {
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_driving_minutes(mut self, minutes: u32) -> Self {
        self.max_driving_minutes = clamp_driving_minutes(minutes);
        self
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_default_center(mut self, center: LatLng) -> Self {
        self.default_center = center;
        self
    }
}
