//! Dispatch session state machine.
//!
//! Owns the lifecycle of one closest-responder search: resolve the incident
//! coordinate, narrow candidates, fetch travel metrics on a worker thread,
//! rank within the driving-time budget, and publish the outcome. The session
//! holds a single explicit state value; worker completions arrive over an
//! mpsc channel and are applied by [`DispatchSession::drain`] on the owning
//! thread. A generation token marks every search attempt, and events from a
//! superseded generation are discarded on arrival, so a stale fetch can
//! never overwrite a newer search's state.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use h3o::LatLng;
use log::{debug, warn};
use thiserror::Error;

use crate::candidates::select_candidates;
use crate::config::{clamp_driving_minutes, DispatchConfig};
use crate::geocode::{GeocodeError, Geocoder};
use crate::matrix::MatrixProvider;
use crate::member::Member;
use crate::metrics::{fetch_metrics, TravelMetric};
use crate::ranking::rank_and_bound;

/// Failures surfaced to the operator when a dispatch attempt dies.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    /// Geocoding had no result for the submitted address. User-correctable.
    #[error("no location found for \"{0}\"")]
    AddressNotFound(String),
    /// A collaborator call failed at the transport or quota level.
    #[error("dispatch search failed: {0}")]
    ServiceUnavailable(String),
}

/// The incident location one search is working against. Ephemeral: replaced
/// on every new search, cleared on manual edit or reset.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentTarget {
    pub coordinate: LatLng,
    pub raw_address: String,
}

/// Final output of one successful pipeline run: the ranked responders and
/// the target they were computed against.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub target: IncidentTarget,
    pub responders: Vec<TravelMetric>,
}

/// Terminal outcome of a search attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SettledOutcome {
    Success(DispatchResult),
    /// No candidate within the driving budget. Distinct from failure.
    Empty(IncidentTarget),
    Error(DispatchError),
}

/// Where the session currently is in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Resolving,
    Fetching,
    Ranking,
    Settled(SettledOutcome),
}

enum WorkerEvent {
    Resolved {
        generation: u64,
        target: IncidentTarget,
    },
    MetricsFetched {
        generation: u64,
    },
    Outcome {
        generation: u64,
        outcome: SettledOutcome,
    },
}

impl WorkerEvent {
    fn generation(&self) -> u64 {
        match self {
            WorkerEvent::Resolved { generation, .. }
            | WorkerEvent::MetricsFetched { generation }
            | WorkerEvent::Outcome { generation, .. } => *generation,
        }
    }
}

pub struct DispatchSession {
    config: DispatchConfig,
    geocoder: Arc<dyn Geocoder>,
    matrix: Arc<dyn MatrixProvider>,
    phase: SessionPhase,
    target: Option<IncidentTarget>,
    generation: u64,
    sender: Sender<WorkerEvent>,
    receiver: Receiver<WorkerEvent>,
}

impl DispatchSession {
    pub fn new(
        config: DispatchConfig,
        geocoder: Arc<dyn Geocoder>,
        matrix: Arc<dyn MatrixProvider>,
    ) -> Self {
        let (sender, receiver) = channel();
        Self {
            config,
            geocoder,
            matrix,
            phase: SessionPhase::Idle,
            target: None,
            generation: 0,
            sender,
            receiver,
        }
    }

    /// Start a search from a free-text address. The population and budget
    /// are captured here, at call time; mid-flight roster or slider changes
    /// do not affect a running search.
    pub fn submit_address(
        &mut self,
        address: &str,
        population: Vec<Member>,
        max_driving_minutes: u32,
    ) {
        let generation = self.begin_attempt(SessionPhase::Resolving);
        debug!("dispatch search {generation}: resolving {address:?}");

        let geocoder = Arc::clone(&self.geocoder);
        let matrix = Arc::clone(&self.matrix);
        let config = self.config.clone();
        let sender = self.sender.clone();
        let address = address.to_string();
        let budget = clamp_driving_minutes(max_driving_minutes);

        thread::spawn(move || {
            let resolved = match geocoder.geocode(&address) {
                Ok(resolved) => resolved,
                Err(GeocodeError::NotFound) => {
                    let _ = sender.send(WorkerEvent::Outcome {
                        generation,
                        outcome: SettledOutcome::Error(DispatchError::AddressNotFound(address)),
                    });
                    return;
                }
                Err(err) => {
                    let _ = sender.send(WorkerEvent::Outcome {
                        generation,
                        outcome: SettledOutcome::Error(DispatchError::ServiceUnavailable(
                            err.to_string(),
                        )),
                    });
                    return;
                }
            };
            let target = IncidentTarget {
                coordinate: resolved.coordinate,
                raw_address: address,
            };
            let _ = sender.send(WorkerEvent::Resolved {
                generation,
                target: target.clone(),
            });
            run_pipeline(
                &sender,
                generation,
                &config,
                matrix.as_ref(),
                target,
                &population,
                budget,
            );
        });
    }

    /// Start a search from an autocomplete pick that already carries a
    /// coordinate. Skips geocoding and goes straight to the metrics fetch.
    pub fn select_suggestion(
        &mut self,
        coordinate: LatLng,
        label: &str,
        population: Vec<Member>,
        max_driving_minutes: u32,
    ) {
        let generation = self.begin_attempt(SessionPhase::Fetching);
        let target = IncidentTarget {
            coordinate,
            raw_address: label.to_string(),
        };
        debug!("dispatch search {generation}: suggestion {label:?}");
        self.target = Some(target.clone());

        let matrix = Arc::clone(&self.matrix);
        let config = self.config.clone();
        let sender = self.sender.clone();
        let budget = clamp_driving_minutes(max_driving_minutes);

        thread::spawn(move || {
            run_pipeline(
                &sender,
                generation,
                &config,
                matrix.as_ref(),
                target,
                &population,
                budget,
            );
        });
    }

    /// A manual edit of the incident text invalidates the target and result
    /// immediately, before any new search runs. Stale pins must never show
    /// against an edited, unconfirmed address.
    pub fn edit_address(&mut self) {
        self.invalidate();
    }

    /// Explicit reset back to the blank session; the view recenters on
    /// [`DispatchConfig::default_center`].
    pub fn reset(&mut self) {
        self.invalidate();
    }

    /// Apply completed work from the fetch worker. Events tagged with a
    /// superseded generation are discarded here, never surfaced.
    pub fn drain(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            self.apply(event);
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// The active incident target, if the current search has one.
    pub fn target(&self) -> Option<&IncidentTarget> {
        self.target.as_ref()
    }

    /// The settled result of the latest search, if it succeeded.
    pub fn result(&self) -> Option<&DispatchResult> {
        match &self.phase {
            SessionPhase::Settled(SettledOutcome::Success(result)) => Some(result),
            _ => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Resolving | SessionPhase::Fetching | SessionPhase::Ranking
        )
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    fn begin_attempt(&mut self, phase: SessionPhase) -> u64 {
        self.generation += 1;
        self.phase = phase;
        self.target = None;
        self.generation
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.phase = SessionPhase::Idle;
        self.target = None;
    }

    fn apply(&mut self, event: WorkerEvent) {
        if event.generation() != self.generation {
            debug!(
                "discarding event from superseded search {}",
                event.generation()
            );
            return;
        }
        match event {
            WorkerEvent::Resolved { target, .. } => {
                self.target = Some(target);
                self.phase = SessionPhase::Fetching;
            }
            WorkerEvent::MetricsFetched { .. } => {
                self.phase = SessionPhase::Ranking;
            }
            WorkerEvent::Outcome { outcome, .. } => {
                match &outcome {
                    SettledOutcome::Success(result) => {
                        self.target = Some(result.target.clone());
                    }
                    SettledOutcome::Empty(target) => {
                        self.target = Some(target.clone());
                    }
                    SettledOutcome::Error(err) => {
                        warn!("dispatch search failed: {err}");
                        self.target = None;
                    }
                }
                self.phase = SessionPhase::Settled(outcome);
            }
        }
    }
}

fn run_pipeline(
    sender: &Sender<WorkerEvent>,
    generation: u64,
    config: &DispatchConfig,
    matrix: &dyn MatrixProvider,
    target: IncidentTarget,
    population: &[Member],
    max_driving_minutes: u32,
) {
    let candidates = select_candidates(population, target.coordinate, config.candidate_limit);
    match fetch_metrics(matrix, &candidates, target.coordinate, config.units) {
        Ok(metrics) => {
            let _ = sender.send(WorkerEvent::MetricsFetched { generation });
            let responders = rank_and_bound(metrics, max_driving_minutes, config.top_k);
            let outcome = if responders.is_empty() {
                SettledOutcome::Empty(target)
            } else {
                SettledOutcome::Success(DispatchResult { target, responders })
            };
            let _ = sender.send(WorkerEvent::Outcome {
                generation,
                outcome,
            });
        }
        Err(err) => {
            let _ = sender.send(WorkerEvent::Outcome {
                generation,
                outcome: SettledOutcome::Error(DispatchError::ServiceUnavailable(err.to_string())),
            });
        }
    }
}
