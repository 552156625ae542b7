use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{LaneId, WashKind},
    error::StageFailure,
};

/// Outcome of one full traversal of a lane's stage sequence. Immutable once
/// created; `failure` is populated when the run aborted partway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashReport {
    pub run_id: Uuid,
    pub lane_id: LaneId,
    pub kind: WashKind,
    pub elapsed: Duration,
    pub succeeded: bool,
    pub failure: Option<StageFailure>,
}

/// Aggregate outcome of washing several lanes together. A lane's failure
/// never cancels its siblings, so `reports` always covers every lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub success_count: usize,
    pub elapsed: Duration,
    pub reports: Vec<WashReport>,
}

/// One starter in a first-wins race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceEntry {
    pub lane_id: LaneId,
    pub kind: WashKind,
}
