use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::LaneId;

/// The only failure the simulation models: a stage's malfunction roll came
/// up, aborting the rest of that lane's run. Expected, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("machine malfunction in lane {lane_id} during {stage}")]
pub struct StageFailure {
    pub lane_id: LaneId,
    pub stage: String,
}

impl StageFailure {
    pub fn new(lane_id: LaneId, stage: impl Into<String>) -> Self {
        Self {
            lane_id,
            stage: stage.into(),
        }
    }
}
