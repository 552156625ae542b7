use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of lanes in the default bay layout.
pub const DEFAULT_LANE_COUNT: i64 = 3;

/// How many leading catalog stages an express wash runs.
pub const EXPRESS_STAGE_COUNT: usize = 4;

/// Chance that the scrub machinery malfunctions during one run.
pub const SCRUB_FAILURE_CHANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneId(pub i64);

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lanes 1..=DEFAULT_LANE_COUNT, the layout every demo starts from.
pub fn default_lanes() -> Vec<LaneId> {
    (1..=DEFAULT_LANE_COUNT).map(LaneId).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WashKind {
    Standard,
    Express,
}

impl fmt::Display for WashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Express => write!(f, "express"),
        }
    }
}

/// One named unit of simulated work: a fixed delay plus a failure chance
/// rolled once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashStage {
    pub name: String,
    pub duration: Duration,
    pub failure_chance: f64,
}

impl WashStage {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            failure_chance: 0.0,
        }
    }

    pub fn with_failure_chance(mut self, chance: f64) -> Self {
        self.failure_chance = chance;
        self
    }
}

/// Ordered stage list shared by every lane. A kind selects a prefix of the
/// catalog; the catalog itself is immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCatalog {
    stages: Vec<WashStage>,
}

impl StageCatalog {
    pub fn new(stages: Vec<WashStage>) -> Self {
        Self { stages }
    }

    /// The full wash program: only the scrub stage can malfunction.
    pub fn standard() -> Self {
        Self::new(vec![
            WashStage::new("Pre-rinse", Duration::from_millis(2000)),
            WashStage::new("Soap", Duration::from_millis(3000)),
            WashStage::new("Scrub", Duration::from_millis(4000))
                .with_failure_chance(SCRUB_FAILURE_CHANCE),
            WashStage::new("Rinse", Duration::from_millis(2000)),
            WashStage::new("Dry", Duration::from_millis(3000)),
            WashStage::new("Wax", Duration::from_millis(2000)),
        ])
    }

    pub fn stages(&self) -> &[WashStage] {
        &self.stages
    }

    pub fn stages_for(&self, kind: WashKind) -> &[WashStage] {
        match kind {
            WashKind::Standard => &self.stages,
            WashKind::Express => &self.stages[..EXPRESS_STAGE_COUNT.min(self.stages.len())],
        }
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
