use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::LaneId;

use crate::WashEvent;

/// Oldest entries are dropped once the log reaches this many lines.
pub const MAX_LOG_ENTRIES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Method,
    Start,
    Info,
    Success,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub kind: LogKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneStatus {
    Waiting,
    Washing,
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneView {
    pub lane_id: LaneId,
    pub status: LaneStatus,
    pub stage: Option<String>,
    pub progress: u8,
}

impl LaneView {
    fn idle(lane_id: LaneId) -> Self {
        Self {
            lane_id,
            status: LaneStatus::Waiting,
            stage: None,
            progress: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WashMethod {
    Sequential,
    WaitAll,
    FirstWins,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WashStats {
    pub total_washes: u64,
    pub total_time: Duration,
    pub methods_used: HashSet<WashMethod>,
}

/// Caller-owned view of the whole bay: lanes, the rolling log, and the
/// stats panel. UI layers fold core events into it with `apply_event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub lanes: Vec<LaneView>,
    pub logs: VecDeque<LogEntry>,
    pub stats: WashStats,
}

impl SimState {
    pub fn new(lane_ids: &[LaneId]) -> Self {
        Self {
            lanes: lane_ids.iter().copied().map(LaneView::idle).collect(),
            logs: VecDeque::new(),
            stats: WashStats::default(),
        }
    }

    pub fn push_log(&mut self, message: impl Into<String>, kind: LogKind) {
        self.logs.push_back(LogEntry {
            message: message.into(),
            kind,
            timestamp: Utc::now(),
        });
        while self.logs.len() > MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
    }

    /// Stats are driven by the demo driver, which knows which method ran.
    pub fn record_wash(&mut self, method: WashMethod, elapsed: Duration) {
        self.stats.total_washes += 1;
        self.stats.total_time += elapsed;
        self.stats.methods_used.insert(method);
    }

    /// Lanes and logs return to idle; the stats panel survives a reset.
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            *lane = LaneView::idle(lane.lane_id);
        }
        self.logs.clear();
    }

    pub fn apply_event(&mut self, event: &WashEvent) {
        match event {
            WashEvent::WashStarted { lane_id, kind } => {
                if let Some(lane) = self.lane_mut(*lane_id) {
                    lane.status = LaneStatus::Washing;
                    lane.stage = None;
                    lane.progress = 0;
                }
                self.push_log(
                    format!("Lane {lane_id}: {kind} wash starting"),
                    LogKind::Start,
                );
            }
            WashEvent::StageStarted { lane_id, stage, .. } => {
                if let Some(lane) = self.lane_mut(*lane_id) {
                    lane.stage = Some(stage.clone());
                }
                self.push_log(format!("Lane {lane_id}: {stage} underway"), LogKind::Info);
            }
            WashEvent::StageCompleted {
                lane_id,
                stage,
                index,
                total,
            } => {
                if let Some(lane) = self.lane_mut(*lane_id) {
                    lane.progress = percent(*index + 1, *total);
                }
                self.push_log(format!("Lane {lane_id}: {stage} complete"), LogKind::Success);
            }
            WashEvent::StageFailed(failure) => {
                if let Some(lane) = self.lane_mut(failure.lane_id) {
                    lane.status = LaneStatus::Failed;
                }
                self.push_log(failure.to_string(), LogKind::Error);
            }
            WashEvent::WashFinished(report) => {
                if report.succeeded {
                    if let Some(lane) = self.lane_mut(report.lane_id) {
                        lane.status = LaneStatus::Complete;
                        lane.stage = None;
                        lane.progress = 100;
                    }
                    self.push_log(
                        format!(
                            "Lane {} finished, sparkling clean in {}",
                            report.lane_id,
                            fmt_secs(report.elapsed)
                        ),
                        LogKind::Complete,
                    );
                }
            }
            WashEvent::FleetFinished(fleet) => {
                self.push_log(
                    format!(
                        "All lanes done: {}/{} successful in {}",
                        fleet.success_count,
                        fleet.reports.len(),
                        fmt_secs(fleet.elapsed)
                    ),
                    LogKind::Complete,
                );
            }
            WashEvent::RaceWon(report) => {
                self.push_log(
                    format!(
                        "Lane {} takes the race in {}",
                        report.lane_id,
                        fmt_secs(report.elapsed)
                    ),
                    LogKind::Complete,
                );
            }
            WashEvent::RaceFieldFinished {
                success_count,
                elapsed,
            } => {
                self.push_log(
                    format!(
                        "Whole field finished: {success_count} clean after {}",
                        fmt_secs(*elapsed)
                    ),
                    LogKind::Info,
                );
            }
        }
    }

    fn lane_mut(&mut self, lane_id: LaneId) -> Option<&mut LaneView> {
        self.lanes.iter_mut().find(|lane| lane.lane_id == lane_id)
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total).min(100) as u8
}

fn fmt_secs(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
