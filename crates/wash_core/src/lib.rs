use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::future::{join_all, select_all};
use shared::{
    domain::{LaneId, StageCatalog, WashKind, WashStage},
    error::StageFailure,
    report::{FleetReport, RaceEntry, WashReport},
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

pub mod chance;
pub mod clock;
pub mod debounce;
pub mod state;

pub use chance::{ChanceSource, SeededChance, ThreadRngChance};
pub use clock::{Clock, TokioClock};
pub use debounce::Debouncer;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Progress notifications for one bay, broadcast to however many UI
/// surfaces care to listen. Sends are lossy when nobody is subscribed.
#[derive(Debug, Clone)]
pub enum WashEvent {
    WashStarted {
        lane_id: LaneId,
        kind: WashKind,
    },
    StageStarted {
        lane_id: LaneId,
        stage: String,
        index: usize,
        total: usize,
    },
    StageCompleted {
        lane_id: LaneId,
        stage: String,
        index: usize,
        total: usize,
    },
    StageFailed(StageFailure),
    WashFinished(WashReport),
    FleetFinished(FleetReport),
    RaceWon(WashReport),
    RaceFieldFinished {
        success_count: usize,
        elapsed: Duration,
    },
}

pub struct WashBay {
    catalog: StageCatalog,
    clock: Arc<dyn Clock>,
    chance: Arc<dyn ChanceSource>,
    events: broadcast::Sender<WashEvent>,
}

impl WashBay {
    pub fn new() -> Arc<Self> {
        Self::new_with_dependencies(
            StageCatalog::standard(),
            Arc::new(TokioClock),
            Arc::new(ThreadRngChance),
        )
    }

    pub fn new_with_dependencies(
        catalog: StageCatalog,
        clock: Arc<dyn Clock>,
        chance: Arc<dyn ChanceSource>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            catalog,
            clock,
            chance,
            events,
        })
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WashEvent> {
        self.events.subscribe()
    }

    /// Sequential run over the catalog stages selected by `kind`.
    pub async fn wash_lane(&self, lane_id: LaneId, kind: WashKind) -> WashReport {
        let stages = self.catalog.stages_for(kind);
        self.wash_stages(lane_id, kind, stages).await
    }

    /// Sequential run over an explicit stage list. A stage never starts
    /// before the previous one's delay has elapsed and succeeded; the
    /// first malfunction skips the remainder. Failure is a modeled
    /// outcome, not an `Err`.
    pub async fn wash_stages(
        &self,
        lane_id: LaneId,
        kind: WashKind,
        stages: &[WashStage],
    ) -> WashReport {
        let run_id = Uuid::new_v4();
        let started = self.clock.now();
        let total = stages.len();
        let _ = self.events.send(WashEvent::WashStarted { lane_id, kind });

        for (index, stage) in stages.iter().enumerate() {
            let _ = self.events.send(WashEvent::StageStarted {
                lane_id,
                stage: stage.name.clone(),
                index,
                total,
            });

            if let Err(failure) = self.run_stage(lane_id, stage).await {
                let elapsed = self.clock.now().duration_since(started);
                warn!(
                    "wash: lane={lane_id} aborted during {} after {:?}",
                    failure.stage, elapsed
                );
                let report = WashReport {
                    run_id,
                    lane_id,
                    kind,
                    elapsed,
                    succeeded: false,
                    failure: Some(failure.clone()),
                };
                let _ = self.events.send(WashEvent::StageFailed(failure));
                let _ = self.events.send(WashEvent::WashFinished(report.clone()));
                return report;
            }

            let _ = self.events.send(WashEvent::StageCompleted {
                lane_id,
                stage: stage.name.clone(),
                index,
                total,
            });
        }

        let elapsed = self.clock.now().duration_since(started);
        info!("wash: lane={lane_id} kind={kind} clean in {elapsed:?}");
        let report = WashReport {
            run_id,
            lane_id,
            kind,
            elapsed,
            succeeded: true,
            failure: None,
        };
        let _ = self.events.send(WashEvent::WashFinished(report.clone()));
        report
    }

    /// Wash every lane at once (standard program) and wait for the whole
    /// fleet. One lane's malfunction never cancels the others.
    pub async fn wash_all_lanes(self: &Arc<Self>, lanes: &[LaneId]) -> Result<FleetReport> {
        let started = self.clock.now();
        let handles: Vec<JoinHandle<WashReport>> = lanes
            .iter()
            .map(|&lane_id| {
                let bay = Arc::clone(self);
                tokio::spawn(async move { bay.wash_lane(lane_id, WashKind::Standard).await })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for outcome in join_all(handles).await {
            reports.push(outcome.context("wash task terminated unexpectedly")?);
        }

        let elapsed = self.clock.now().duration_since(started);
        let success_count = reports.iter().filter(|report| report.succeeded).count();
        info!(
            "wash: fleet of {} done, {success_count} clean in {elapsed:?}",
            reports.len()
        );
        let report = FleetReport {
            success_count,
            elapsed,
            reports,
        };
        let _ = self.events.send(WashEvent::FleetFinished(report.clone()));
        Ok(report)
    }

    /// Race the lanes with kinds drawn from the chance source.
    pub async fn wash_race(self: &Arc<Self>, lanes: &[LaneId]) -> Result<WashReport> {
        let entries = lanes
            .iter()
            .map(|&lane_id| RaceEntry {
                lane_id,
                kind: self.chance.random_kind(),
            })
            .collect();
        self.wash_race_entries(entries).await
    }

    /// First run to settle wins, clean or not; callers inspect
    /// `succeeded`. The rest of the field keeps washing in the background
    /// and `RaceFieldFinished` fires once every straggler is done.
    pub async fn wash_race_entries(
        self: &Arc<Self>,
        entries: Vec<RaceEntry>,
    ) -> Result<WashReport> {
        if entries.is_empty() {
            return Err(anyhow!("a race needs at least one lane"));
        }

        let started = self.clock.now();
        let handles: Vec<JoinHandle<WashReport>> = entries
            .into_iter()
            .map(|entry| {
                let bay = Arc::clone(self);
                tokio::spawn(async move { bay.wash_lane(entry.lane_id, entry.kind).await })
            })
            .collect();

        let (first, _index, rest) = select_all(handles).await;
        let winner = first.context("wash task terminated unexpectedly")?;
        info!(
            "wash: race won by lane={} in {:?} succeeded={}",
            winner.lane_id, winner.elapsed, winner.succeeded
        );
        let _ = self.events.send(WashEvent::RaceWon(winner.clone()));

        // Stragglers always run to completion; nobody cancels a wash
        // mid-cycle.
        let bay = Arc::clone(self);
        let winner_report = winner.clone();
        tokio::spawn(async move {
            let mut reports = vec![winner_report];
            for outcome in join_all(rest).await {
                match outcome {
                    Ok(report) => reports.push(report),
                    Err(err) => warn!("wash: straggler task lost: {err}"),
                }
            }
            let elapsed = bay.clock.now().duration_since(started);
            let success_count = reports.iter().filter(|report| report.succeeded).count();
            let _ = bay.events.send(WashEvent::RaceFieldFinished {
                success_count,
                elapsed,
            });
        });

        Ok(winner)
    }

    async fn run_stage(&self, lane_id: LaneId, stage: &WashStage) -> Result<(), StageFailure> {
        self.clock.sleep(stage.duration).await;
        if self.chance.stage_fails(lane_id, stage) {
            return Err(StageFailure::new(lane_id, stage.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
