use std::sync::Arc;
use std::time::Duration;

use shared::domain::{default_lanes, LaneId, StageCatalog, WashKind, WashStage};
use wash_core::state::{LaneStatus, SimState, WashMethod, MAX_LOG_ENTRIES};
use wash_core::{ChanceSource, TokioClock, WashBay};

struct CleanChance;

impl ChanceSource for CleanChance {
    fn stage_fails(&self, _lane_id: LaneId, _stage: &WashStage) -> bool {
        false
    }

    fn random_kind(&self) -> WashKind {
        WashKind::Standard
    }
}

fn clean_bay() -> Arc<WashBay> {
    WashBay::new_with_dependencies(
        StageCatalog::standard(),
        Arc::new(TokioClock),
        Arc::new(CleanChance),
    )
}

#[tokio::test(start_paused = true)]
async fn a_full_fleet_wash_drives_the_state_view() {
    let bay = clean_bay();
    let mut rx = bay.subscribe_events();
    let lanes = default_lanes();
    let mut state = SimState::new(&lanes);

    let fleet = bay.wash_all_lanes(&lanes).await.expect("fleet");
    while let Ok(event) = rx.try_recv() {
        state.apply_event(&event);
    }
    state.record_wash(WashMethod::WaitAll, fleet.elapsed);

    assert!(state
        .lanes
        .iter()
        .all(|lane| lane.status == LaneStatus::Complete));
    assert!(state.lanes.iter().all(|lane| lane.progress == 100));
    assert_eq!(state.stats.total_washes, 1);
    assert_eq!(state.stats.total_time, Duration::from_millis(16_000));
    assert!(state.logs.len() <= MAX_LOG_ENTRIES);
    assert!(state
        .logs
        .iter()
        .any(|entry| entry.message.contains("All lanes done: 3/3")));
}

#[tokio::test(start_paused = true)]
async fn a_sequential_wash_drives_one_lane_and_leaves_the_rest_idle() {
    let bay = clean_bay();
    let mut rx = bay.subscribe_events();
    let lanes = default_lanes();
    let mut state = SimState::new(&lanes);

    let report = bay.wash_lane(LaneId(1), WashKind::Express).await;
    while let Ok(event) = rx.try_recv() {
        state.apply_event(&event);
    }
    if report.succeeded {
        state.record_wash(WashMethod::Sequential, report.elapsed);
    }

    assert_eq!(state.lanes[0].status, LaneStatus::Complete);
    assert_eq!(state.lanes[1].status, LaneStatus::Waiting);
    assert_eq!(state.lanes[2].status, LaneStatus::Waiting);
    assert_eq!(state.stats.total_time, Duration::from_millis(11_000));
}
