use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::domain::{LaneId, WashKind, WashStage};

/// Randomness capability behind the simulated malfunctions and the race
/// mode's wash-kind draw. Injecting it keeps failure paths reproducible
/// under test.
pub trait ChanceSource: Send + Sync {
    /// Roll the stage's malfunction chance for one run in `lane_id`.
    fn stage_fails(&self, lane_id: LaneId, stage: &WashStage) -> bool;

    /// Draw the wash kind for a race starter.
    fn random_kind(&self) -> WashKind;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngChance;

impl ChanceSource for ThreadRngChance {
    fn stage_fails(&self, _lane_id: LaneId, stage: &WashStage) -> bool {
        stage.failure_chance > 0.0 && rand::rng().random::<f64>() < stage.failure_chance
    }

    fn random_kind(&self) -> WashKind {
        if rand::rng().random_bool(0.5) {
            WashKind::Express
        } else {
            WashKind::Standard
        }
    }
}

/// Seeded source: equal seeds replay identical malfunction sequences.
#[derive(Debug)]
pub struct SeededChance {
    rng: Mutex<StdRng>,
}

impl SeededChance {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn roll(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.random(),
            Err(poisoned) => poisoned.into_inner().random(),
        }
    }
}

impl ChanceSource for SeededChance {
    fn stage_fails(&self, _lane_id: LaneId, stage: &WashStage) -> bool {
        stage.failure_chance > 0.0 && self.roll() < stage.failure_chance
    }

    fn random_kind(&self) -> WashKind {
        if self.roll() < 0.5 {
            WashKind::Express
        } else {
            WashKind::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared::domain::StageCatalog;

    use super::*;

    fn failure_sequence(chance: &SeededChance, runs: usize) -> Vec<bool> {
        let catalog = StageCatalog::standard();
        let mut rolls = Vec::new();
        for _ in 0..runs {
            for stage in catalog.stages() {
                rolls.push(chance.stage_fails(LaneId(1), stage));
            }
        }
        rolls
    }

    #[test]
    fn equal_seeds_replay_identical_failure_sequences() {
        let first = failure_sequence(&SeededChance::new(7), 64);
        let second = failure_sequence(&SeededChance::new(7), 64);
        assert_eq!(first, second);
    }

    #[test]
    fn hazard_free_stages_never_fail() {
        let chance = SeededChance::new(42);
        let stage = WashStage::new("Rinse", Duration::from_millis(100));
        assert!((0..256).all(|_| !chance.stage_fails(LaneId(1), &stage)));
    }

    #[test]
    fn certain_hazard_always_fails() {
        let chance = SeededChance::new(42);
        let stage =
            WashStage::new("Scrub", Duration::from_millis(100)).with_failure_chance(1.0);
        assert!((0..16).all(|_| chance.stage_fails(LaneId(1), &stage)));
    }
}
