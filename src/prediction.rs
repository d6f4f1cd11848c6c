// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Delay Prediction

use serde::{Deserialize, Serialize};

use crate::allocation;
use crate::simulation::RailSimulation;
use crate::types::{TrainStatus, Train};

/// Segments of look-ahead when estimating future conflicts.
pub const MAX_PREDICTION_DEPTH: usize = 5;

/// Fallback speed for a blocker reporting a non-positive speed.
const FALLBACK_SPEED: f64 = 25.0;

/// Flat per-rival delay estimate (simulated seconds).
const RIVAL_DELAY_SECS: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedConflict {
    pub reason: String,
    pub delay: f64,
}

/// Read-only look-ahead over a train's remaining route: estimated extra
/// delay from occupied segments and from higher-priority rivals waiting at
/// shared origin nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub train_id: String,
    pub total_delay: f64,
    pub conflicts: Vec<PredictedConflict>,
}

/// Predict conflicts along the next `MAX_PREDICTION_DEPTH` legs of a train's
/// route. Returns `None` for an unknown train id.
pub fn predict(sim: &RailSimulation, train_id: &str) -> Option<Prediction> {
    let train = sim.find_train(train_id)?;

    let mut total_delay = 0.0;
    let mut conflicts = Vec::new();

    // A moving train already holds its current leg; prediction starts at the
    // leg after it.
    let mut path_index = train.path_index;
    if train.current_track_id.is_some() && train.status == TrainStatus::Moving {
        path_index += 1;
    }

    for _ in 0..MAX_PREDICTION_DEPTH {
        if path_index + 1 >= train.path.len() {
            break;
        }
        let start = &train.path[path_index];
        let end = &train.path[path_index + 1];
        let candidate_ids = allocation::candidate_tracks(sim.tracks(), start, end);

        // Every candidate occupied means the leg is blocked outright; the
        // first occupant of the first blocked candidate stands in as the
        // representative blocker for the time estimate.
        let blocked: Vec<(&Train, f64)> = candidate_ids
            .iter()
            .filter_map(|id| {
                let track = sim.find_track(id)?;
                let occupant_id = track.occupied_by.first()?;
                let occupant = sim.find_train(occupant_id)?;
                Some((occupant, track.length))
            })
            .collect();
        if !candidate_ids.is_empty() && blocked.len() == candidate_ids.len() {
            let (blocker, track_length) = blocked[0];
            let speed = if blocker.speed > 0.0 { blocker.speed } else { FALLBACK_SPEED };
            let time_to_clear =
                ((1.0 - blocker.progress) * track_length / speed).max(0.0);
            total_delay += time_to_clear;
            conflicts.push(PredictedConflict {
                reason: format!("Track to {end} may be occupied by {}.", blocker.name),
                delay: time_to_clear,
            });
        }

        let rivals: Vec<&str> = sim
            .trains()
            .iter()
            .filter(|t| {
                t.id != train.id
                    && t.status == TrainStatus::Waiting
                    && t.next_origin() == Some(start.as_str())
                    && t.priority > train.priority
            })
            .map(|t| t.name.as_str())
            .collect();
        if !rivals.is_empty() {
            let delay = rivals.len() as f64 * RIVAL_DELAY_SECS;
            total_delay += delay;
            conflicts.push(PredictedConflict {
                reason: format!(
                    "Higher priority trains ({}) waiting at {start}.",
                    rivals.join(", ")
                ),
                delay,
            });
        }

        path_index += 1;
    }

    Some(Prediction { train_id: train.id.clone(), total_delay, conflicts })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::conflict_demo;

    #[test]
    fn unknown_train_yields_none() {
        let sim = RailSimulation::from_layout(conflict_demo());
        assert!(predict(&sim, "ghost").is_none());
    }

    #[test]
    fn clear_path_predicts_no_delay() {
        let sim = RailSimulation::from_layout(conflict_demo());
        // Before any tick nothing occupies any track.
        let prediction = predict(&sim, "T1-SH").unwrap();
        assert!(prediction.conflicts.iter().all(|c| !c.reason.contains("occupied")));
    }

    #[test]
    fn lower_priority_train_sees_waiting_rivals() {
        let sim = RailSimulation::from_layout(conflict_demo());
        let prediction = predict(&sim, "T4-LO").unwrap();
        // Three higher-priority trains wait at A alongside the Local.
        let rival_conflict = prediction
            .conflicts
            .iter()
            .find(|c| c.reason.contains("Higher priority"))
            .expect("rival conflict predicted");
        assert_eq!(rival_conflict.delay, 30.0);
        assert!(prediction.total_delay >= 30.0);
    }

    #[test]
    fn fully_occupied_leg_predicts_clearing_time() {
        let mut sim = RailSimulation::from_layout(conflict_demo());
        sim.play();
        sim.tick_core(0.1); // grants land, both forward tracks occupied
        let prediction = predict(&sim, "T4-LO").unwrap();
        let occupied = prediction
            .conflicts
            .iter()
            .find(|c| c.reason.contains("occupied"))
            .expect("occupied-leg conflict predicted");
        assert!(occupied.delay > 0.0);
    }
}
