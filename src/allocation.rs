// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Track Allocation

use std::collections::HashSet;

use crate::types::{TrackSegment, Train, TrainStatus};

/// A leader must be this far along a shared-capacity segment before a
/// trailing same-direction train may be granted it.
pub const SAFE_FOLLOWING_PROGRESS: f64 = 0.15;

/// Indices of trains requesting a segment this tick, in resolution order:
/// priority descending, then spawn sequence ascending. Stability is never
/// relied upon; the sequence key makes equal-priority order explicit.
pub fn request_order(trains: &[Train]) -> Vec<usize> {
    let mut order: Vec<usize> = trains
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.status == TrainStatus::Waiting
                && t.current_track_id.is_none()
                && t.path_index + 1 < t.path.len()
        })
        .map(|(i, _)| i)
        .collect();
    order.sort_by(|&a, &b| {
        trains[b]
            .priority
            .cmp(&trains[a].priority)
            .then(trains[a].seq.cmp(&trains[b].seq))
    });
    order
}

/// All directed segments from `start` to `end`, in declaration order.
/// Parallel segments appear in the order they were declared or added.
pub fn candidate_tracks(tracks: &[TrackSegment], start: &str, end: &str) -> Vec<String> {
    tracks
        .iter()
        .filter(|t| t.start_node == start && t.end_node == end)
        .map(|t| t.id.clone())
        .collect()
}

/// Pick the first candidate the requesting train may enter, or `None`.
///
/// A segment already granted this tick is never eligible. A single-line
/// segment (one with a `conflicts_with` partner) is eligible only while both
/// pair members are empty and the partner was not granted this tick; no
/// following is permitted there. An unpaired segment is eligible when free,
/// or occupied with its leader past the safe-following threshold.
pub fn select_track(
    tracks: &[TrackSegment],
    trains: &[Train],
    candidate_ids: &[String],
    granted_this_tick: &HashSet<String>,
) -> Option<String> {
    for candidate_id in candidate_ids {
        if granted_this_tick.contains(candidate_id) {
            continue;
        }
        let Some(track) = tracks.iter().find(|t| &t.id == candidate_id) else {
            continue;
        };

        if let Some(partner_id) = &track.conflicts_with {
            let partner_occupied = tracks
                .iter()
                .find(|t| t.id == *partner_id)
                .map(|t| !t.is_free())
                .unwrap_or(false);
            if track.is_free()
                && !partner_occupied
                && !granted_this_tick.contains(partner_id)
            {
                return Some(candidate_id.clone());
            }
            continue;
        }

        if track.is_free() {
            return Some(candidate_id.clone());
        }
        if let Some(leader) = leader_of(track, trains) {
            if leader.progress > SAFE_FOLLOWING_PROGRESS {
                return Some(candidate_id.clone());
            }
        }
    }
    None
}

/// The most recently granted occupant of a segment, resolved to its train.
pub fn leader_of<'a>(track: &TrackSegment, trains: &'a [Train]) -> Option<&'a Train> {
    let leader_id = track.leader()?;
    trains.iter().find(|t| t.id == leader_id)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
