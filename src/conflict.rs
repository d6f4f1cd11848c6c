// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Conflict Explanation
//
// Computed exactly once, at the moment a conflict is newly raised; the
// resulting reason string is retained verbatim on the train until the
// conflict resolves.

use crate::allocation::SAFE_FOLLOWING_PROGRESS;
use crate::types::{TrackSegment, Train, TrainStatus};

/// Build the diagnostic for a train that was refused every candidate.
///
/// Precedence:
/// 1. a candidate's own most recent occupant is still inside the
///    safe-following window;
/// 2. any candidate (or single-line partner) carries occupants;
/// 3. higher-priority trains wait at the same origin node;
/// 4. generic "awaiting free track".
pub fn explain_conflict(
    train: &Train,
    candidate_ids: &[String],
    tracks: &[TrackSegment],
    trains: &[Train],
) -> String {
    let destination = train.next_destination().unwrap_or("?");
    let origin = train.next_origin().unwrap_or("?");

    let direct = collect_occupants(candidate_ids, tracks, trains);

    // The safe-distance reason only applies to a candidate's own leader;
    // oncoming traffic on a single-line partner is a plain blockage.
    if let Some(lead) = direct.last() {
        if lead.progress <= SAFE_FOLLOWING_PROGRESS {
            return format!("Waiting for safe distance from {}.", lead.name);
        }
    }

    let mut blockers = direct;
    blockers.extend(collect_partner_occupants(candidate_ids, tracks, trains));

    if !blockers.is_empty() {
        let mut names: Vec<&str> = Vec::new();
        for b in &blockers {
            if !names.contains(&b.name.as_str()) {
                names.push(&b.name);
            }
        }
        return format!("Blocked by: {}.", names.join(", "));
    }

    let rivals: Vec<&str> = trains
        .iter()
        .filter(|t| {
            t.id != train.id
                && t.status == TrainStatus::Waiting
                && t.current_track_id.is_none()
                && t.next_origin() == Some(origin)
                && t.priority > train.priority
        })
        .map(|t| t.name.as_str())
        .collect();
    if !rivals.is_empty() {
        return format!("Yielding to: {}.", rivals.join(", "));
    }

    format!("Awaiting free track to {destination}.")
}

/// Occupants of every candidate, in occupancy (grant) order. The last entry
/// is the most recently granted blocker.
fn collect_occupants<'a>(
    candidate_ids: &[String],
    tracks: &[TrackSegment],
    trains: &'a [Train],
) -> Vec<&'a Train> {
    let mut occupants: Vec<&Train> = Vec::new();
    for candidate_id in candidate_ids {
        let Some(track) = tracks.iter().find(|t| &t.id == candidate_id) else {
            continue;
        };
        for occupant_id in &track.occupied_by {
            if let Some(t) = trains.iter().find(|t| &t.id == occupant_id) {
                occupants.push(t);
            }
        }
    }
    occupants
}

/// Occupants of the single-line partners that lock a candidate out.
fn collect_partner_occupants<'a>(
    candidate_ids: &[String],
    tracks: &[TrackSegment],
    trains: &'a [Train],
) -> Vec<&'a Train> {
    let mut occupants: Vec<&Train> = Vec::new();
    for candidate_id in candidate_ids {
        let Some(partner_id) = tracks
            .iter()
            .find(|t| &t.id == candidate_id)
            .and_then(|t| t.conflicts_with.as_deref())
        else {
            continue;
        };
        if let Some(partner) = tracks.iter().find(|t| t.id == partner_id) {
            for occupant_id in &partner.occupied_by {
                if let Some(t) = trains.iter().find(|t| &t.id == occupant_id) {
                    occupants.push(t);
                }
            }
        }
    }
    occupants
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrainKind;

    fn train(id: &str, kind: TrainKind, progress: f64) -> Train {
        Train {
            id: id.into(),
            name: id.into(),
            kind,
            priority: kind.priority(),
            path: vec!["A".into(), "B".into()],
            path_index: 0,
            current_track_id: None,
            progress,
            speed: 25.0,
            status: TrainStatus::Waiting,
            wait_time: 0.0,
            disappear_at: None,
            is_conflicted: false,
            conflicting_track_ids: None,
            conflict_reason: None,
            seq: 0,
        }
    }

    fn track(id: &str, occupied_by: &[&str]) -> TrackSegment {
        TrackSegment {
            id: id.into(),
            start_node: "A".into(),
            end_node: "B".into(),
            length: 100.0,
            occupied_by: occupied_by.iter().map(|s| s.to_string()).collect(),
            conflicts_with: None,
        }
    }

    #[test]
    fn safe_distance_reason_takes_precedence() {
        let tracks = vec![track("T_A_B_1", &["lead"])];
        let mut lead = train("lead", TrainKind::Express, 0.05);
        lead.status = TrainStatus::Moving;
        lead.current_track_id = Some("T_A_B_1".into());
        let requester = train("follower", TrainKind::Local, -0.01);
        let trains = vec![lead, requester.clone()];

        let reason =
            explain_conflict(&requester, &["T_A_B_1".to_string()], &tracks, &trains);
        assert_eq!(reason, "Waiting for safe distance from lead.");
    }

    #[test]
    fn blocked_by_lists_distinct_names() {
        let tracks = vec![
            track("T_A_B_1", &["x"]),
            track("T_A_B_2", &["y"]),
        ];
        let mut x = train("x", TrainKind::Express, 0.5);
        x.status = TrainStatus::Moving;
        let mut y = train("y", TrainKind::Freight, 0.6);
        y.status = TrainStatus::Moving;
        let requester = train("req", TrainKind::Local, -0.01);
        let trains = vec![x, y, requester.clone()];

        let reason = explain_conflict(
            &requester,
            &["T_A_B_1".to_string(), "T_A_B_2".to_string()],
            &tracks,
            &trains,
        );
        assert_eq!(reason, "Blocked by: x, y.");
    }

    #[test]
    fn partner_occupant_counts_as_blocker() {
        let mut forward = track("T_A_B", &[]);
        forward.conflicts_with = Some("T_B_A".into());
        let mut reverse = track("T_B_A", &["oncoming"]);
        reverse.start_node = "B".into();
        reverse.end_node = "A".into();
        reverse.conflicts_with = Some("T_A_B".into());
        let tracks = vec![forward, reverse];

        let mut oncoming = train("oncoming", TrainKind::Express, 0.5);
        oncoming.status = TrainStatus::Moving;
        let requester = train("req", TrainKind::Local, -0.01);
        let trains = vec![oncoming, requester.clone()];

        let reason =
            explain_conflict(&requester, &["T_A_B".to_string()], &tracks, &trains);
        assert_eq!(reason, "Blocked by: oncoming.");
    }

    #[test]
    fn early_partner_occupant_is_a_blockage_not_a_following_wait() {
        // Following is never permitted on single lines, so an oncoming train
        // still near its own entry must not produce the safe-distance reason.
        let mut forward = track("T_A_B", &[]);
        forward.conflicts_with = Some("T_B_A".into());
        let mut reverse = track("T_B_A", &["oncoming"]);
        reverse.start_node = "B".into();
        reverse.end_node = "A".into();
        reverse.conflicts_with = Some("T_A_B".into());
        let tracks = vec![forward, reverse];

        let mut oncoming = train("oncoming", TrainKind::Express, 0.05);
        oncoming.status = TrainStatus::Moving;
        let requester = train("req", TrainKind::Local, -0.01);
        let trains = vec![oncoming, requester.clone()];

        let reason =
            explain_conflict(&requester, &["T_A_B".to_string()], &tracks, &trains);
        assert_eq!(reason, "Blocked by: oncoming.");
    }

    #[test]
    fn yielding_reason_when_no_blockers() {
        // One free track exists but a higher-priority rival took it this tick;
        // from the loser's view the candidates are empty of occupants only if
        // the grant has not landed yet, so this covers the rival branch.
        let tracks: Vec<TrackSegment> = Vec::new();
        let rival = train("Superfast Exp", TrainKind::Shatabdi, -0.01);
        let requester = train("City Local", TrainKind::Local, -0.01);
        let trains = vec![rival, requester.clone()];

        let reason = explain_conflict(&requester, &[], &tracks, &trains);
        assert_eq!(reason, "Yielding to: Superfast Exp.");
    }

    #[test]
    fn generic_reason_as_last_resort() {
        let requester = train("Lone Local", TrainKind::Local, -0.01);
        let trains = vec![requester.clone()];
        let reason = explain_conflict(&requester, &[], &[], &trains);
        assert_eq!(reason, "Awaiting free track to B.");
    }
}
