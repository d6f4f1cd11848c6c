// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Simulation Core

use std::collections::HashSet;

use wasm_bindgen::prelude::*;

use crate::allocation;
use crate::conflict;
use crate::layout::Layout;
use crate::types::*;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Simulated seconds a Stopped train lingers on its final segment before the
/// cleanup phase removes it.
pub const ARRIVAL_GRACE_SECS: f64 = 3.0;

/// Bounded in-state event log; oldest entries are dropped past this.
pub const LOG_CAPACITY: usize = 50;

// ─── RailSimulation struct ───────────────────────────────────────────────────

#[wasm_bindgen]
pub struct RailSimulation {
    pub(crate) trains: Vec<Train>,
    pub(crate) tracks: Vec<TrackSegment>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) time: f64,
    pub(crate) running: bool,
    pub(crate) speed_multiplier: f64,
    pub(crate) log: Vec<Event>,

    /// Monotonic spawn sequence; also the equal-priority tie-breaker.
    pub(crate) spawn_counter: u64,
    /// Descriptor the simulation was built from, kept for full reset.
    pub(crate) layout: Layout,

    pub(crate) arrivals_completed: u32,
    pub(crate) conflicts_raised: u32,
    pub(crate) conflicts_resolved: u32,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl RailSimulation {
    /// Materialize a runtime state from a topology descriptor. Track lengths
    /// come from declared overrides or straight-line node distance; initial
    /// trains spawn Waiting with their staggered pre-entry progress.
    pub fn from_layout(layout: Layout) -> Self {
        let nodes = layout.nodes.clone();
        let tracks: Vec<TrackSegment> = layout
            .tracks
            .iter()
            .map(|spec| TrackSegment {
                id: spec.id.clone(),
                start_node: spec.start_node.clone(),
                end_node: spec.end_node.clone(),
                length: layout.segment_length(spec),
                occupied_by: Vec::new(),
                conflicts_with: spec.conflicts_with.clone(),
            })
            .collect();

        let mut spawn_counter = 0u64;
        let trains: Vec<Train> = layout
            .initial_trains
            .iter()
            .map(|spec| {
                let seq = spawn_counter;
                spawn_counter += 1;
                Train {
                    id: spec.id.clone(),
                    name: spec.name.clone(),
                    kind: spec.kind,
                    priority: spec.kind.priority(),
                    path: spec.path.clone(),
                    path_index: 0,
                    current_track_id: None,
                    progress: spec.initial_progress,
                    speed: spec.speed,
                    status: TrainStatus::Waiting,
                    wait_time: 0.0,
                    disappear_at: None,
                    is_conflicted: false,
                    conflicting_track_ids: None,
                    conflict_reason: None,
                    seq,
                }
            })
            .collect();

        let mut sim = Self {
            trains,
            tracks,
            nodes,
            time: 0.0,
            running: false,
            speed_multiplier: 1.0,
            log: Vec::new(),
            spawn_counter,
            layout,
            arrivals_completed: 0,
            conflicts_raised: 0,
            conflicts_resolved: 0,
        };
        let name = sim.layout.name.clone();
        sim.log_event(
            EventCategory::Info,
            format!("Simulation initialized with layout \"{name}\". Press play to start."),
        );
        sim
    }

    /// Advance the simulation by `wall_delta` wall-clock seconds.
    ///
    /// No-op while paused. The simulated delta is `wall_delta` scaled by the
    /// speed multiplier; callers may pass arbitrary non-uniform deltas.
    pub fn tick_core(&mut self, wall_delta: f64) -> TickResult {
        if !self.running {
            return TickResult { time: self.time, events: Vec::new() };
        }
        let dt = wall_delta.max(0.0) * self.speed_multiplier;
        self.time += dt;

        let mut events = Vec::new();

        // Phase 0: remove trains whose post-arrival grace expired, freeing
        // their segment before this tick's grants run.
        self.cleanup_phase(&mut events);

        // Phase 1: integrate progress for moving trains, accumulate wait time.
        self.movement_phase(dt);

        // Phase 2: junction and final-destination arrivals.
        self.arrival_phase(&mut events);

        // Phase 3 + 4: priority-ordered track requests, grants and conflicts.
        self.allocation_phase(&mut events);

        TickResult { time: self.time, events }
    }

    fn cleanup_phase(&mut self, events: &mut Vec<Event>) {
        let expired: Vec<String> = self
            .trains
            .iter()
            .filter(|t| {
                t.status == TrainStatus::Stopped
                    && t.disappear_at.is_some_and(|at| self.time >= at)
            })
            .map(|t| t.id.clone())
            .collect();

        for train_id in expired {
            let Some((name, track_id)) = self
                .trains
                .iter()
                .find(|t| t.id == train_id)
                .map(|t| (t.name.clone(), t.current_track_id.clone()))
            else {
                continue;
            };
            if let Some(track_id) = track_id {
                self.release_occupancy(&track_id, &train_id);
            }
            self.trains.retain(|t| t.id != train_id);
            events.push(self.log_event(
                EventCategory::Info,
                format!("Train {name} has completed its service."),
            ));
        }
    }

    fn movement_phase(&mut self, dt: f64) {
        let tracks = &self.tracks;
        for train in self.trains.iter_mut() {
            match train.status {
                TrainStatus::Moving => {
                    let Some(track_id) = &train.current_track_id else { continue };
                    let Some(track) = tracks.iter().find(|t| &t.id == track_id) else {
                        continue;
                    };
                    if track.length > 0.0 {
                        let distance_moved = train.speed * dt;
                        train.progress =
                            (train.progress + distance_moved / track.length).min(1.0);
                    }
                }
                TrainStatus::Waiting => {
                    train.wait_time += dt;
                }
                TrainStatus::Stopped => {}
            }
        }
    }

    fn arrival_phase(&mut self, events: &mut Vec<Event>) {
        for i in 0..self.trains.len() {
            let (progress, track_id) = {
                let t = &self.trains[i];
                (t.progress, t.current_track_id.clone())
            };
            let Some(track_id) = track_id else { continue };
            if progress < 1.0 {
                continue;
            }
            let Some(end_node) =
                self.tracks.iter().find(|t| t.id == track_id).map(|t| t.end_node.clone())
            else {
                continue;
            };

            if self.trains[i].on_final_leg() {
                // Idempotent: a Stopped train re-entering this phase does
                // nothing until cleanup removes it.
                if self.trains[i].status != TrainStatus::Stopped {
                    let name = self.trains[i].name.clone();
                    self.trains[i].status = TrainStatus::Stopped;
                    self.trains[i].disappear_at = Some(self.time + ARRIVAL_GRACE_SECS);
                    self.arrivals_completed += 1;
                    let dest = self.node_display_name(&end_node);
                    events.push(self.log_event(
                        EventCategory::Arrival,
                        format!("Train {name} has reached destination {dest}."),
                    ));
                }
            } else {
                let (name, train_id) = {
                    let t = &self.trains[i];
                    (t.name.clone(), t.id.clone())
                };
                self.release_occupancy(&track_id, &train_id);
                let train = &mut self.trains[i];
                train.current_track_id = None;
                train.progress = 0.0;
                train.path_index += 1;
                train.status = TrainStatus::Waiting;
                events.push(self.log_event(
                    EventCategory::JunctionArrival,
                    format!("{name} arrived at junction {end_node}."),
                ));
            }
        }
    }

    fn allocation_phase(&mut self, events: &mut Vec<Event>) {
        let order = allocation::request_order(&self.trains);
        let mut granted: HashSet<String> = HashSet::new();

        for idx in order {
            let (Some(start), Some(end)) = (
                self.trains[idx].next_origin().map(str::to_owned),
                self.trains[idx].next_destination().map(str::to_owned),
            ) else {
                continue;
            };

            let candidate_ids = allocation::candidate_tracks(&self.tracks, &start, &end);
            let choice = allocation::select_track(
                &self.tracks,
                &self.trains,
                &candidate_ids,
                &granted,
            );

            match choice {
                Some(track_id) => {
                    granted.insert(track_id.clone());
                    let partner = self
                        .tracks
                        .iter()
                        .find(|t| t.id == track_id)
                        .and_then(|t| t.conflicts_with.clone());
                    if let Some(partner_id) = partner {
                        granted.insert(partner_id);
                    }

                    let train_id = self.trains[idx].id.clone();
                    if let Some(track) =
                        self.tracks.iter_mut().find(|t| t.id == track_id)
                    {
                        track.occupied_by.push(train_id);
                    }

                    let was_conflicted = self.trains[idx].is_conflicted;
                    let (name, kind) = {
                        let train = &mut self.trains[idx];
                        train.current_track_id = Some(track_id);
                        train.progress = 0.0;
                        train.status = TrainStatus::Moving;
                        train.is_conflicted = false;
                        train.conflicting_track_ids = None;
                        train.conflict_reason = None;
                        (train.name.clone(), train.kind)
                    };

                    if was_conflicted {
                        self.conflicts_resolved += 1;
                        events.push(self.log_event(
                            EventCategory::Resolution,
                            format!("CONFLICT RESOLVED: Path to {end} is now clear for {name}."),
                        ));
                    }
                    events.push(self.log_event(
                        EventCategory::Info,
                        format!("{name} ({}) proceeds to {end}.", kind.label()),
                    ));
                }
                None => {
                    // Edge-triggered: only the transition into conflict is
                    // reported, repeats stay silent.
                    if self.trains[idx].is_conflicted {
                        continue;
                    }
                    let reason = conflict::explain_conflict(
                        &self.trains[idx],
                        &candidate_ids,
                        &self.tracks,
                        &self.trains,
                    );
                    let name = {
                        let train = &mut self.trains[idx];
                        train.is_conflicted = true;
                        train.conflicting_track_ids = Some(candidate_ids.clone());
                        train.conflict_reason = Some(reason.clone());
                        train.name.clone()
                    };
                    self.conflicts_raised += 1;
                    events.push(self.log_event(
                        EventCategory::Conflict,
                        format!(
                            "CONFLICT: {name} is waiting at {start} for a free track to {end}. {reason}"
                        ),
                    ));
                }
            }
        }
    }

    // ─── Shared helpers ──────────────────────────────────────────────────────

    pub(crate) fn log_event(
        &mut self,
        category: EventCategory,
        message: impl Into<String>,
    ) -> Event {
        let event = Event::new(self.time, category, message);
        self.log.push(event.clone());
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
        event
    }

    pub(crate) fn release_occupancy(&mut self, track_id: &str, train_id: &str) {
        if let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) {
            track.occupied_by.retain(|id| id != train_id);
        }
    }

    pub(crate) fn node_display_name(&self, node_id: &str) -> String {
        self.nodes
            .iter()
            .find(|n| n.id == node_id)
            .map(|n| n.display_name().to_string())
            .unwrap_or_else(|| node_id.to_string())
    }

    // ─── Read-only accessors ─────────────────────────────────────────────────

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn tracks(&self) -> &[TrackSegment] {
        &self.tracks
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn log(&self) -> &[Event] {
        &self.log
    }

    pub fn find_train(&self, train_id: &str) -> Option<&Train> {
        self.trains.iter().find(|t| t.id == train_id)
    }

    pub fn find_track(&self, track_id: &str) -> Option<&TrackSegment> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats {
            trains_active: self.trains.len() as u32,
            arrivals_completed: self.arrivals_completed,
            conflicts_raised: self.conflicts_raised,
            conflicts_resolved: self.conflicts_resolved,
            ..NetworkStats::default()
        };
        for train in &self.trains {
            match train.status {
                TrainStatus::Moving => stats.trains_moving += 1,
                TrainStatus::Waiting => stats.trains_waiting += 1,
                TrainStatus::Stopped => {}
            }
            if train.is_conflicted {
                stats.trains_conflicted += 1;
            }
            stats.total_wait_time += train.wait_time;
        }
        stats
    }
}
