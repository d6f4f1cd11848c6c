// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Mutation Commands
//
// Every command validates first and applies second: on any validation
// failure the state is left untouched apart from one Error-category log
// entry, and the error is returned to the caller.

use crate::layout::{builtin_layouts, Layout};
use crate::simulation::RailSimulation;
use crate::types::{EventCategory, Train, TrainKind, TrainStatus, Node, Point, TrackSegment};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("start and end nodes cannot be the same")]
    SelfLoopTrack,
    #[error("a track with id \"{0}\" already exists")]
    DuplicateTrack(String),
    #[error("could not find node id \"{0}\"")]
    UnknownNode(String),
    #[error("a node or station with id \"{0}\" already exists")]
    DuplicateNode(String),
    #[error("station id must be 2-4 uppercase letters/numbers")]
    MalformedNodeId,
    #[error("a train path must name at least two nodes")]
    PathTooShort,
    #[error("no train with id \"{0}\"")]
    UnknownTrain(String),
    #[error("no built-in layout at index {0}")]
    UnknownLayout(usize),
}

fn is_valid_node_id(id: &str) -> bool {
    (2..=4).contains(&id.len())
        && id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

// ─── Command implementations ─────────────────────────────────────────────────

impl RailSimulation {
    /// Log the rejection and hand the error back unchanged.
    fn reject(&mut self, err: CommandError) -> CommandError {
        self.log_event(EventCategory::Error, format!("ERROR: {err}."));
        err
    }

    /// Insert a new zero-occupancy segment between two existing nodes.
    ///
    /// The id is derived as `T_<START>_<END>`, with a `_p<N>` suffix when
    /// parallel segments already span the same node pair. Length is the
    /// straight-line distance between the node positions.
    pub fn add_track(&mut self, start: &str, end: &str) -> Result<String, CommandError> {
        if start == end {
            return Err(self.reject(CommandError::SelfLoopTrack));
        }
        let Some(start_pos) = self.nodes.iter().find(|n| n.id == start).map(|n| n.position)
        else {
            return Err(self.reject(CommandError::UnknownNode(start.to_string())));
        };
        let Some(end_pos) = self.nodes.iter().find(|n| n.id == end).map(|n| n.position)
        else {
            return Err(self.reject(CommandError::UnknownNode(end.to_string())));
        };

        let parallel = self
            .tracks
            .iter()
            .filter(|t| t.start_node == start && t.end_node == end)
            .count();
        let suffix = if parallel > 0 { format!("_p{}", parallel + 1) } else { String::new() };
        let track_id = format!("T_{start}_{end}{suffix}");

        if self.tracks.iter().any(|t| t.id == track_id) {
            return Err(self.reject(CommandError::DuplicateTrack(track_id)));
        }

        self.tracks.push(TrackSegment {
            id: track_id.clone(),
            start_node: start.to_string(),
            end_node: end.to_string(),
            length: start_pos.distance_to(&end_pos),
            occupied_by: Vec::new(),
            conflicts_with: None,
        });
        self.log_event(
            EventCategory::Info,
            format!("Added new track {track_id} between {start} and {end}."),
        );
        Ok(track_id)
    }

    /// Insert a named station node. Ids are uppercased and must be 2-4
    /// alphanumeric uppercase characters.
    pub fn add_station(
        &mut self,
        id: &str,
        name: &str,
        x: f64,
        y: f64,
    ) -> Result<(), CommandError> {
        let id = id.to_ascii_uppercase();
        if self.nodes.iter().any(|n| n.id == id) {
            return Err(self.reject(CommandError::DuplicateNode(id)));
        }
        if !is_valid_node_id(&id) {
            return Err(self.reject(CommandError::MalformedNodeId));
        }
        self.nodes.push(Node {
            id: id.clone(),
            name: Some(name.to_string()),
            position: Point { x, y },
        });
        self.log_event(
            EventCategory::Info,
            format!("Added new station: \"{name}\" ({id})."),
        );
        Ok(())
    }

    /// Spawn a train in Waiting status with slightly negative progress so it
    /// requests its first segment on the next tick. Priority comes from the
    /// kind; a non-positive `speed` selects the kind's default. Routes naming
    /// unknown nodes are accepted and simply never find a grantable segment.
    pub fn add_train(
        &mut self,
        name: &str,
        kind: TrainKind,
        path: Vec<String>,
        speed: Option<f64>,
    ) -> Result<String, CommandError> {
        if path.len() < 2 {
            return Err(self.reject(CommandError::PathTooShort));
        }

        let speed = speed.filter(|s| *s > 0.0).unwrap_or_else(|| {
            self.layout
                .initial_trains
                .iter()
                .find(|t| t.kind == kind)
                .map(|t| t.speed)
                .unwrap_or_else(|| kind.default_speed())
        });

        let seq = self.spawn_counter;
        self.spawn_counter += 1;
        let train_id = format!("train-{}-{seq}", kind.label().to_ascii_lowercase());
        let name = if name.is_empty() {
            format!("{} Special", kind.label())
        } else {
            name.to_string()
        };

        self.trains.push(Train {
            id: train_id.clone(),
            name: name.clone(),
            kind,
            priority: kind.priority(),
            path,
            path_index: 0,
            current_track_id: None,
            progress: -0.01,
            speed,
            status: TrainStatus::Waiting,
            wait_time: 0.0,
            disappear_at: None,
            is_conflicted: false,
            conflicting_track_ids: None,
            conflict_reason: None,
            seq,
        });
        self.log_event(
            EventCategory::Info,
            format!("New train \"{name}\" queued for entry."),
        );
        Ok(train_id)
    }

    /// Remove a train, releasing any segment it holds.
    pub fn remove_train(&mut self, train_id: &str) -> Result<(), CommandError> {
        let Some(train) = self.trains.iter().find(|t| t.id == train_id) else {
            return Err(self.reject(CommandError::UnknownTrain(train_id.to_string())));
        };
        let name = train.name.clone();
        let held = train.current_track_id.clone();
        if let Some(track_id) = held {
            self.release_occupancy(&track_id, train_id);
        }
        self.trains.retain(|t| t.id != train_id);
        self.log_event(EventCategory::Info, format!("Train \"{name}\" was removed."));
        Ok(())
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        self.speed_multiplier = multiplier.max(0.0);
    }

    pub fn play(&mut self) {
        self.running = true;
        self.log_event(EventCategory::Info, "Simulation started.");
    }

    pub fn pause(&mut self) {
        self.running = false;
        self.log_event(EventCategory::Info, "Simulation paused.");
    }

    /// Halt everything at once by clearing the run flag; the paused tick
    /// driver keeps every train frozen in place and play resumes losslessly.
    pub fn emergency_stop(&mut self) {
        self.running = false;
        self.log_event(
            EventCategory::Info,
            "EMERGENCY STOP ACTIVATED. All trains halted.",
        );
    }

    /// Reinitialize the full state from the layout this simulation was
    /// built from.
    pub fn reset(&mut self) {
        *self = Self::from_layout(self.layout.clone());
    }

    /// Replace the entire state with a fresh one built from `layout`.
    pub fn load_layout(&mut self, layout: Layout) {
        *self = Self::from_layout(layout);
    }

    pub fn load_builtin(&mut self, index: usize) -> Result<(), CommandError> {
        let mut layouts = builtin_layouts();
        if index >= layouts.len() {
            return Err(self.reject(CommandError::UnknownLayout(index)));
        }
        self.load_layout(layouts.swap_remove(index));
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
