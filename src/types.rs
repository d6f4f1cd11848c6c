// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Train Kind ──────────────────────────────────────────────────────────────

/// Service class of a train. Priority and default speed derive from it and
/// never change after creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrainKind {
    Shatabdi,
    Express,
    Freight,
    Local,
}

impl TrainKind {
    /// Resolution rank used when contending trains request the same segment.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Shatabdi => 3,
            Self::Express => 3,
            Self::Freight => 2,
            Self::Local => 1,
        }
    }

    /// Default cruising speed (distance units per simulated second), used by
    /// the spawn command when the caller does not supply one.
    pub fn default_speed(&self) -> f64 {
        match self {
            Self::Shatabdi => 45.0,
            Self::Express => 35.0,
            Self::Freight => 20.0,
            Self::Local => 25.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Shatabdi => "Shatabdi",
            Self::Express => "Express",
            Self::Freight => "Freight",
            Self::Local => "Local",
        }
    }
}

// ─── Train Status ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrainStatus {
    /// Holding a segment and integrating progress along it.
    Moving,
    /// At a node, requesting the next segment (never holds a segment).
    Waiting,
    /// Reached its final destination; lingers on the segment until removal.
    Stopped,
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Node coordinates. Only ever used to derive straight-line track lengths;
/// scheduling never reads positions directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// ─── Node ────────────────────────────────────────────────────────────────────

/// Topology vertex. A node carrying a display name is a station; unnamed
/// nodes are plain junctions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Point,
}

impl Node {
    /// Station name if present, otherwise the raw node id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

// ─── Track Segment ───────────────────────────────────────────────────────────

/// Directed capacity-bearing edge between two nodes.
///
/// `occupied_by` is a FIFO of train ids in grant order; the last element is
/// the most recently granted occupant (the leader for following checks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: String,
    pub start_node: String,
    pub end_node: String,
    pub length: f64,
    pub occupied_by: Vec<String>,
    /// Paired opposite-direction segment sharing one physical single-track
    /// line. At most one of the pair may be occupied at any instant, and no
    /// following is permitted on either member.
    #[serde(default)]
    pub conflicts_with: Option<String>,
}

impl TrackSegment {
    pub fn is_free(&self) -> bool {
        self.occupied_by.is_empty()
    }

    /// Most recently granted occupant, if any.
    pub fn leader(&self) -> Option<&str> {
        self.occupied_by.last().map(String::as_str)
    }
}

// ─── Train ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    pub id: String,
    pub name: String,
    pub kind: TrainKind,
    pub priority: u8,
    /// Ordered node ids of the route, length >= 2.
    pub path: Vec<String>,
    /// Index of the node at the start of the next segment to traverse.
    pub path_index: usize,
    /// Held segment id; `None` exactly when the train sits at a node.
    pub current_track_id: Option<String>,
    /// Negative before first entry, otherwise 0..=1 along the held segment.
    pub progress: f64,
    /// Distance units per simulated second.
    pub speed: f64,
    pub status: TrainStatus,
    /// Cumulative simulated seconds spent in `Waiting`.
    pub wait_time: f64,
    /// Simulated time at which a `Stopped` train leaves the registry.
    #[serde(default)]
    pub disappear_at: Option<f64>,
    /// Edge-trigger guard so each conflict is reported exactly once.
    #[serde(default)]
    pub is_conflicted: bool,
    /// Candidate segment ids the train is waiting on while conflicted.
    #[serde(default)]
    pub conflicting_track_ids: Option<Vec<String>>,
    /// Diagnostic retained verbatim until the conflict resolves.
    #[serde(default)]
    pub conflict_reason: Option<String>,
    /// Spawn sequence, the explicit secondary ordering key for
    /// equal-priority contention.
    #[serde(default)]
    pub seq: u64,
}

impl Train {
    /// Whether the segment ending at `path[path_index + 1]` is the last leg
    /// of the route.
    pub fn on_final_leg(&self) -> bool {
        self.path_index + 2 >= self.path.len()
    }

    /// Origin node of the next requested segment, if the route has one left.
    pub fn next_origin(&self) -> Option<&str> {
        if self.path_index + 1 < self.path.len() {
            self.path.get(self.path_index).map(String::as_str)
        } else {
            None
        }
    }

    /// Destination node of the next requested segment.
    pub fn next_destination(&self) -> Option<&str> {
        if self.path_index + 1 < self.path.len() {
            self.path.get(self.path_index + 1).map(String::as_str)
        } else {
            None
        }
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventCategory {
    /// Final-destination arrival.
    Arrival,
    /// Intermediate waypoint reached, segment released.
    JunctionArrival,
    /// A train was newly refused every candidate segment.
    Conflict,
    /// A previously conflicted train was granted a segment.
    Resolution,
    Info,
    Error,
}

/// Structured log entry. Consumers branch on `category`; `message` is the
/// rendered human-readable line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub category: EventCategory,
    pub message: String,
}

impl Event {
    pub fn new(time: f64, category: EventCategory, message: impl Into<String>) -> Self {
        Self { time, category, message: message.into() }
    }
}

// ─── TickResult ──────────────────────────────────────────────────────────────

/// Output of one tick: the new simulated time plus the ordered events the
/// tick raised. State snapshots are pulled separately via the getters.
#[derive(Debug, Clone, Serialize)]
pub struct TickResult {
    pub time: f64,
    pub events: Vec<Event>,
}

// ─── NetworkStats ────────────────────────────────────────────────────────────

/// Aggregate counters for dashboards and the bench runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    pub trains_active: u32,
    pub trains_moving: u32,
    pub trains_waiting: u32,
    pub trains_conflicted: u32,
    pub arrivals_completed: u32,
    pub conflicts_raised: u32,
    pub conflicts_resolved: u32,
    pub total_wait_time: f64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_fixed_by_kind() {
        assert_eq!(TrainKind::Shatabdi.priority(), 3);
        assert_eq!(TrainKind::Express.priority(), 3);
        assert_eq!(TrainKind::Freight.priority(), 2);
        assert_eq!(TrainKind::Local.priority(), 1);
    }

    #[test]
    fn leader_is_last_granted() {
        let track = TrackSegment {
            id: "T_A_B".into(),
            start_node: "A".into(),
            end_node: "B".into(),
            length: 100.0,
            occupied_by: vec!["t1".into(), "t2".into()],
            conflicts_with: None,
        };
        assert_eq!(track.leader(), Some("t2"));
        assert!(!track.is_free());
    }

    #[test]
    fn final_leg_detection() {
        let train = Train {
            id: "t".into(),
            name: "T".into(),
            kind: TrainKind::Local,
            priority: 1,
            path: vec!["A".into(), "B".into(), "C".into()],
            path_index: 0,
            current_track_id: None,
            progress: -0.01,
            speed: 25.0,
            status: TrainStatus::Waiting,
            wait_time: 0.0,
            disappear_at: None,
            is_conflicted: false,
            conflicting_track_ids: None,
            conflict_reason: None,
            seq: 0,
        };
        assert!(!train.on_final_leg());
        let mut last = train.clone();
        last.path_index = 1;
        assert!(last.on_final_leg());
        assert_eq!(last.next_origin(), Some("B"));
        assert_eq!(last.next_destination(), Some("C"));
    }
}
