// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard") - Layout Descriptors

use serde::{Deserialize, Serialize};

use crate::types::{Node, Point, TrainKind};

/// Fallback when a segment references a node the descriptor forgot to
/// declare. The train on it still behaves sanely (length stays positive).
pub const DEFAULT_SEGMENT_LENGTH: f64 = 100.0;

// ─── Descriptor types ────────────────────────────────────────────────────────

/// Declared track segment. `length` overrides the straight-line derivation
/// for curved lines whose physical length exceeds the node distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSpec {
    pub id: String,
    pub start_node: String,
    pub end_node: String,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub conflicts_with: Option<String>,
}

/// Train present at simulation start. Spawns Waiting with the given
/// pre-entry progress (slightly negative staggers entry requests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSpec {
    pub id: String,
    pub name: String,
    pub kind: TrainKind,
    pub path: Vec<String>,
    pub speed: f64,
    #[serde(default = "default_entry_progress")]
    pub initial_progress: f64,
}

fn default_entry_progress() -> f64 {
    -0.01
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPreset {
    pub name: String,
    pub path: Vec<String>,
}

/// Complete topology descriptor: loaded once at construction or swapped in
/// wholesale by a reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub nodes: Vec<Node>,
    pub tracks: Vec<TrackSpec>,
    pub initial_trains: Vec<TrainSpec>,
    #[serde(default)]
    pub preset_paths: Vec<PathPreset>,
}

impl Layout {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Segment length: declared override, else straight-line node distance,
    /// else the fallback for dangling node references.
    pub fn segment_length(&self, spec: &TrackSpec) -> f64 {
        if let Some(len) = spec.length {
            return len;
        }
        let start = self.nodes.iter().find(|n| n.id == spec.start_node);
        let end = self.nodes.iter().find(|n| n.id == spec.end_node);
        match (start, end) {
            (Some(s), Some(e)) => s.position.distance_to(&e.position),
            _ => DEFAULT_SEGMENT_LENGTH,
        }
    }
}

// ─── Construction helpers ────────────────────────────────────────────────────

fn station(id: &str, name: &str, x: f64, y: f64) -> Node {
    Node { id: id.into(), name: Some(name.into()), position: Point { x, y } }
}

fn junction(id: &str, x: f64, y: f64) -> Node {
    Node { id: id.into(), name: None, position: Point { x, y } }
}

fn track(id: &str, start: &str, end: &str) -> TrackSpec {
    TrackSpec {
        id: id.into(),
        start_node: start.into(),
        end_node: end.into(),
        length: None,
        conflicts_with: None,
    }
}

/// One member of a single-track line pair.
fn single_track(id: &str, start: &str, end: &str, partner: &str) -> TrackSpec {
    TrackSpec {
        id: id.into(),
        start_node: start.into(),
        end_node: end.into(),
        length: None,
        conflicts_with: Some(partner.into()),
    }
}

fn train(
    id: &str,
    name: &str,
    kind: TrainKind,
    path: &[&str],
    speed: f64,
    initial_progress: f64,
) -> TrainSpec {
    TrainSpec {
        id: id.into(),
        name: name.into(),
        kind,
        path: path.iter().map(|s| s.to_string()).collect(),
        speed,
        initial_progress,
    }
}

fn preset(name: &str, path: &[&str]) -> PathPreset {
    PathPreset {
        name: name.into(),
        path: path.iter().map(|s| s.to_string()).collect(),
    }
}

// ─── Built-in layouts ────────────────────────────────────────────────────────

/// Suburban network with two parallel tracks per direction on every link,
/// so same-direction trains exercise the following rule.
pub fn mumbai() -> Layout {
    Layout {
        name: "Mumbai Rail Network".into(),
        nodes: vec![
            station("CSMT", "CSMT", 50.0, 150.0),
            station("PNVL", "Panvel", 50.0, 250.0),
            station("DDR", "Dadar", 400.0, 200.0),
            station("TNA", "Thane", 750.0, 150.0),
            station("KYN", "Kalyan", 750.0, 250.0),
        ],
        tracks: vec![
            track("T_CSMT_DDR_1", "CSMT", "DDR"),
            track("T_DDR_CSMT_1", "DDR", "CSMT"),
            track("T_CSMT_DDR_2", "CSMT", "DDR"),
            track("T_DDR_CSMT_2", "DDR", "CSMT"),
            track("T_PNVL_DDR_1", "PNVL", "DDR"),
            track("T_DDR_PNVL_1", "DDR", "PNVL"),
            track("T_PNVL_DDR_2", "PNVL", "DDR"),
            track("T_DDR_PNVL_2", "DDR", "PNVL"),
            track("T_DDR_TNA_1", "DDR", "TNA"),
            track("T_TNA_DDR_1", "TNA", "DDR"),
            track("T_DDR_TNA_2", "DDR", "TNA"),
            track("T_TNA_DDR_2", "TNA", "DDR"),
            track("T_DDR_KYN_1", "DDR", "KYN"),
            track("T_KYN_DDR_1", "KYN", "DDR"),
            track("T_DDR_KYN_2", "DDR", "KYN"),
            track("T_KYN_DDR_2", "KYN", "DDR"),
        ],
        initial_trains: vec![
            train("T1-LO", "CSMT-Thane Local", TrainKind::Local, &["CSMT", "DDR", "TNA"], 30.0, -0.01),
            train("T2-FR", "Kalyan-Panvel Freight", TrainKind::Freight, &["KYN", "DDR", "PNVL"], 20.0, -0.1),
            train("T3-EX", "Thane-CSMT Express", TrainKind::Express, &["TNA", "DDR", "CSMT"], 40.0, -0.2),
            train("T4-SH", "Panvel-Kalyan Shatabdi", TrainKind::Shatabdi, &["PNVL", "DDR", "KYN"], 45.0, -0.3),
        ],
        preset_paths: vec![
            preset("CSMT -> Thane", &["CSMT", "DDR", "TNA"]),
            preset("Thane -> CSMT", &["TNA", "DDR", "CSMT"]),
            preset("CSMT -> Kalyan", &["CSMT", "DDR", "KYN"]),
            preset("Kalyan -> CSMT", &["KYN", "DDR", "CSMT"]),
            preset("Panvel -> Thane", &["PNVL", "DDR", "TNA"]),
            preset("Thane -> Panvel", &["TNA", "DDR", "PNVL"]),
            preset("Panvel -> Kalyan", &["PNVL", "DDR", "KYN"]),
            preset("Kalyan -> Panvel", &["KYN", "DDR", "PNVL"]),
        ],
    }
}

/// Two stations, two forward tracks, four trains all wanting A -> B at once.
/// The smallest layout that forces priority resolution every run.
pub fn conflict_demo() -> Layout {
    Layout {
        name: "Conflict Demo".into(),
        nodes: vec![
            station("A", "Station A", 100.0, 200.0),
            station("B", "Station B", 700.0, 200.0),
        ],
        tracks: vec![
            track("T_A_B_1", "A", "B"),
            track("T_A_B_2", "A", "B"),
            track("T_B_A_1", "B", "A"),
        ],
        initial_trains: vec![
            train("T1-SH", "Superfast Exp", TrainKind::Shatabdi, &["A", "B"], 40.0, -0.01),
            train("T2-EX", "Capital Exp", TrainKind::Express, &["A", "B"], 35.0, -0.1),
            train("T3-FR", "Goods Carrier", TrainKind::Freight, &["A", "B"], 20.0, -0.2),
            train("T4-LO", "City Local", TrainKind::Local, &["A", "B"], 25.0, -0.3),
        ],
        preset_paths: vec![
            preset("Station A -> Station B", &["A", "B"]),
            preset("Station B -> Station A", &["B", "A"]),
        ],
    }
}

/// Corridor with single-track lines on the outer spurs (mutual-exclusion
/// pairs) and double track through the central junctions.
pub fn delhi_corridor() -> Layout {
    Layout {
        name: "Delhi-Ghaziabad Corridor".into(),
        nodes: vec![
            station("NDLS", "New Delhi", 150.0, 200.0),
            station("GZB", "Ghaziabad", 650.0, 200.0),
            station("ANVT", "Anand Vihar", 400.0, 50.0),
            station("YARD", "Freight Yard", 400.0, 350.0),
            station("SBB", "Sahibabad", 750.0, 100.0),
            station("OKA", "Okhla", 50.0, 300.0),
            junction("J_W", 250.0, 200.0),
            junction("J_C", 400.0, 200.0),
            junction("J_E", 550.0, 200.0),
        ],
        tracks: vec![
            single_track("T_OKA_JW", "OKA", "J_W", "T_JW_OKA_rev"),
            single_track("T_JW_OKA_rev", "J_W", "OKA", "T_OKA_JW"),
            single_track("T_JW_NDLS", "J_W", "NDLS", "T_NDLS_JW_rev"),
            single_track("T_NDLS_JW_rev", "NDLS", "J_W", "T_JW_NDLS"),
            track("T_JW_JC_1", "J_W", "J_C"),
            track("T_JC_JW_1", "J_C", "J_W"),
            track("T_JW_JC_2", "J_W", "J_C"),
            track("T_JC_JW_2", "J_C", "J_W"),
            track("T_JC_JE_1", "J_C", "J_E"),
            track("T_JE_JC_1", "J_E", "J_C"),
            single_track("T_ANVT_JC", "ANVT", "J_C", "T_JC_ANVT_rev"),
            single_track("T_JC_ANVT_rev", "J_C", "ANVT", "T_ANVT_JC"),
            single_track("T_YARD_JC", "YARD", "J_C", "T_JC_YARD_rev"),
            single_track("T_JC_YARD_rev", "J_C", "YARD", "T_YARD_JC"),
            single_track("T_JE_GZB", "J_E", "GZB", "T_GZB_JE_rev"),
            single_track("T_GZB_JE_rev", "GZB", "J_E", "T_JE_GZB"),
            single_track("T_JE_SBB", "J_E", "SBB", "T_SBB_JE_rev"),
            single_track("T_SBB_JE_rev", "SBB", "J_E", "T_JE_SBB"),
        ],
        initial_trains: vec![
            train("train-shatabdi-01", "NDLS-GZB Shatabdi", TrainKind::Shatabdi, &["NDLS", "J_W", "J_C", "J_E", "GZB"], 40.0, -0.01),
            train("train-local-01", "GZB-NDLS Local", TrainKind::Local, &["GZB", "J_E", "J_C", "J_W", "NDLS"], 25.0, -0.2),
            train("train-freight-01", "Goods to GZB", TrainKind::Freight, &["YARD", "J_C", "J_E", "GZB"], 20.0, -0.8),
            train("train-express-01", "ANVT-NDLS Exp", TrainKind::Express, &["ANVT", "J_C", "J_W", "NDLS"], 35.0, -0.5),
            train("train-local-02", "SBB-OKA Local", TrainKind::Local, &["SBB", "J_E", "J_C", "J_W", "OKA"], 25.0, -1.5),
        ],
        preset_paths: vec![
            preset("New Delhi -> Ghaziabad", &["NDLS", "J_W", "J_C", "J_E", "GZB"]),
            preset("Ghaziabad -> New Delhi", &["GZB", "J_E", "J_C", "J_W", "NDLS"]),
            preset("Anand Vihar -> Ghaziabad", &["ANVT", "J_C", "J_E", "GZB"]),
            preset("Anand Vihar -> New Delhi", &["ANVT", "J_C", "J_W", "NDLS"]),
            preset("Freight Yard -> Sahibabad", &["YARD", "J_C", "J_E", "SBB"]),
            preset("New Delhi -> Anand Vihar", &["NDLS", "J_W", "J_C", "ANVT"]),
            preset("Okhla -> Ghaziabad", &["OKA", "J_W", "J_C", "J_E", "GZB"]),
            preset("Sahibabad -> New Delhi", &["SBB", "J_E", "J_C", "J_W", "NDLS"]),
        ],
    }
}

/// All built-in layouts, index order is the constructor's selector order.
pub fn builtin_layouts() -> Vec<Layout> {
    vec![mumbai(), conflict_demo(), delhi_corridor()]
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_length_from_positions() {
        let layout = conflict_demo();
        let spec = &layout.tracks[0];
        assert!((layout.segment_length(spec) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn declared_length_overrides_derivation() {
        let mut layout = conflict_demo();
        layout.tracks[0].length = Some(875.0);
        assert_eq!(layout.segment_length(&layout.tracks[0]), 875.0);
    }

    #[test]
    fn dangling_node_reference_falls_back() {
        let layout = conflict_demo();
        let spec = TrackSpec {
            id: "T_A_ZZ".into(),
            start_node: "A".into(),
            end_node: "ZZ".into(),
            length: None,
            conflicts_with: None,
        };
        assert_eq!(layout.segment_length(&spec), DEFAULT_SEGMENT_LENGTH);
    }

    #[test]
    fn single_line_pairs_are_symmetric() {
        let layout = delhi_corridor();
        for spec in &layout.tracks {
            if let Some(partner_id) = &spec.conflicts_with {
                let partner = layout
                    .tracks
                    .iter()
                    .find(|t| &t.id == partner_id)
                    .expect("partner declared");
                assert_eq!(partner.conflicts_with.as_deref(), Some(spec.id.as_str()));
                assert_eq!(partner.start_node, spec.end_node);
                assert_eq!(partner.end_node, spec.start_node);
            }
        }
    }

    #[test]
    fn layout_round_trips_through_json() {
        let layout = mumbai();
        let json = serde_json::to_string(&layout).unwrap();
        let back = Layout::from_json(&json).unwrap();
        assert_eq!(back.name, layout.name);
        assert_eq!(back.tracks.len(), layout.tracks.len());
        assert_eq!(back.initial_trains.len(), layout.initial_trains.len());
    }
}
