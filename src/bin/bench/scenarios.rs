// Benchmark scenarios: each drives one built-in layout for a fixed number of
// ticks, injecting extra random traffic from the layout's preset paths so
// contention scales past the seeded trains.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use railgrid_engine::layout::{builtin_layouts, Layout};
use railgrid_engine::{NetworkStats, RailSimulation, TrainKind};

const KINDS: [TrainKind; 4] = [
    TrainKind::Shatabdi,
    TrainKind::Express,
    TrainKind::Freight,
    TrainKind::Local,
];

pub struct Scenario {
    pub name: &'static str,
    pub layout_index: usize,
    /// Extra trains injected on top of the layout's seeded roster.
    pub extra_trains: usize,
    pub ticks: u32,
    /// Wall-clock delta fed to every tick (multiplier stays 1.0).
    pub wall_delta: f64,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "mumbai_baseline",
            layout_index: 0,
            extra_trains: 0,
            ticks: 2_000,
            wall_delta: 0.1,
        },
        Scenario {
            name: "mumbai_rush_hour",
            layout_index: 0,
            extra_trains: 12,
            ticks: 4_000,
            wall_delta: 0.1,
        },
        Scenario {
            name: "conflict_storm",
            layout_index: 1,
            extra_trains: 8,
            ticks: 3_000,
            wall_delta: 0.1,
        },
        Scenario {
            name: "single_line_corridor",
            layout_index: 2,
            extra_trains: 6,
            ticks: 5_000,
            wall_delta: 0.1,
        },
    ]
}

/// Run one scenario to completion and return the final aggregate counters.
pub fn run_scenario(scenario: &Scenario, seed: u64) -> NetworkStats {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let layouts = builtin_layouts();
    let layout = layouts[scenario.layout_index].clone();
    let presets = layout.preset_paths.clone();
    let mut sim = RailSimulation::from_layout(layout);
    sim.play();

    // Injection ticks spread over the first half of the run so the extra
    // traffic arrives as a staggered stream, not a single burst.
    let mut injection_ticks: Vec<u32> = (0..scenario.extra_trains)
        .map(|_| rng.gen_range(0..scenario.ticks / 2))
        .collect();
    injection_ticks.sort_unstable();

    let mut injected = 0;
    for tick in 0..scenario.ticks {
        while injected < injection_ticks.len() && injection_ticks[injected] <= tick {
            inject_train(&mut sim, &presets, &mut rng, injected);
            injected += 1;
        }
        sim.tick_core(scenario.wall_delta);
    }

    sim.stats()
}

fn inject_train(
    sim: &mut RailSimulation,
    presets: &[railgrid_engine::layout::PathPreset],
    rng: &mut ChaCha8Rng,
    ordinal: usize,
) {
    if presets.is_empty() {
        return;
    }
    let preset = &presets[rng.gen_range(0..presets.len())];
    let kind = KINDS[rng.gen_range(0..KINDS.len())];
    let name = format!("Bench {} {}", kind.label(), ordinal + 1);
    // Default per-kind speed; a rejected spawn only logs, which is fine here.
    let _ = sim.add_train(&name, kind, preset.path.clone(), None);
}

pub fn layout_name(index: usize) -> String {
    builtin_layouts()
        .get(index)
        .map(|l: &Layout| l.name.clone())
        .unwrap_or_default()
}
