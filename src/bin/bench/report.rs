// Plain-text aggregate report for a batch of scenario runs.

use std::time::Duration;

use railgrid_engine::NetworkStats;

use crate::scenarios::{layout_name, Scenario};

pub fn print_header(runs: usize, seed: u64) {
    println!("Railgrid bench — {} run(s) per scenario, base seed {}", runs, seed);
    println!("{}", "=".repeat(72));
}

pub fn print_scenario(scenario: &Scenario, results: &[NetworkStats], elapsed: Duration) {
    let n = results.len().max(1) as f64;

    let mean = |f: fn(&NetworkStats) -> f64| results.iter().map(f).sum::<f64>() / n;

    let arrivals = mean(|s| s.arrivals_completed as f64);
    let raised = mean(|s| s.conflicts_raised as f64);
    let resolved = mean(|s| s.conflicts_resolved as f64);
    let active = mean(|s| s.trains_active as f64);
    let waiting = mean(|s| s.trains_waiting as f64);
    let wait_time = mean(|s| s.total_wait_time);

    println!();
    println!(
        "{}  ({}, {} ticks, +{} extra trains)",
        scenario.name,
        layout_name(scenario.layout_index),
        scenario.ticks,
        scenario.extra_trains,
    );
    println!("  arrivals completed   {:>8.1}", arrivals);
    println!("  conflicts raised     {:>8.1}", raised);
    println!("  conflicts resolved   {:>8.1}", resolved);
    println!("  trains still active  {:>8.1}  ({:.1} waiting)", active, waiting);
    println!("  total wait time      {:>8.1}s (live trains)", wait_time);
    println!("  wall time            {:>8.2?}", elapsed);
}
