// Railgrid Benchmark Runner — seedable scenario batches over the built-in
// layouts, per-scenario aggregate report.
//
// Usage:
//   cargo run --release --bin bench                  # all scenarios, 10 runs
//   cargo run --release --bin bench -- --runs 3      # quick mode
//   cargo run --release --bin bench -- single_line   # filter by name
//   cargo run --release --bin bench -- --seed 42     # custom base seed

mod report;
mod scenarios;

use std::time::Instant;

use scenarios::{run_scenario, scenarios, Scenario};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs { runs: 10, seed: 0, filter: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(10);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenario matches the filter.");
        return;
    }

    report::print_header(cli.runs, cli.seed);
    for scenario in to_run {
        let start = Instant::now();
        let mut results = Vec::with_capacity(cli.runs);
        for run in 0..cli.runs {
            let seed = cli.seed.wrapping_add(run as u64);
            results.push(run_scenario(scenario, seed));
        }
        report::print_scenario(scenario, &results, start.elapsed());
    }
}
