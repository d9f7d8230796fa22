//! Enhancement forecast CLI.
//!
//! Runs an autoplay strategy many times and reports what reaching the target
//! tends to cost.
//!
//! Usage:
//!   cargo run --bin forecast -- --weapon NAME [OPTIONS]
//!
//! Examples:
//!   cargo run --bin forecast -- -w "Moonblade"                  # 1000 runs to max level
//!   cargo run --bin forecast -- -w "Moonblade" -t 7 -n 200      # 200 runs to +7
//!   cargo run --bin forecast -- -w "Moonblade" --protect-reset all --seed 42

use armory::config::ArmoryConfig;
use armory::data::load_catalog;
use armory::enhancement::{LevelSelection, StrategyBuilder};
use armory::simulator::{run_forecast, ForecastConfig};
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Args {
    data_dir: Option<PathBuf>,
    weapon: Option<String>,
    target: Option<u32>,
    guaranteed: LevelSelection,
    protect_downgrade: LevelSelection,
    protect_reset: LevelSelection,
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().collect();
    let (mut config, args) = parse_args(&raw);

    let mut armory_config = ArmoryConfig::load();
    if let Some(dir) = args.data_dir.clone() {
        armory_config.data_dir = dir;
    }
    let catalog = match load_catalog(&armory_config.data_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let Some(name) = args.weapon.as_deref() else {
        eprintln!("Error: no weapon given (use --weapon NAME)");
        process::exit(2);
    };
    let Some(family) = armory_config.selection.find(&catalog.families, name) else {
        eprintln!("Error: unknown or unavailable weapon '{}'", name);
        process::exit(2);
    };

    let mut builder = StrategyBuilder::new(&catalog.tables, family.grade());
    if let Some(target) = args.target {
        builder = builder.target(target);
    }
    config.strategy = builder
        .guaranteed(&args.guaranteed)
        .downgrade_protection(&args.protect_downgrade)
        .reset_protection(&args.protect_reset)
        .build();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              ENHANCEMENT FORECAST                             ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Weapon:         {} [{}]", family.name(), family.grade());
    println!("  Runs:           {}", config.num_runs);
    println!("  Target:         +{}", config.strategy.target_level);
    println!("  Max Steps:      {}", config.max_steps_per_run);
    println!("  Guaranteed at:  {}", level_list(&config.strategy.guaranteed_levels));
    println!(
        "  Downgrade prot: {}",
        level_list(&config.strategy.downgrade_protect_levels)
    );
    println!("  Reset prot:     {}", level_list(&config.strategy.reset_protect_levels));
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running forecast...");
    println!();

    let report = run_forecast(&config, Arc::new(catalog.tables.clone()), family);

    println!("{}", report.to_text());

    if args.json {
        let json = report.to_json();
        let filename = format!(
            "forecast_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        if let Err(e) = std::fs::write(&filename, json) {
            eprintln!("Failed to write JSON report: {}", e);
            process::exit(1);
        }
        println!("JSON report saved to: {}", filename);
    }
}

fn level_list(levels: &std::collections::BTreeSet<u32>) -> String {
    if levels.is_empty() {
        return "-".to_string();
    }
    levels
        .iter()
        .map(|l| format!("+{}", l))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_levels(raw: &str) -> LevelSelection {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid level list: {} (expected e.g. 3,4,5 or all)", raw);
        process::exit(2);
    })
}

fn parse_args(args: &[String]) -> (ForecastConfig, Args) {
    let mut config = ForecastConfig::default();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(1000);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--max-steps" => {
                if i + 1 < args.len() {
                    config.max_steps_per_run = args[i + 1].parse().unwrap_or(100_000);
                    i += 1;
                }
            }
            "-d" | "--data" => {
                if i + 1 < args.len() {
                    parsed.data_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-w" | "--weapon" => {
                if i + 1 < args.len() {
                    parsed.weapon = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-t" | "--target" => {
                if i + 1 < args.len() {
                    parsed.target = args[i + 1].trim_start_matches('+').parse().ok();
                    i += 1;
                }
            }
            "-g" | "--guaranteed" => {
                if i + 1 < args.len() {
                    parsed.guaranteed = parse_levels(&args[i + 1]);
                    i += 1;
                }
            }
            "--protect-downgrade" => {
                if i + 1 < args.len() {
                    parsed.protect_downgrade = parse_levels(&args[i + 1]);
                    i += 1;
                }
            }
            "--protect-reset" => {
                if i + 1 < args.len() {
                    parsed.protect_reset = parse_levels(&args[i + 1]);
                    i += 1;
                }
            }
            "--json" => {
                parsed.json = true;
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    (config, parsed)
}

fn print_help() {
    println!("Enhancement Forecast");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin forecast -- --weapon NAME [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -w, --weapon <NAME>          Weapon to forecast");
    println!("    -d, --data <DIR>             Data directory (default: from config, else ./data)");
    println!("    -n, --runs <N>               Number of runs (default: 1000)");
    println!("    -t, --target <LEVEL>         Target level (default: highest available)");
    println!("    -s, --seed <S>               Random seed for reproducibility");
    println!("        --max-steps <N>          Steps per run before giving up (default: 100000)");
    println!("    -g, --guaranteed <LEVELS>    Take the guaranteed path at LEVELS (e.g. 1,2,3 or all)");
    println!("        --protect-downgrade <LEVELS>");
    println!("        --protect-reset <LEVELS>");
    println!("        --json                   Save the report as JSON");
    println!("    -v, --verbose                Log every run");
    println!("    -h, --help                   Print help");
}
