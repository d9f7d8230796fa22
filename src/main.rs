use armory::config::ArmoryConfig;
use armory::data::{load_catalog, Catalog};
use armory::enhancement::{
    AutoplayState, AutoplayStrategy, JsonFileStore, LevelSelection, Material, OutcomeClass,
    StepOutcome, StrategyBuilder,
};
use armory::session::Session;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
struct Args {
    data_dir: Option<PathBuf>,
    weapon: Option<String>,
    target: Option<u32>,
    guaranteed: LevelSelection,
    protect_downgrade: LevelSelection,
    protect_reset: LevelSelection,
    seed: Option<u64>,
    delay_ms: Option<u64>,
    list: bool,
    reset_logs: bool,
    yes: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().collect();
    let args = parse_args(&raw);

    let mut config = ArmoryConfig::load();
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(ms) = args.delay_ms {
        config.step_delay_ms = ms;
    }

    let catalog = match load_catalog(&config.data_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if args.list {
        print_weapons(&catalog, &config);
        return;
    }

    let store = match &config.store_dir {
        Some(dir) => JsonFileStore::new(dir),
        None => match JsonFileStore::in_home() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
    };
    let tables = Arc::new(catalog.tables.clone());
    let mut session =
        Session::new(tables, Box::new(store)).with_step_delay(config.step_delay());

    if args.reset_logs {
        let yes = args.yes;
        if session.reset_logs(|prompt| yes || confirm(prompt)) {
            println!("Enhancement records cleared.");
        }
        if args.weapon.is_none() {
            return;
        }
    }

    let Some(name) = args.weapon.as_deref() else {
        eprintln!("Error: no weapon given (use --weapon NAME, or --list)");
        process::exit(2);
    };
    let Some(family) = config.selection.find(&catalog.families, name).cloned() else {
        eprintln!("Error: unknown or unavailable weapon '{}'", name);
        process::exit(2);
    };

    let strategy = build_strategy(&args, &session, family.grade());
    println!(
        "{} [{}] +0 → +{} (max +{})",
        family.name(),
        family.grade(),
        strategy.target_level,
        session.tables().max_level(family.grade())
    );
    session.select_weapon(family);

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    if !session.start_autoplay(strategy, Instant::now()) {
        for notice in session.take_notices() {
            eprintln!("{}", notice);
        }
        process::exit(1);
    }

    while session.autoplay().state() == AutoplayState::Running {
        if let Some(next) = session.autoplay().next_step_at() {
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            }
        }
        if let Some(StepOutcome::Attempted(result)) = session.tick(Instant::now(), &mut rng) {
            println!("  {} {}", marker(result.outcome.class()), result.message());
        }
    }

    for notice in session.take_notices() {
        println!("! {}", notice);
    }
    print_summary(&session);
}

fn build_strategy(args: &Args, session: &Session, grade: &str) -> AutoplayStrategy {
    let mut builder = StrategyBuilder::new(session.tables(), grade);
    if let Some(target) = args.target {
        builder = builder.target(target);
    }
    builder
        .guaranteed(&args.guaranteed)
        .downgrade_protection(&args.protect_downgrade)
        .reset_protection(&args.protect_reset)
        .build()
}

/// Line prefix per history style.
fn marker(class: OutcomeClass) -> &'static str {
    match class {
        OutcomeClass::Success => "+",
        OutcomeClass::Failure => "·",
        OutcomeClass::Downgrade => "-",
        OutcomeClass::Reset => "!",
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_weapons(catalog: &Catalog, config: &ArmoryConfig) {
    for family in config.selection.select(&catalog.families) {
        println!(
            "{:<24} {:<12} max +{}",
            family.name(),
            family.grade(),
            catalog.tables.max_level(family.grade())
        );
    }
}

fn print_summary(session: &Session) {
    println!();
    println!("Final level: +{}", session.level());
    println!("Spent so far:");
    let ledger = session.ledger();
    if !ledger.has_spending() {
        println!("  (nothing)");
    }
    for material in Material::ALL {
        let amount = ledger.spent(material);
        if amount > 0 {
            println!("  {:<16} {}", material.name(), amount);
        }
    }
    if ledger.has_consumed_weapons() {
        println!("Weapons consumed by reset protection:");
        for (name, count) in &ledger.consumed_weapons {
            println!("  {} +0 x{}", name, count);
        }
    }
}

fn print_help() {
    println!("Armory - weapon enhancement simulator\n");
    println!("Usage: armory [OPTIONS]\n");
    println!("Options:");
    println!("  -d, --data DIR              Directory with weapons.json and cost tables");
    println!("  -w, --weapon NAME           Weapon to enhance");
    println!("  -t, --target LEVEL          Target level (default: highest available)");
    println!("  -g, --guaranteed LEVELS     Prefer guaranteed upgrades at LEVELS (e.g. 1,2,3 or all)");
    println!("      --protect-downgrade LEVELS");
    println!("      --protect-reset LEVELS");
    println!("  -s, --seed N                Random seed for a reproducible run");
    println!("      --delay MS              Pause between autoplay steps");
    println!("      --list                  List selectable weapons");
    println!("      --reset-logs            Clear accumulated enhancement records");
    println!("  -y, --yes                   Do not ask for confirmation");
    println!("  -v, --version               Show version");
    println!("  -h, --help                  Show this help");
}

fn parse_levels(raw: &str) -> LevelSelection {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid level list: {} (expected e.g. 3,4,5 or all)", raw);
        process::exit(2);
    })
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "-d" | "--data" => {
                if let Some(v) = value {
                    parsed.data_dir = Some(PathBuf::from(v));
                    i += 1;
                }
            }
            "-w" | "--weapon" => {
                if let Some(v) = value {
                    parsed.weapon = Some(v.clone());
                    i += 1;
                }
            }
            "-t" | "--target" => {
                if let Some(v) = value {
                    parsed.target = v.trim_start_matches('+').parse().ok();
                    i += 1;
                }
            }
            "-g" | "--guaranteed" => {
                if let Some(v) = value {
                    parsed.guaranteed = parse_levels(v);
                    i += 1;
                }
            }
            "--protect-downgrade" => {
                if let Some(v) = value {
                    parsed.protect_downgrade = parse_levels(v);
                    i += 1;
                }
            }
            "--protect-reset" => {
                if let Some(v) = value {
                    parsed.protect_reset = parse_levels(v);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if let Some(v) = value {
                    parsed.seed = v.parse().ok();
                    i += 1;
                }
            }
            "--delay" => {
                if let Some(v) = value {
                    parsed.delay_ms = v.parse().ok();
                    i += 1;
                }
            }
            "--list" => parsed.list = true,
            "--reset-logs" => parsed.reset_logs = true,
            "-y" | "--yes" => parsed.yes = true,
            "-v" | "--version" => {
                println!("armory {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Use --help for usage information");
                process::exit(2);
            }
        }
        i += 1;
    }

    parsed
}
