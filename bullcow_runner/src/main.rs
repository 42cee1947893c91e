use std::{io, process, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};

use bullcow_rs::{advisor::Assisted, harness::Harness, strategy::Random, Strategy};
use bullcow_strategies::{Consistent, Exclusion};

use crate::advisor::ChatAdvisor;
use crate::duel::DuelConfig;

mod advisor;
mod duel;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a duel against a strategy.
    Duel(DuelArgs),
    /// Bench the bundled strategies against each other.
    Bench(BenchArgs),
}

#[derive(Args)]
struct DuelArgs {
    /// Which strategy sits on the other side of the table.
    #[arg(long, value_enum, default_value_t = Opponent::Exclusion)]
    strategy: Opponent,

    /// Ask a remote advisor for guesses, falling back to the strategy
    /// when it cannot help.
    #[arg(long)]
    assist: bool,

    /// Seed for the opponent's randomness.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct BenchArgs {
    /// How many random secrets to test each strategy against.
    #[arg(long, default_value_t = 200)]
    games: usize,

    /// Test against every possible secret instead.
    #[arg(long)]
    all: bool,

    /// Maximum guesses per game before scoring it as missed.
    #[arg(long, default_value_t = 100)]
    turn_limit: usize,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Opponent {
    Exclusion,
    Consistent,
    Random,
}

fn build_opponent(choice: Opponent, assist: bool) -> Box<dyn Strategy> {
    if assist {
        match ChatAdvisor::from_env() {
            Ok(advisor) => {
                return match choice {
                    Opponent::Exclusion => Box::new(Assisted::new(advisor, Exclusion)),
                    Opponent::Consistent => Box::new(Assisted::new(advisor, Consistent)),
                    Opponent::Random => Box::new(Assisted::new(advisor, Random)),
                };
            }
            Err(e) => {
                log::warn!("advisor unavailable, playing unassisted: {}", e);
            }
        }
    }

    match choice {
        Opponent::Exclusion => Box::new(Exclusion),
        Opponent::Consistent => Box::new(Consistent),
        Opponent::Random => Box::new(Random),
    }
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Duel(args) => {
            let mut config = DuelConfig::new(build_opponent(args.strategy, args.assist));
            config.seed = args.seed;
            config.thinking_delay = Duration::from_millis(400);

            let stdin = io::stdin();
            let stdout = io::stdout();
            if let Err(e) = duel::run(config, stdin.lock(), stdout.lock()) {
                log::error!("the duel ended with an error: {}", e);
                process::exit(1);
            }
        }
        Command::Bench(args) => {
            let mut harness = Harness::new()
                .verbose()
                .add_strategy(Box::new(Consistent))
                .add_strategy(Box::new(Exclusion))
                .add_baseline(Box::new(Random))
                .turn_limit(args.turn_limit);

            harness = if args.all {
                harness.test_all()
            } else {
                harness.test_num(args.games)
            };
            if let Some(seed) = args.seed {
                harness = harness.seed(seed);
            }

            let record = match harness.run() {
                Ok(record) => record,
                Err(e) => {
                    log::error!("the harness failed: {}", e);
                    process::exit(1);
                }
            };

            if let Err(e) = record.print_report() {
                log::error!("could not print the report: {}", e);
                process::exit(1);
            }
        }
    }
}
