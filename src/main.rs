//! Superposition CLI
//!
//! Command-line interface for exercising the observation controller on a
//! simulated chain, pricing reboxes and checking configuration files.

use clap::{Parser, Subcommand};
use rand_core::RngCore;
use std::path::PathBuf;
use superposition::{
    entropy::keccak,
    metrics::{MetricsRegistry, MetricsSnapshot},
    Address, Amount, Controller, FileConfig, Hash32, InMemoryLedger, Ledger, ReboxEngine,
    SimulatedChain, Token,
};
use tracing::{info, warn};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "superposition", version, about = "Commit-reveal observation simulator")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run full commit → reveal cycles on a simulated chain.
    Simulate {
        /// Number of observations to run.
        #[arg(long, default_value_t = 20)]
        observations: u32,
        /// Amount escrowed per observation.
        #[arg(long, default_value_t = 100)]
        amount: Amount,
        /// Force-reveal every Nth observation from a keeper account.
        #[arg(long)]
        force_every: Option<u32>,
    },
    /// Price a rebox of the given number of pairs.
    Quote {
        /// Pairs of outcome balances to recombine.
        #[arg(long)]
        pairs: Amount,
    },
    /// Load and validate the configuration file.
    CheckConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Superposition v{}", superposition::VERSION);

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Command::Simulate {
            observations,
            amount,
            force_every,
        } => simulate(&config, observations, amount, force_every),
        Command::Quote { pairs } => quote(&config, pairs),
        Command::CheckConfig => {
            println!("{:#?}", config);
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<FileConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = FileConfig::from_file(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(FileConfig::default()),
    }
}

fn quote(config: &FileConfig, pairs: Amount) -> CliResult {
    let engine = ReboxEngine::new(&config.protocol, Address::ZERO);
    let quote = engine.quote(pairs)?;
    println!(
        "pairs={} output={} fee={} (fee_bps={})",
        quote.pairs,
        quote.output,
        quote.fee,
        engine.fee_bps()
    );
    Ok(())
}

fn simulate(
    config: &FileConfig,
    observations: u32,
    amount: Amount,
    force_every: Option<u32>,
) -> CliResult {
    let controller_id = Address::repeat(0xc0);
    let observer = Address::repeat(0xa1);
    let keeper = Address::repeat(0xee);

    let chain =
        SimulatedChain::from_config(&config.simulation, config.protocol.blockhash_retention)?;
    let mut ledger = InMemoryLedger::new(controller_id);
    let funding = amount
        .checked_mul(Amount::from(observations))
        .ok_or("funding overflow")?;
    ledger.credit(Token::Superposed, &observer, funding)?;

    let mut controller = Controller::deploy(
        config.protocol.clone(),
        Address::repeat(0xde),
        controller_id,
        chain,
        ledger,
    )?;
    let reveal_wait = config.protocol.reveal_delay + 1;
    let force_wait = config.protocol.force_offset() + 1;

    info!("Running {} observations of {} units", observations, amount);

    for i in 0..observations {
        let secret = random_secret();
        let data = format!("observation-{}", i).into_bytes();

        controller.commit(&observer, amount, keccak(&data), secret)?;

        let forced = force_every.is_some_and(|n| n > 0 && (i + 1) % n == 0);
        let resolution = if forced {
            controller.oracle_mut().advance(force_wait);
            controller.force_reveal(&keeper, &observer, &data, secret)
        } else {
            controller.oracle_mut().advance(reveal_wait);
            controller.reveal(&observer, &data, secret)
        };

        match resolution {
            Ok(r) => info!(
                "Observation {}: outcome_a={} outcome_b={}{}",
                i,
                r.outcome_a,
                r.outcome_b,
                if r.forced { " (forced)" } else { "" }
            ),
            Err(e) => {
                warn!("Observation {} failed to resolve: {}", i, e);
                let wait = controller
                    .status(&observer)
                    .blocks_until_expiry
                    .unwrap_or(0);
                controller.oracle_mut().advance(wait);
                controller.cancel(&observer)?;
            }
        }
    }

    match controller.rebox_max(&observer, None) {
        Ok(q) => info!("Reboxed {} pairs into {} (fee {})", q.pairs, q.output, q.fee),
        Err(e) => warn!("Rebox skipped: {}", e),
    }

    let stats = controller.stats();
    let ledger = controller.ledger();
    println!(
        "outcome_a wins={} outcome_b wins={} forced={} cancels={}",
        stats.outcome_a_wins, stats.outcome_b_wins, stats.forced_reveals, stats.cancels
    );
    println!(
        "balances: superposed={} outcome_a={} outcome_b={}",
        ledger.balance_of(Token::Superposed, &observer),
        ledger.balance_of(Token::OutcomeA, &observer),
        ledger.balance_of(Token::OutcomeB, &observer)
    );
    println!("entropy pool: {}", controller.entropy_pool());

    let metrics = MetricsRegistry::new()?;
    metrics.update(&MetricsSnapshot::from_controller(&controller));
    print!("{}", metrics.encode()?);

    Ok(())
}

/// Draws a non-zero 32-byte secret from the OS entropy source.
fn random_secret() -> Hash32 {
    loop {
        let mut bytes = [0u8; 32];
        rand_core::OsRng.fill_bytes(&mut bytes);
        let secret = Hash32::new(bytes);
        if !secret.is_zero() {
            return secret;
        }
    }
}
