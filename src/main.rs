// =============================================================================
// Super Mario Bros. (NES) — RAM decoder and tabular Q-learning store
// =============================================================================
// Build & Run:
//   cargo build --release
//   cargo run --release -- decode --ram dumps/frame_0420.bin
//   cargo run --release -- init --vision-range 4
//   cargo run --release -- update --state "(0, 1, 16, 0, 2)" --next-state "(0, 1, 16, 0, 1)" --action 1 --reward 2.5
//   cargo run --release -- backup

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use smb_ram_rl::{
    Action, DiscretizedState, LearningConfig, QTable, QTableConfig, Snapshot, WorldState,
};

// =============================================================================
// Commands
// =============================================================================

fn decode(args: &DecodeArgs) -> Result<()> {
    let bytes = std::fs::read(&args.ram)
        .with_context(|| format!("Failed to read RAM dump: {}", args.ram.display()))?;
    let snapshot = Snapshot::new(&bytes)
        .with_context(|| format!("Bad RAM dump: {}", args.ram.display()))?;
    let world = WorldState::decode_with(&snapshot, !args.ungrouped);
    println!("{}", serde_json::to_string_pretty(&world)?);
    Ok(())
}

fn table_config(table: &Option<PathBuf>, vision_range: Option<u8>) -> QTableConfig {
    let mut config = QTableConfig::from_env();
    if let Some(path) = table {
        config.table_path = path.clone();
    }
    if let Some(range) = vision_range {
        config.vision_range = range;
    }
    config
}

fn init(args: &InitArgs) -> Result<()> {
    let config = table_config(&args.table, args.vision_range);
    let table = QTable::initialize(&config)?;
    table
        .save(&config.table_path)
        .with_context(|| format!("Failed to save {}", config.table_path.display()))?;
    println!(
        "Initialized {} states at {}",
        table.len(),
        config.table_path.display()
    );
    Ok(())
}

fn backup(args: &BackupArgs) -> Result<()> {
    let mut config = table_config(&args.table, args.vision_range);
    if let Some(dir) = &args.backup_dir {
        config.backup_dir = dir.clone();
    }
    let table = QTable::load(&config.table_path, &config)?;
    let path = table
        .backup(&config.backup_dir)
        .with_context(|| format!("Failed to back up into {}", config.backup_dir.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn update(args: &UpdateArgs) -> Result<()> {
    let config = table_config(&args.table, args.vision_range);
    let mut learning = LearningConfig::from_env();
    if let Some(gamma) = args.gamma {
        learning.gamma = gamma;
    }
    if let Some(alpha) = args.alpha {
        learning.alpha = alpha;
    }

    let state: DiscretizedState = args.state.parse()?;
    let next_state: DiscretizedState = args.next_state.parse()?;
    let action = Action::from_index(args.action)?;

    let mut table = QTable::load(&config.table_path, &config)?;
    let value = table
        .update(
            &state,
            &next_state,
            action,
            learning.gamma,
            learning.alpha,
            args.reward,
        )
        .context("State does not match the table's discretization")?;
    table
        .save(&config.table_path)
        .with_context(|| format!("Failed to save {}", config.table_path.display()))?;
    println!("{value}");
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<()> {
    let config = table_config(&args.table, args.vision_range);
    let state: DiscretizedState = args.state.parse()?;
    let table = QTable::load(&config.table_path, &config)?;
    let values = table.values(&state)?;
    for action in Action::ALL {
        println!("{action:?} ({}): {}", action.index(), values[action.index()]);
    }
    println!("best: {:?}", table.best_action(&state)?);
    Ok(())
}

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser)]
#[command(name = "smb-rl", about = "Super Mario Bros. RAM decoder and Q-table tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a raw 2 KiB RAM dump into JSON
    Decode(DecodeArgs),
    /// Write a fresh zero-valued Q-table
    Init(InitArgs),
    /// Copy the Q-table into the backup directory
    Backup(BackupArgs),
    /// Apply one temporal-difference update and save
    Update(UpdateArgs),
    /// Print the action values for one state
    Inspect(InspectArgs),
}

#[derive(Parser)]
struct DecodeArgs {
    #[arg(long)]
    ram: PathBuf,
    /// Keep raw terrain bytes instead of collapsing them to solid/empty
    #[arg(long, default_value_t = false)]
    ungrouped: bool,
}

#[derive(Parser)]
struct InitArgs {
    #[arg(long)]
    table: Option<PathBuf>,
    #[arg(long)]
    vision_range: Option<u8>,
}

#[derive(Parser)]
struct BackupArgs {
    #[arg(long)]
    table: Option<PathBuf>,
    #[arg(long)]
    vision_range: Option<u8>,
    #[arg(long)]
    backup_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct UpdateArgs {
    #[arg(long)]
    state: String,
    #[arg(long)]
    next_state: String,
    #[arg(long)]
    action: usize,
    #[arg(long, allow_negative_numbers = true)]
    reward: f64,
    #[arg(long)]
    gamma: Option<f64>,
    #[arg(long)]
    alpha: Option<f64>,
    #[arg(long)]
    table: Option<PathBuf>,
    #[arg(long)]
    vision_range: Option<u8>,
}

#[derive(Parser)]
struct InspectArgs {
    #[arg(long)]
    state: String,
    #[arg(long)]
    table: Option<PathBuf>,
    #[arg(long)]
    vision_range: Option<u8>,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Decode(args) => decode(args),
        Commands::Init(args) => init(args),
        Commands::Backup(args) => backup(args),
        Commands::Update(args) => update(args),
        Commands::Inspect(args) => inspect(args),
    }
}
