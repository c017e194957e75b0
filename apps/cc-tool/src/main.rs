//! CLI tool for save slot inspection and dialogue playback.
//!
//! Provides commands for:
//! - Listing, creating, and deleting save slots
//! - Reading and writing typed keys in a slot
//! - Playing a dialogue script in the terminal

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dialog_graph::input::{handle_input, DialogInput, InputOutcome};
use dialog_graph::DialogGraph;
use save_store::{SaveConfig, SaveStore};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save directory, overriding the configuration
    #[arg(long)]
    save_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every slot
    Slots,
    /// Create a new slot
    New { slot: i32, player: String },
    /// Delete a slot file
    Delete { slot: i32 },
    /// Read one key from a slot
    Get {
        slot: i32,
        key: String,
        #[arg(long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
    },
    /// Write one key to a slot and save it
    Set {
        slot: i32,
        key: String,
        value: String,
        #[arg(long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
    },
    /// Print every key stored in a slot
    Dump { slot: i32 },
    /// Play a dialogue script interactively
    Play { script: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    String,
    Int,
    Float,
    Bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => SaveConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SaveConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(dir) = args.save_dir {
        config.save_dir = dir;
    }

    match args.command {
        Command::Play { script } => play(&script),
        command => {
            let mut store = SaveStore::new(config);
            store.initialize()?;
            run_slot_command(&mut store, command)
        }
    }
}

fn run_slot_command(store: &mut SaveStore, command: Command) -> Result<()> {
    match command {
        Command::Slots => {
            for info in store.get_all_slots() {
                if info.exists {
                    println!(
                        "slot {}: {} (chapter {}, level {}, {:.0}s played, saved at {})",
                        info.slot_id,
                        info.player_name,
                        info.chapter,
                        info.level,
                        info.playtime,
                        info.last_save_time
                    );
                } else {
                    println!("slot {}: <empty>", info.slot_id);
                }
            }
        }
        Command::New { slot, player } => {
            store.create_new_slot(slot, &player)?;
            println!("created slot {} for {}", slot, player);
        }
        Command::Delete { slot } => {
            store.delete_slot(slot)?;
            println!("deleted slot {}", slot);
        }
        Command::Get { slot, key, kind } => {
            store.load_slot(slot)?;
            if store.value_kind(&key).is_none() {
                bail!("key '{}' not found in slot {}", key, slot);
            }
            let value = match kind {
                Kind::String => store.get_string(&key, ""),
                Kind::Int => store.get_int(&key, 0).to_string(),
                Kind::Float => store.get_float(&key, 0.0).to_string(),
                Kind::Bool => store.get_bool(&key, false).to_string(),
            };
            println!("{}", value);
        }
        Command::Set {
            slot,
            key,
            value,
            kind,
        } => {
            store.load_slot(slot)?;
            match kind {
                Kind::String => store.set_string(&key, &value)?,
                Kind::Int => {
                    let value = value.parse().context("value is not an integer")?;
                    store.set_int(&key, value)?
                }
                Kind::Float => {
                    let value = value.parse().context("value is not a number")?;
                    store.set_float(&key, value)?
                }
                Kind::Bool => store.set_bool(&key, parse_bool(&value)?)?,
            }
            store.save_slot(slot)?;
        }
        Command::Dump { slot } => {
            store.load_slot(slot)?;
            for key in store.keys()? {
                let kind = store
                    .value_kind(&key)
                    .map_or("?", |kind| kind.as_str());
                println!("{} ({}) = {}", key, kind, store.get_string(&key, ""));
            }
        }
        Command::Play { .. } => bail!("play does not operate on a save slot"),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("'{}' is not a boolean", other),
    }
}

/// Reads lines from stdin: a digit picks a choice, an empty line continues, `q` quits.
fn play(script: &Path) -> Result<()> {
    let mut graph = DialogGraph::new();
    graph.start_dialogue(script)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    render(&graph)?;

    while graph.is_active() {
        let Some(line) = lines.next() else {
            graph.end_dialogue();
            break;
        };
        let line = line?;
        let input = match line.trim() {
            "" => DialogInput::Accept,
            "q" => DialogInput::Cancel,
            other => match other.chars().next().and_then(DialogInput::from_key) {
                Some(input) if other.len() == 1 => input,
                _ => {
                    println!("(enter a choice number, an empty line, or q)");
                    continue;
                }
            },
        };

        match handle_input(&mut graph, input) {
            InputOutcome::Refresh => render(&graph)?,
            InputOutcome::Ignored => println!("(not available here)"),
            InputOutcome::Closed => break,
        }
    }
    println!("-- end --");
    Ok(())
}

fn render(graph: &DialogGraph) -> Result<()> {
    let Some(node) = graph.current() else {
        return Ok(());
    };
    let mut out = io::stdout().lock();
    writeln!(out, "\n{}", node.display_line())?;
    for label in node.choice_labels() {
        writeln!(out, "  {}", label)?;
    }
    out.flush()?;
    Ok(())
}
