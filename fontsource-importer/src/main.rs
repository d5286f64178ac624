//! fontsource - import Fontsource fonts as embedded stylesheets
//!
//! Every command loads the settings, performs one operation, and (for
//! mutating commands) rewrites the applied stylesheet.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use fontsource_common::config::{resolve_config_dir, FontsourcePaths, TomlConfig};
use fontsource_common::events::EventBus;
use fontsource_common::FontSlot;
use fontsource_importer::services::DownloadPool;
use fontsource_importer::{logging, FontLibrary};
use tracing::{error, info};
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "fontsource")]
#[command(about = "Import Fontsource fonts and apply them as interface, text or monospace fonts")]
#[command(version)]
struct Args {
    /// Configuration directory (fonts/ and fontsource.json live here)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog by family name
    Search { query: String },
    /// Download a font and store it as a stylesheet
    Import { id: String },
    /// Delete an imported font
    Remove { id: String },
    /// Apply an imported font's stylesheet
    Enable { id: String },
    /// Stop applying a font (also removes it from every slot)
    Disable { id: String },
    /// List imported fonts
    List,
    /// Manage the interface/text/monospace precedence lists
    Slot {
        slot: FontSlot,
        #[command(subcommand)]
        action: SlotAction,
    },
    /// Write all applied styles to one stylesheet
    Apply {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum SlotAction {
    /// Show selected fonts in precedence order
    Show,
    /// Select an enabled font for this slot
    Add { id: String },
    /// Deselect a font
    Remove { id: String },
    /// Change a font's precedence (lower comes first)
    Precedence { id: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let (subscriber, filter_handle) = logging::build_subscriber(std::io::stderr);
    subscriber.init();

    let args = Args::parse();
    let config = TomlConfig::load().context("Failed to load configuration")?;
    logging::apply_config_level(&filter_handle, &config.logging.level)?;

    let config_dir = resolve_config_dir(args.config_dir.as_deref(), &config);
    let paths = FontsourcePaths::new(&config_dir);
    info!("Config directory: {}", config_dir.display());

    let pool = Arc::new(DownloadPool::new(config.max_concurrent_downloads)?);
    let mut library = FontLibrary::open(&config, paths.clone(), pool, EventBus::default())
        .await
        .context("Failed to open font library")?;

    let mutated = run(&mut library, args.command, &paths).await?;
    if mutated {
        library
            .write_applied(&paths.applied_stylesheet_path())
            .await
            .context("Failed to write applied stylesheet")?;
    }
    Ok(())
}

/// Execute one command, returning whether installed styles may have changed
async fn run(library: &mut FontLibrary, command: Command, paths: &FontsourcePaths) -> Result<bool> {
    match command {
        Command::Search { query } => {
            let results = library.search_catalog(&query).await?;
            if results.is_empty() {
                println!("No fonts found.");
            }
            for font in results {
                println!("{}\t{}", font.id, font.family);
            }
            Ok(false)
        }
        Command::Import { id } => {
            println!("Importing {}...", id);
            match library.import(&id).await {
                Ok(record) => {
                    println!("Imported {}.", record.family);
                    Ok(true)
                }
                Err(e) => {
                    error!(id = %id, error = %e, "Error importing font");
                    Err(anyhow!("Unable to import {}: {}", id, e))
                }
            }
        }
        Command::Remove { id } => match library.remove(&id).await {
            Ok(record) => {
                println!("Deleted {}.", record.family);
                Ok(true)
            }
            Err(e) => {
                error!(id = %id, error = %e, "Error deleting font");
                Err(anyhow!("Unable to delete {}.css: {}", id, e))
            }
        },
        Command::Enable { id } => {
            library.set_active(&id, true).await?;
            println!("Enabled {}.", id);
            Ok(true)
        }
        Command::Disable { id } => {
            library.set_active(&id, false).await?;
            println!("Disabled {}.", id);
            Ok(true)
        }
        Command::List => {
            let fonts = library.imported_fonts();
            if fonts.is_empty() {
                println!("No fonts imported.");
            }
            for font in fonts {
                println!(
                    "{} ({}){}",
                    font.family,
                    font.id,
                    if font.is_active { " [active]" } else { "" }
                );
                let weights: Vec<String> = font.weights.iter().map(u32::to_string).collect();
                println!("  Weights: {}", weights.join(", "));
                println!("  Styles: {}", font.styles.join(", "));
                println!("  Subsets: {}", font.subsets.join(", "));
            }
            Ok(false)
        }
        Command::Slot { slot, action } => run_slot(library, slot, action).await,
        Command::Apply { output } => {
            let path = output.unwrap_or_else(|| paths.applied_stylesheet_path());
            let blocks = library.write_applied(&path).await?;
            println!("Wrote {} style blocks to {}", blocks, path.display());
            Ok(false)
        }
    }
}

async fn run_slot(library: &mut FontLibrary, slot: FontSlot, action: SlotAction) -> Result<bool> {
    match action {
        SlotAction::Show => {
            let entries = library.slot_entries(slot);
            if entries.is_empty() {
                println!("No fonts selected.");
            }
            for entry in entries {
                println!("{}\t{}\t{}", entry.precedence, entry.id, entry.family);
            }
            Ok(false)
        }
        SlotAction::Add { id } => {
            if library.add_to_slot(slot, &id).await? {
                println!("Selected {} for {}.", id, slot);
            } else {
                println!("{} is already selected.", id);
            }
            Ok(true)
        }
        SlotAction::Remove { id } => {
            library.remove_from_slot(slot, &id).await?;
            println!("Removed {} from {}.", id, slot);
            Ok(true)
        }
        SlotAction::Precedence { id, value } => {
            library.set_precedence(slot, &id, &value).await?;
            println!("Set {} precedence to {}.", id, value);
            Ok(true)
        }
    }
}
