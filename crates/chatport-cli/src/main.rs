use anyhow::{Context, Result, bail};
use chatport_common::{ChatportConfig, StorageBackend, truncate_string};
use chatport_core::{
    DirectoryDelivery, Document, FjallStore, FormatTag, HistoryTransfer, MemoryStore, Migrator,
    Store, current_data, detect, selected_conversation,
};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command-line arguments for the chatport CLI
#[derive(Parser)]
#[command(
    name = "chatport",
    about = "chatport - import, merge and export chat history documents"
)]
pub struct Args {
    /// Path to the configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Path to the data directory (overrides the configuration)
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug mode
    #[clap(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a history file and merge it into the store
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Export the stored history as a version 4 document
    Export {
        /// Directory to write the export into
        #[clap(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the detected format of a history file
    Detect {
        /// File to inspect
        file: PathBuf,
    },
    /// Summarize what the store holds
    Show,
}

fn init_tracing(debug: bool, log_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(args: &Args) -> Result<ChatportConfig> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => ChatportConfig::config_path()?,
    };
    let mut config = ChatportConfig::load(&path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    if let Some(data_dir) = &args.data_dir {
        config.base.data_dir = data_dir.clone();
    }
    Ok(config)
}

fn open_store(config: &ChatportConfig) -> Result<Box<dyn Store>> {
    match config.storage.backend {
        StorageBackend::Fjall => {
            std::fs::create_dir_all(&config.base.data_dir).with_context(|| {
                format!("Failed to create data directory: {:?}", config.base.data_dir)
            })?;
            let store = FjallStore::with_namespace(&config.base.data_dir, &config.storage.namespace)
                .with_context(|| format!("Failed to open store in {:?}", config.base.data_dir))?;
            Ok(Box::new(store))
        }
        StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
    }
}

fn read_document(file: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    serde_json::from_str(&content).with_context(|| format!("{:?} is not valid JSON", file))
}

fn print_counts(label: &str, doc: &Document) {
    println!("{}", label.bright_cyan().bold());
    println!(
        "  {} {}",
        "Conversations:".bright_yellow(),
        doc.history.len().to_string().bright_green()
    );
    println!(
        "  {} {}",
        "Folders:".bright_yellow(),
        doc.folders.len().to_string().bright_green()
    );
    println!(
        "  {} {}",
        "Prompts:".bright_yellow(),
        doc.prompts.len().to_string().bright_green()
    );
}

fn describe_format(format: FormatTag) -> String {
    match format {
        FormatTag::Foreign => "ChatGPT export".to_string(),
        FormatTag::V4 => "current (v4)".to_string(),
        legacy if legacy.is_legacy() => format!("legacy ({})", legacy),
        other => other.to_string(),
    }
}

fn run_import(transfer: &HistoryTransfer, store: &mut dyn Store, file: &Path) -> Result<()> {
    if !store.is_persistent() {
        warn!(
            "The {} backend keeps nothing after exit, this import is a dry run",
            store.name()
        );
    }

    let data = read_document(file)?;
    let format = detect(&data);
    println!("{} {}", "Format:".bright_yellow(), describe_format(format).bright_blue());

    let imported = match transfer.import_data(store, data) {
        Ok(doc) => doc,
        Err(e) if e.is_format_error() => {
            bail!("{:?} is not a supported history export: {}", file, e)
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to import {:?}", file)),
    };
    print_counts("Imported", &imported);

    let merged = current_data(store)?;
    if store.is_persistent() {
        print_counts("Store now holds", &merged);
    } else {
        print_counts("Store would hold (not saved)", &merged);
    }
    Ok(())
}

fn run_export(
    transfer: &HistoryTransfer,
    store: &dyn Store,
    config: &ChatportConfig,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let dir = out_dir.unwrap_or_else(|| config.export.output_dir.clone());
    let mut delivery = DirectoryDelivery::new(&dir);

    let filename = transfer.export_today(store, &mut delivery)?;
    println!(
        "{} {}",
        "Exported to".bright_green(),
        delivery.path_for(&filename).display().to_string().bright_blue()
    );
    Ok(())
}

fn run_detect(file: &Path) -> Result<()> {
    let data = read_document(file)?;
    let format = detect(&data);
    if !format.is_recognized() {
        bail!("{:?} is not a recognized history export", file);
    }
    println!("{}", format);
    Ok(())
}

fn run_show(store: &dyn Store) -> Result<()> {
    let doc = current_data(store)?;
    print_counts(&format!("Store ({})", store.name()), &doc);

    match selected_conversation(store)? {
        Some(conversation) => println!(
            "  {} {} {}",
            "Selected:".bright_yellow(),
            conversation.id().unwrap_or("-").bright_blue(),
            truncate_string(conversation.name().unwrap_or(""), 40).white()
        ),
        None => println!("  {} {}", "Selected:".bright_yellow(), "none".white()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_tracing(args.debug, &config.base.log_level)?;
    debug!("Using configuration: {:?}", config);

    let transfer = HistoryTransfer::new(Migrator::new(config.conversation.clone()));

    match args.command {
        Command::Detect { file } => run_detect(&file),
        Command::Import { file } => {
            let mut store = open_store(&config)?;
            info!("Using {} store", store.name());
            run_import(&transfer, store.as_mut(), &file)
        }
        Command::Export { out_dir } => {
            let store = open_store(&config)?;
            run_export(&transfer, store.as_ref(), &config, out_dir)
        }
        Command::Show => {
            let store = open_store(&config)?;
            run_show(store.as_ref())
        }
    }
}
