//! Bookmark transcoder command line.
//!
//! Converts Netscape bookmark HTML files to JSON trees or flat records and
//! back, and moves them in and out of a SQLite record store.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookmark_transcoder::database::Database;
use bookmark_transcoder::managers::bookmark_store::BookmarkStore;
use bookmark_transcoder::services::html_serializer::{self, SerializeOptions};
use bookmark_transcoder::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_transcoder::services::{bookmark_exchange, html_parser, tree_converter};
use bookmark_transcoder::types::record::StoredRecord;

#[derive(Parser, Debug)]
#[command(name = "bookmark-transcoder")]
#[command(author, version, about = "Netscape bookmark HTML transcoder", long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Show the parsed tree as JSON
    bookmark-transcoder parse bookmarks.html

    # Flat records, ready for storage
    bookmark-transcoder flatten bookmarks.html > records.json

    # Records back to HTML
    bookmark-transcoder render records.json -o bookmarks.html

    # Through the SQLite store
    bookmark-transcoder import bookmarks.html --db bookmarks.db
    bookmark-transcoder export --db bookmarks.db -o out.html
"#)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse bookmark HTML and print the tree as JSON
    Parse {
        /// Input file, or `-` for stdin
        input: String,
    },
    /// Parse bookmark HTML and print flat records as JSON
    Flatten {
        /// Input file, or `-` for stdin
        input: String,
    },
    /// Render a JSON array of flat records as bookmark HTML
    Render {
        /// Input file, or `-` for stdin
        input: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Import bookmark HTML into the record store
    Import {
        /// Input file, or `-` for stdin
        input: String,
        /// Database path (defaults to the configured one)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Export the record store as bookmark HTML
    Export {
        /// Database path (defaults to the configured one)
        #[arg(long)]
        db: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Document <TITLE> (defaults to the configured one)
    #[arg(long)]
    title: Option<String>,

    /// Root <H1> heading (defaults to the configured one)
    #[arg(long)]
    root_name: Option<String>,
}

impl OutputArgs {
    fn options(&self, settings: &SettingsEngine) -> SerializeOptions {
        let mut options = SerializeOptions::from(&settings.get_settings().export);
        if let Some(title) = &self.title {
            options.title = title.clone();
        }
        if let Some(root_name) = &self.root_name {
            options.root_name = root_name.clone();
        }
        options
    }

    fn write(&self, text: &str) -> Result<()> {
        match &self.output {
            Some(path) => fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display())),
            None => {
                io::stdout().write_all(text.as_bytes())?;
                Ok(())
            }
        }
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
}

fn open_database(db: Option<PathBuf>, settings: &SettingsEngine) -> Result<Database> {
    let path = db.unwrap_or_else(|| PathBuf::from(&settings.get_settings().storage.database_path));
    Database::open(&path).with_context(|| format!("failed to open database {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = SettingsEngine::new(cli.config);
    settings.load().context("failed to load settings")?;

    match cli.command {
        Command::Parse { input } => {
            let file = html_parser::parse(&read_input(&input)?);
            println!("{}", serde_json::to_string_pretty(&file)?);
        }
        Command::Flatten { input } => {
            let file = html_parser::parse(&read_input(&input)?);
            let records = tree_converter::flatten(&file.bookmarks);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Render { input, output } => {
            let records: Vec<StoredRecord> = serde_json::from_str(&read_input(&input)?)
                .context("input is not a JSON array of records")?;
            let forest = tree_converter::unflatten(&records);
            output.write(&html_serializer::serialize(&forest, &output.options(&settings)))?;
        }
        Command::Import { input, db } => {
            let html = read_input(&input)?;
            let database = open_database(db, &settings)?;
            let mut store = BookmarkStore::new(database.connection());
            let summary = bookmark_exchange::import_html(&mut store, &html)?;
            info!(imported = summary.imported, "import finished");
            println!(
                "Imported {} bookmark nodes from \"{}\" ({} fragments dropped)",
                summary.imported, summary.metadata.title, summary.dropped_fragments
            );
        }
        Command::Export { db, output } => {
            let database = open_database(db, &settings)?;
            let store = BookmarkStore::new(database.connection());
            let html = bookmark_exchange::export_html(&store, &output.options(&settings))?;
            output.write(&html)?;
        }
    }

    Ok(())
}
