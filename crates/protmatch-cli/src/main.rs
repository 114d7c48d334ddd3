use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use protmatch_core::highlight;
use protmatch_core::{
    Accession, Dispatch, FetchState, InputController, ProtmatchConfig, SequenceFetcher,
};
use protmatch_uniprot::UniProtClient;

/// Accessions pre-filled by `--demo`.
const DEMO_ACCESSIONS: [&str; 5] = ["Q9Y7B1", "A0A1B2J9U2", "C1PHG1", "A0A1B2JAX1", "A0A1B2J5Q5"];

/// protmatch — look up protein sequences by accession and highlight
/// pattern matches as you type.
#[derive(Parser, Debug)]
#[command(name = "protmatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Characters per sequence line (0 disables wrapping). Overrides the config file.
    #[arg(long, global = true)]
    wrap: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive terminal UI (the default).
    Tui {
        /// Regular expression to highlight.
        #[arg(short, long)]
        pattern: Option<String>,

        /// Accessions to load on startup.
        #[arg(short, long, num_args = 1..)]
        accessions: Vec<String>,

        /// Start with a handful of sample accessions.
        #[arg(long)]
        demo: bool,
    },
    /// Fetch accessions, print their sequences with matches highlighted.
    Scan {
        /// Accessions to fetch.
        #[arg(required = true)]
        accessions: Vec<String>,

        /// Regular expression to highlight.
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Print a summary of a protein's JSON entry.
    Info {
        accession: String,
    },
}

fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Log to a file so the TUI's alternate screen stays clean. If the log file
/// can't be opened, discard logs instead.
fn init_file_logging(filter: &str) {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("protmatch");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("protmatch.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }
}

fn init_stderr_logging(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui {
        pattern: None,
        accessions: Vec::new(),
        demo: false,
    });

    let filter = verbosity_filter(cli.verbose);
    match command {
        Command::Tui { .. } => init_file_logging(filter),
        Command::Scan { .. } | Command::Info { .. } => init_stderr_logging(filter),
    }

    // Load config.
    let mut config = ProtmatchConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        ProtmatchConfig::default()
    });
    if let Some(wrap) = cli.wrap {
        config.display.wrap_width = wrap;
    }

    tracing::info!("Starting protmatch v{}", env!("CARGO_PKG_VERSION"));

    let client = Arc::new(UniProtClient::new(&config.uniprot));

    match command {
        Command::Tui {
            pattern,
            accessions,
            demo,
        } => {
            let mut app = protmatch_tui::App::new(client, &config.display);

            if let Some(ref pattern) = pattern {
                app.set_initial_pattern(pattern);
            }
            let mut initial = accessions;
            if demo {
                initial.extend(DEMO_ACCESSIONS.iter().map(|s| s.to_string()));
            }
            app.set_initial_accessions(&initial);

            app.run().await?;
        }
        Command::Scan {
            accessions,
            pattern,
        } => scan(client, &accessions, pattern.as_deref(), config.display.wrap_width).await?,
        Command::Info { accession } => info(&client, &accession).await?,
    }

    tracing::info!("protmatch exited cleanly");
    Ok(())
}

/// Run accessions through the controller, wait for every fetch to settle,
/// then print the results in input order.
async fn scan(
    fetcher: Arc<dyn SequenceFetcher>,
    accessions: &[String],
    pattern: Option<&str>,
    wrap: usize,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatch: Dispatch = Arc::new(move |event| {
        let _ = tx.send(event);
    });
    let mut controller = InputController::new(fetcher, dispatch);

    if let Some(pattern) = pattern {
        controller.change_pattern(pattern);
        if let Some(err) = &controller.pattern().error {
            anyhow::bail!("invalid pattern: {err}");
        }
    }

    let mut text = accessions.join("\n");
    text.push('\n');
    controller.change_input(&text);

    while controller
        .input()
        .fastas()
        .iter()
        .any(|(_, fs)| fs.is_loading())
    {
        match rx.recv().await {
            Some(event) => controller.apply(event),
            None => break,
        }
    }

    let color = std::io::stdout().is_terminal();
    for (accession, fs) in controller.input().fastas().iter() {
        print_entry(accession, fs, wrap, color);
    }
    Ok(())
}

fn print_entry(accession: &Accession, state: &FetchState, wrap: usize, color: bool) {
    match state {
        FetchState::Loading => println!(">{accession}\nloading...\n"),
        FetchState::Error { message } => {
            if color {
                println!(">{accession}\n{}\n", message.as_str().red());
            } else {
                println!(">{accession}\n{message}\n");
            }
        }
        FetchState::Ok(set) => {
            let title = set.record.title.as_str();
            if color && set.matches.is_empty() {
                println!("{}", title.red());
            } else if color {
                println!("{}", title.green());
            } else {
                println!("{title}");
            }

            match highlight::highlight(&set.record.sequence, &set.matches, wrap) {
                Ok(fragments) => {
                    for fragment in &fragments {
                        if color && fragment.is_highlighted() {
                            print!("{}", fragment.text.as_str().black().on_yellow());
                        } else {
                            print!("{}", fragment.text);
                        }
                    }
                    println!();
                }
                Err(e) => {
                    tracing::warn!(accession = %accession, error = %e, "Cannot highlight matches");
                    println!("{}", highlight::wrap_text(&set.record.sequence, wrap));
                }
            }

            let spans: Vec<String> = set
                .matches
                .iter()
                .map(|(start, end)| format!("{start}..{end}"))
                .collect();
            match spans.len() {
                0 => println!("no matches\n"),
                1 => println!("1 match: {}\n", spans[0]),
                n => println!("{n} matches: {}\n", spans.join(", ")),
            }
        }
    }
}

async fn info(client: &UniProtClient, accession: &str) -> Result<()> {
    let normalized = protmatch_core::state::normalize(accession);
    if normalized.trim().is_empty() {
        anyhow::bail!("not an accession: {accession:?}");
    }
    let accession = Accession::new(normalized.trim());
    let entry = client.fetch_entry(&accession).await?;

    println!("{} ({})", entry.accession, entry.id);
    if let Some(name) = entry.full_name() {
        println!("  name:      {name}");
    }
    if let Some(organism) = entry.scientific_name() {
        println!("  organism:  {organism} (taxon {})", entry.organism.taxonomy);
    }
    let genes = entry.gene_names();
    if !genes.is_empty() {
        println!("  genes:     {}", genes.join(", "));
    }
    if !entry.protein_existence.is_empty() {
        println!("  existence: {}", entry.protein_existence);
    }
    println!(
        "  sequence:  {} aa, {} Da",
        entry.sequence.length, entry.sequence.mass
    );
    if !entry.keywords.is_empty() {
        let keywords: Vec<&str> = entry.keywords.iter().map(|k| k.value.as_str()).collect();
        println!("  keywords:  {}", keywords.join(", "));
    }
    Ok(())
}
