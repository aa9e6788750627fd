use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::warn;

use voicenav::command::{PhraseTable, resolve};
use voicenav::config::{Config, SourceKind};
use voicenav::session::SessionController;
use voicenav::source::{LineSource, SourceEvent, StopHandle, TranscriptSource};

#[derive(Parser)]
#[command(name = "voicenav")]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a single phrase and print the command event
    Resolve {
        /// The phrase, as it would arrive from recognition
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Run a session reading utterances from stdin, one per line
    Listen,
    /// Replay utterances from a file, one per line
    Replay {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = Config::load_from(&cli.config);
    let phrases = config.phrase_table();

    match cli.command {
        Command::Resolve { text } => {
            let text = text.join(" ");
            let event = resolve(text.trim(), &phrases);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Command::Listen => {
            let (tx, rx) = flume::unbounded();
            let source = match config.source.kind {
                SourceKind::Stdin => {
                    let source = LineSource::new(BufReader::new(std::io::stdin()), tx);
                    let stop = source.stop_handle();
                    Some((Box::new(source) as Box<dyn TranscriptSource>, stop))
                }
                SourceKind::None => None,
            };
            run_session(source, rx, phrases)?;
        }
        Command::Replay { file } => {
            let (tx, rx) = flume::unbounded();
            let source = LineSource::new(BufReader::new(File::open(&file)?), tx);
            let stop = source.stop_handle();
            run_session(
                Some((Box::new(source) as Box<dyn TranscriptSource>, stop)),
                rx,
                phrases,
            )?;
        }
    }

    Ok(())
}

fn run_session(
    source: Option<(Box<dyn TranscriptSource>, StopHandle)>,
    events: flume::Receiver<SourceEvent>,
    phrases: PhraseTable,
) -> Result<()> {
    let (source, stop) = match source {
        Some((source, stop)) => (Some(source), Some(stop)),
        None => (None, None),
    };

    let mut controller = SessionController::new(
        source,
        events,
        phrases,
        Box::new(|event| match serde_json::to_string(&event) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "failed to encode command event"),
        }),
    );
    let state = controller.state();

    if !state.is_supported() {
        println!("Voice navigator: {}.", state.status());
        return Ok(());
    }

    if let Some(stop) = stop {
        ctrlc::set_handler(move || stop.request_stop())?;
    }

    controller.start();
    println!(
        "Voice navigator: {}. One utterance per line, Ctrl+C or end of input to finish.",
        state.status()
    );
    controller.run();

    match state.last_transcript() {
        Some(phrase) => println!("Session ended. Last phrase: {}", phrase),
        None => println!("Session ended."),
    }
    Ok(())
}
