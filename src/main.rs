use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, LevelFilter};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use youtube_captions_lib::captions::{
    source, ErrorClass, OutputMode, RevisionPreference, SelectionCriteria, SourceConfig,
    TranscriptError,
};

/// Resolve YouTube links into caption tracks and transcripts
#[derive(Parser, Debug)]
#[command(name = "youtube-captions", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    source: SourceArgs,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Python interpreter with youtube_transcript_api installed
    #[arg(long, global = true)]
    python: Option<String>,

    /// HTTP(S) proxy for caption requests
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Timeout per caption library call, in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Caption library revision: auto, client (new) or static (old)
    #[arg(long, global = true)]
    revision: Option<RevisionPreference>,

    /// Config file (defaults to <config dir>/youtube-captions/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available caption languages for a video
    Languages {
        /// YouTube URL or 11-character video id
        reference: String,
    },

    /// Fetch captions for a video
    Captions(CaptionsArgs),

    /// Show which caption library revision would be used
    Status,
}

#[derive(Args, Debug)]
struct CaptionsArgs {
    /// YouTube URL or 11-character video id
    reference: String,

    /// Language code of the track to fetch
    #[arg(short, long)]
    lang: Option<String>,

    /// Position of the track in the `languages` listing (takes priority over --lang)
    #[arg(short, long)]
    index: Option<usize>,

    /// Translate the selected track into this language
    #[arg(short, long)]
    translate: Option<String>,

    /// Prefix each line with HH:MM:SS.mmm (implies --text)
    #[arg(long)]
    timestamps: bool,

    /// Print one text blob instead of timed segments
    #[arg(long)]
    text: bool,
}

impl CaptionsArgs {
    fn criteria(&self) -> SelectionCriteria {
        let output = if self.text || self.timestamps {
            OutputMode::Text
        } else {
            OutputMode::Segments
        };

        SelectionCriteria::from_options(self.index, self.lang.clone(), self.translate.clone())
            .with_timestamps(self.timestamps)
            .with_output(output)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(args: &SourceArgs) -> Result<SourceConfig> {
    let config = SourceConfig::load(args.config.as_deref())?
        .with_python(args.python.clone())
        .with_proxy(args.proxy.clone())
        .with_timeout(args.timeout)
        .with_revision(args.revision);
    config.validate()?;

    debug!("[Main] Effective config: {:?}", config);
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

fn exit_code(error: &TranscriptError) -> ExitCode {
    match error.class() {
        ErrorClass::Failure => ExitCode::from(1),
        ErrorClass::BadRequest => ExitCode::from(2),
        ErrorClass::NotFound => ExitCode::from(3),
        ErrorClass::RetryLater => ExitCode::from(4),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli.source)?;

    let outcome = match &cli.command {
        Command::Status => {
            print_json(&source::status(&config).await)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Languages { reference } => {
            let resolver = youtube_captions_lib::resolver(&config).await;
            resolver.list_tracks(reference).await.map(serde_json::to_value)
        }
        Command::Captions(args) => {
            let resolver = youtube_captions_lib::resolver(&config).await;
            debug!("[Main] Source: {}", resolver.source().name());
            resolver
                .fetch_transcript(&args.reference, &args.criteria())
                .await
                .map(serde_json::to_value)
        }
    };

    match outcome {
        Ok(value) => {
            print_json(&value.context("Failed to serialize result")?)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            print_json(&e.to_body())?;
            Ok(exit_code(&e))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
