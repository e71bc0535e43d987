//! airtouch-replay - run the gesture pipeline over recorded landmark frames.
//!
//! Reads one frame s-expression per line and prints the resulting input
//! events, one s-expression per line, on stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

use airtouch::replay::parse_frame;
use airtouch::{InputEvent, PipelineConfig, Session};

#[derive(Parser, Debug)]
#[command(name = "airtouch-replay", about = "Replay landmark frames through the gesture pipeline")]
struct Cli {
    /// Frame file, one s-expression per line (default: stdin)
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Config plist file overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inline config plist, applied after --config
    #[arg(long)]
    set: Option<String>,

    #[arg(long)]
    screen_width: Option<u32>,

    #[arg(long)]
    screen_height: Option<u32>,

    /// Mirror the cursor horizontally
    #[arg(long)]
    mirror: bool,

    /// Emit cursor motion events
    #[arg(long)]
    cursor: bool,

    /// Print the session status after the last frame
    #[arg(long)]
    status: bool,

    /// Print the effective config and exit
    #[arg(long)]
    print_config: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = PipelineConfig::default();
    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        config
            .apply_sexp(&text)
            .with_context(|| format!("applying config {}", path.display()))?;
    }
    if let Some(text) = &cli.set {
        config.apply_sexp(text).context("applying --set")?;
    }
    if let Some(w) = cli.screen_width {
        config.cursor.screen_width = w;
    }
    if let Some(h) = cli.screen_height {
        config.cursor.screen_height = h;
    }
    if cli.mirror {
        config.cursor.mirror = true;
    }
    if cli.cursor {
        config.cursor.enabled = true;
    }
    config.validate().context("validating config")?;
    Ok(config)
}

fn write_events(out: &mut impl Write, events: &[InputEvent]) -> io::Result<()> {
    for event in events {
        writeln!(out, "{}", event.to_sexp())?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("airtouch-replay {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logs go to stderr; stdout carries events.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airtouch=info".into()),
        )
        .init();

    let config = load_config(&cli)?;
    if cli.print_config {
        println!("{}", config.config_sexp());
        return Ok(());
    }

    info!("airtouch-replay v{} starting", env!("CARGO_PKG_VERSION"));

    let input: Box<dyn BufRead> = match &cli.frames {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut session = Session::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut frames = 0u64;
    let mut skipped = 0u64;

    for (lineno, line) in input.lines().enumerate() {
        let line = line.context("reading frames")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let frame = match parse_frame(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("line {}: {}", lineno + 1, e);
                skipped += 1;
                continue;
            }
        };
        let events = session
            .process_frame(&frame)
            .with_context(|| format!("processing line {}", lineno + 1))?;
        if !events.is_empty() {
            debug!("t={} events={}", frame.timestamp_ms, events.len());
        }
        write_events(&mut out, &events)?;
        frames += 1;
    }

    write_events(&mut out, &session.shutdown())?;
    if cli.status {
        writeln!(out, "{}", session.status_sexp())?;
    }
    info!("Processed {} frames ({} skipped)", frames, skipped);
    Ok(())
}
