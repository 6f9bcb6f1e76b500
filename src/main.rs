//! write-influxdb - standalone driver for the InfluxDB write agent
//!
//! Loads the agent options, validates them, then feeds events read as JSON
//! lines through a single receive cycle.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use write_influxdb::agent::DESCRIPTION;
use write_influxdb::config::{load_options_from_env, load_options_from_file};
use write_influxdb::sink::{HttpLineSink, LineSink, StdoutLineSink};
use write_influxdb::{Event, WriteInfluxdbAgent};

/// Exit status when the options fail validation
const EXIT_INVALID_OPTIONS: i32 = 1;
/// Exit status when a write failed during the run
const EXIT_NOT_WORKING: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "write-influxdb",
    about = "Write line protocol statements from events to InfluxDB",
    long_about = DESCRIPTION,
    version
)]
struct Args {
    /// JSON file holding the agent options (default: INFLUXDB_* environment variables)
    #[arg(long, value_name = "PATH")]
    options: Option<PathBuf>,

    /// File with one JSON event per line (default: stdin)
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,

    /// Validate the options and exit
    #[arg(long)]
    check: bool,

    /// Print each request to stdout instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let options = match &args.options {
        Some(path) => load_options_from_file(path)?,
        None => load_options_from_env(),
    };

    let sink: Arc<dyn LineSink> = if args.dry_run {
        Arc::new(StdoutLineSink::new())
    } else {
        Arc::new(HttpLineSink::new())
    };

    let mut agent = match WriteInfluxdbAgent::new(options, sink) {
        Ok(agent) => agent,
        Err(errors) => {
            for message in errors.messages() {
                error!("{}", message);
            }
            std::process::exit(EXIT_INVALID_OPTIONS);
        }
    };

    if args.check {
        info!("Options are valid");
        return Ok(());
    }

    let events = match &args.events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Cannot open events file {}", path.display()))?;
            read_events(BufReader::new(file), path).await?
        }
        None => read_events(BufReader::new(tokio::io::stdin()), Path::new("<stdin>")).await?,
    };

    if events.is_empty() {
        info!("No events to process");
        return Ok(());
    }

    let report = agent.receive(&events).await;
    info!(
        "Receive cycle finished: {} events, {} of {} lines written",
        report.events, report.lines_succeeded, report.lines_attempted
    );

    if !agent.working() {
        error!("Agent reported errors during the receive cycle");
        std::process::exit(EXIT_NOT_WORKING);
    }

    Ok(())
}

/// Parse one event per non-blank line; malformed lines are logged and skipped
async fn read_events<R>(reader: R, source: &Path) -> Result<Vec<Event>>
where
    R: AsyncBufRead + Unpin,
{
    let mut events = Vec::new();
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("Cannot read events from {}", source.display()))?
    {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        match Event::from_json_line(&line) {
            Ok(event) => events.push(event),
            Err(e) => warn!(
                "Skipping event on line {} of {}: {}",
                line_number,
                source.display(),
                e
            ),
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_events_skips_blank_and_malformed_lines() {
        let input = b"{\"payload\": [\"m v=1\"]}\n\nnot json\n[1, 2]\n{\"host\": \"a\"}\n";

        let events = read_events(BufReader::new(&input[..]), Path::new("test"))
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload_lines(), vec!["m v=1"]);
        assert!(events[1].payload_lines().is_empty());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "write-influxdb",
            "--options",
            "agent.json",
            "--dry-run",
        ]);

        assert_eq!(args.options, Some(PathBuf::from("agent.json")));
        assert!(args.dry_run);
        assert!(!args.check);
        assert!(args.events.is_none());
    }
}
