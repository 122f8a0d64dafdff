mod conf;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{command, value_parser, Arg, ArgAction, ArgMatches};
use human_bytes::human_bytes;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use es_bulk_action::{BulkAction, BulkPayload};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to load config {path:?}: {source}")]
    Config {
        path: Option<PathBuf>,
        source: twelf::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("line {line}: invalid bulk action: {source}")]
    InvalidAction {
        line: usize,
        source: serde_json::Error,
    },
}

/// Actions accepted from the input plus how many lines were dropped.
#[derive(Debug, Default)]
struct ParsedInput {
    actions: Vec<BulkAction>,
    skipped: usize,
}

fn parse_actions(text: &str, config: &conf::Config, debug: bool) -> Result<ParsedInput, CliError> {
    let mut parsed = ParsedInput::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let action = match serde_json::from_str::<BulkAction>(line) {
            Ok(action) => config.apply_defaults(action),
            Err(source) if config.is_skip_invalid() => {
                warn!("Skipping line {}: {}", line_no, source);
                parsed.skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(CliError::InvalidAction {
                    line: line_no,
                    source,
                })
            }
        };

        if action.source_breaks_framing() {
            if config.is_reject_framing_hazards() {
                warn!("Skipping line {}: source contains a raw line break", line_no);
                parsed.skipped += 1;
                continue;
            }
            warn!(
                "Line {}: source contains a raw line break, the bulk request will be rejected",
                line_no
            );
        }

        debug_if!(debug, "Line {}: {:?}", line_no, action);
        parsed.actions.push(action);
    }

    Ok(parsed)
}

async fn run(matches: &ArgMatches, debug: bool) -> Result<(), CliError> {
    let config_path = matches.get_one::<PathBuf>("config").cloned();
    let config = conf::Config::load(config_path.as_deref()).map_err(|source| CliError::Config {
        path: config_path.clone(),
        source,
    })?;
    debug!("Config loaded ... {:?}", config);

    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .unwrap_or_default();
    let text = tokio::fs::read_to_string(&input)
        .await
        .map_err(|source| CliError::Read {
            path: input.clone(),
            source,
        })?;

    let parsed = parse_actions(&text, &config, debug)?;
    let payload: BulkPayload = parsed.actions.iter().collect();

    match matches.get_one::<PathBuf>("output") {
        Some(path) => tokio::fs::write(path, payload.as_str()).await?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(payload.as_str().as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    info!(
        "Encoded {} actions ({} skipped), payload size {}, content-type {}",
        payload.action_count(),
        parsed.skipped,
        human_bytes(payload.len_bytes() as f64),
        BulkPayload::content_type()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = command!() // requires `cargo` feature
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("File with one JSON bulk action per line")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the bulk body here instead of stdout")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Sets a config file (TOML or JSON)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug mode")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    let default_level = if debug { "debug" } else { "info" };

    // Logs go to stderr so the payload on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();

    match run(&matches, debug).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
