//! territory-stream — 推理会话事件流的命令行观察工具
//!
//! Usage:
//!   territory-stream watch <session-id> [--config <path>] [--json]   Follow a reasoning session
//!   territory-stream version                                           Show version information

use anyhow::{bail, Context};
use std::path::PathBuf;
use std::str::FromStr;
use territory_intel::render::render_event;
use territory_intel::{ClientConfig, ConnectionState, SessionId, StreamClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "watch" => {
            init_tracing();
            cmd_watch(&args[2..]).await
        }
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"territory-stream — 推理会话事件流观察工具

USAGE:
    territory-stream <COMMAND> [OPTIONS]

COMMANDS:
    watch <session-id>          Follow the reasoning stream of a session
        --config <path>         Load configuration from a YAML file
        --json                  Print one JSON timeline entry per line
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    TERRITORY_API_URL           Dashboard base URL
    TERRITORY_API_TOKEN         Bearer token
    RUST_LOG                    Log filter (default: territory_intel=info)"#
    );
}

fn cmd_version() {
    println!("territory-stream {}", env!("CARGO_PKG_VERSION"));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("territory_intel=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct WatchArgs {
    session_id: SessionId,
    config: Option<PathBuf>,
    json: bool,
}

fn parse_watch_args(args: &[String]) -> anyhow::Result<WatchArgs> {
    let mut session_id = None;
    let mut config = None;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            value => {
                if session_id.is_some() {
                    bail!("unexpected argument: {value}");
                }
                session_id = Some(
                    SessionId::from_str(value)
                        .with_context(|| format!("invalid session id: {value}"))?,
                );
            }
        }
    }

    Ok(WatchArgs {
        session_id: session_id.context("watch requires a session id")?,
        config,
        json,
    })
}

async fn cmd_watch(args: &[String]) -> anyhow::Result<()> {
    let args = parse_watch_args(args)?;
    let config = ClientConfig::load(args.config.as_deref()).context("loading configuration")?;

    let mut client = StreamClient::new(config)?;
    let mut status = client.watch_status();
    client.subscribe(Some(args.session_id))?;

    let mut printed = 0usize;
    loop {
        printed = print_new_entries(&client, printed, args.json)?;
        if status.borrow_and_update().connection == ConnectionState::Closed {
            break;
        }

        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                client.unsubscribe();
                break;
            }
        }
    }
    print_new_entries(&client, printed, args.json)?;

    let stats = client.stats();
    eprintln!(
        "session {} closed: {} events, phase {} ({} malformed, {} foreign, {} unknown)",
        args.session_id,
        client.event_count(),
        client.phase_label(),
        stats.malformed,
        stats.foreign,
        stats.unknown,
    );
    Ok(())
}

/// Print log entries from `from` onwards and return the new count.
fn print_new_entries(client: &StreamClient, from: usize, json: bool) -> anyhow::Result<usize> {
    let entries: Vec<_> = client.with_log(|log| {
        log.events()
            .enumerate()
            .skip(from)
            .map(|(index, event)| render_event(index, event))
            .collect()
    });
    for entry in &entries {
        if json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!("{entry}");
        }
    }
    Ok(from + entries.len())
}
