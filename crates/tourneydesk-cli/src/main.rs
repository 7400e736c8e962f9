//! tourneydesk - command-line front end for tournament administration.
//!
//! Wires the core library together: login, listing, statistics, search and
//! subscriptions against the REST backend.

mod app;
mod views;

use std::io;

use anyhow::{anyhow, bail, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tourneydesk_core::search::SearchResultType;

use app::App;

/// Directory for the daily rolling log file; file logging is off when unset
const LOG_DIR_ENV: &str = "TOURNEYDESK_LOG_DIR";

const USAGE: &str = "\
Usage: tourneydesk <command> [args]

Commands:
  login [username]                    Log in and store the session
  logout                              Clear the stored session
  ping                                Check that the backend is reachable
  whoami                              Show the current session
  users                               List backend users
  list <entity>                       List championships, teams, participants,
                                      matches, subscriptions or participant-stats
  stats                               Per-player totals from match statistics
  leaderboard [top]                   Players ranked by KDA
  team-record <team-id>               Wins, losses and recent matches of a team
  search <query> [--types a,b]        Search championships, teams, players,
                                      coaches and matches
  subscribe <team-id> <championship>  Enroll a team in a championship

Options:
  --json                              Print users, stats, leaderboard and
                                      search results as JSON";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // RUST_LOG controls the level, e.g. RUST_LOG=tourneydesk_core=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "tourneydesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _log_guard = init_tracing();

    let (json, args) = split_json_flag(std::env::args().skip(1).collect());
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    if matches!(command.as_str(), "help" | "-h" | "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    info!(command = %command, "tourneydesk starting");
    let mut app = App::new(json).await?;
    let result = run(&mut app, command, &args[1..]).await;
    app.flush_notifications();
    result
}

async fn run(app: &mut App, command: &str, rest: &[String]) -> Result<()> {
    match command {
        "login" => app.login(rest.first().map(String::as_str)).await,
        "logout" => app.logout(),
        "ping" => app.ping().await,
        "whoami" => app.whoami(),
        "users" => app.users().await,
        "list" => app.list(required(rest, 0, "list <entity>")?).await,
        "stats" => app.stats().await,
        "leaderboard" => {
            let top = match rest.first() {
                Some(n) => Some(n.parse().map_err(|_| anyhow!("Invalid count '{}'", n))?),
                None => None,
            };
            app.leaderboard(top).await
        }
        "team-record" => app.team_record(required(rest, 0, "team-record <team-id>")?).await,
        "search" => {
            let (query, types) = parse_search_args(rest)?;
            app.search(&query, types).await
        }
        "subscribe" => {
            let usage = "subscribe <team-id> <championship-id>";
            let team = required(rest, 0, usage)?;
            let championship = required(rest, 1, usage)?;
            app.subscribe(team, championship).await
        }
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

/// Remove every `--json` from `args`, reporting whether one was present
fn split_json_flag(args: Vec<String>) -> (bool, Vec<String>) {
    let (flags, rest): (Vec<String>, Vec<String>) = args.into_iter().partition(|a| a == "--json");
    (!flags.is_empty(), rest)
}

fn required<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Usage: tourneydesk {}", usage))
}

/// Split `search` arguments into the query text and the allowed types.
/// No `--types` means every type.
fn parse_search_args(args: &[String]) -> Result<(String, Vec<SearchResultType>)> {
    let mut words = Vec::new();
    let mut types = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--types" {
            let list = iter
                .next()
                .ok_or_else(|| anyhow!("--types needs a comma-separated list"))?;
            for name in list.split(',').filter(|s| !s.trim().is_empty()) {
                types.push(name.parse::<SearchResultType>().map_err(|e| anyhow!(e))?);
            }
        } else {
            words.push(arg.as_str());
        }
    }
    Ok((words.join(" "), types))
}
