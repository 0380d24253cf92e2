//! squeezectl - command line Squeezebox controller

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use squeezebox_controller::commands::{resolve_command, Query, SearchType};
use squeezebox_controller::config::Config;
use squeezebox_controller::utils::{expand, rank, score_with, CandidateOption, Strategy};
use squeezebox_controller::{
    Direction, SearchRequest, Session, SqueezeBoxController, SqueezeError, SqueezeResult,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Server address (overrides config)
    #[arg(long)]
    server: Option<String>,

    /// Server port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the players known to the server
    Players,

    /// Send a catalog command, e.g. "pause" or "turn it up"
    Command {
        #[arg(short, long)]
        player: Option<String>,
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Search for music and play it
    Play {
        #[arg(short, long)]
        player: Option<String>,
        /// SONG, ALBUM, ARTIST, GENRE or PLAYLIST (default: all)
        #[arg(short = 't', long = "type")]
        search_type: Option<String>,
        /// Play after the current track
        #[arg(long, conflicts_with = "end")]
        next: bool,
        /// Queue at the end of the playlist
        #[arg(long)]
        end: bool,
        /// Search Spotify instead of the local library
        #[arg(long, conflicts_with_all = ["next", "end"])]
        spotify: bool,
        #[arg(required = true)]
        term: Vec<String>,
    },

    /// Set the volume (0-100)
    Volume {
        #[arg(short, long)]
        player: Option<String>,
        percent: String,
    },

    /// Sleep after a number of minutes
    Sleep {
        #[arg(short, long)]
        player: Option<String>,
        minutes: String,
    },

    /// Move the music to (or, with --from, from) another player
    Send {
        #[arg(short, long)]
        player: Option<String>,
        #[arg(long)]
        from: bool,
        other: String,
    },

    /// Sync a player to another one
    Sync {
        #[arg(short, long)]
        player: Option<String>,
        other: String,
    },

    /// Ask a player: volume, now-playing or raw
    Query {
        #[arg(short, long)]
        player: Option<String>,
        #[arg(default_value = "now playing")]
        query: String,
    },

    /// Score two strings (offline)
    Score {
        a: String,
        b: String,
        /// Use the faster odd-length block search
        #[arg(long)]
        strided: bool,
    },

    /// Expand an alternation pattern (offline)
    Expand { pattern: String },

    /// Rank a query against LABEL or LABEL=pattern;pattern options (offline)
    Match {
        query: String,
        #[arg(short, long = "option", required = true)]
        options: Vec<String>,
        #[arg(short, long)]
        threshold: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(server) = &args.server {
        config.server_ip = server.clone();
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    init_logging(args.verbose, &config.log_level);
    debug!("squeezectl v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args.command, &config).await {
        Ok(Some(remembered)) => {
            if config.default_player.as_deref() != Some(remembered.as_str()) {
                config.default_player = Some(remembered);
                config.save().context("Failed to save config")?;
            }
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) if e.is_user_facing() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn init_logging(verbose: bool, config_level: &str) {
    let default = if verbose {
        "debug".to_string()
    } else {
        config_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Run one subcommand; returns the player to remember, if any
async fn run(command: Cmd, config: &Config) -> SqueezeResult<Option<String>> {
    let threshold = config.match_threshold;

    // Offline commands never touch the server
    match &command {
        Cmd::Score { a, b, strided } => {
            let strategy = if *strided {
                Strategy::Strided
            } else {
                Strategy::Exhaustive
            };
            println!("{}", score_with(a, b, strategy));
            return Ok(None);
        }
        Cmd::Expand { pattern } => {
            for phrase in expand(pattern)? {
                println!("{}", phrase);
            }
            return Ok(None);
        }
        Cmd::Match {
            query,
            options,
            threshold: explicit,
        } => {
            let options: Vec<CandidateOption> = options.iter().map(|o| parse_option(o)).collect();
            match rank(query, &options, explicit.unwrap_or(threshold))? {
                Some(m) => println!("{} ({})", m.label, m.score),
                None => println!("No match"),
            }
            return Ok(None);
        }
        _ => {}
    }

    let controller = SqueezeBoxController::connect(config, None).await?;
    let mut session = Session::with_player(config.default_player.clone());

    let resolve = |name: &Option<String>| -> SqueezeResult<Option<String>> {
        match name {
            Some(name) => controller
                .resolve_player(name, threshold)?
                .map(Some)
                .ok_or_else(|| {
                    SqueezeError::Request(format!(
                        "player must be one of: {}",
                        controller.players().names().join(", ")
                    ))
                }),
            None => Ok(None),
        }
    };

    match command {
        Cmd::Players => {
            for (name, mac) in controller.players().entries() {
                println!("{}\t{}", name, mac);
            }
            return Ok(None);
        }
        Cmd::Command { player, text } => {
            let player = resolve(&player)?;
            let text = text.join(" ");
            let spec = resolve_command(&text, threshold)?
                .ok_or_else(|| SqueezeError::User(format!("No command matching: {}", text)))?;
            info!("Resolved '{}' to {}", text, spec.name);
            controller
                .simple_command(&mut session, player.as_deref(), spec.name)
                .await?;
        }
        Cmd::Play {
            player,
            search_type,
            next,
            end,
            spotify,
            term,
        } => {
            let player = resolve(&player)?;
            let search_type = search_type
                .as_deref()
                .map(str::parse::<SearchType>)
                .transpose()?;
            let request = SearchRequest::new(term.join(" "), search_type);
            let reply = if spotify {
                controller
                    .spotify_search_and_play(&mut session, player.as_deref(), &request)
                    .await?
            } else if next {
                controller
                    .search_and_play_next(&mut session, player.as_deref(), &request)
                    .await?
            } else if end {
                controller
                    .search_and_play_end(&mut session, player.as_deref(), &request)
                    .await?
            } else {
                controller
                    .search_and_play(&mut session, player.as_deref(), &request)
                    .await?
            };
            println!("{}", reply);
        }
        Cmd::Volume { player, percent } => {
            let player = resolve(&player)?;
            controller
                .set_volume(&mut session, player.as_deref(), &percent)
                .await?;
        }
        Cmd::Sleep { player, minutes } => {
            let player = resolve(&player)?;
            controller
                .sleep_in(&mut session, player.as_deref(), &minutes)
                .await?;
        }
        Cmd::Send {
            player,
            from,
            other,
        } => {
            let player = resolve(&player)?;
            let other = resolve(&Some(other))?.unwrap_or_default();
            let direction = if from { Direction::From } else { Direction::To };
            controller
                .send_music(&mut session, player.as_deref(), &other, direction)
                .await?;
        }
        Cmd::Sync { player, other } => {
            let player = resolve(&player)?;
            let other = resolve(&Some(other))?.unwrap_or_default();
            controller
                .sync_player(&mut session, player.as_deref(), &other)
                .await?;
        }
        Cmd::Query { player, query } => {
            let player = resolve(&player)?;
            let query: Query = query.parse()?;
            let reply = controller
                .simple_query(&mut session, player.as_deref(), query)
                .await?;
            println!("{}", reply);
        }
        Cmd::Score { .. } | Cmd::Expand { .. } | Cmd::Match { .. } => {}
    }

    Ok(session.cached_player().map(str::to_string))
}

/// `LABEL` or `LABEL=pattern;pattern`
fn parse_option(raw: &str) -> CandidateOption {
    match raw.split_once('=') {
        Some((label, patterns)) => CandidateOption::with_synonyms(
            label.trim(),
            patterns.split(';').map(str::trim).filter(|p| !p.is_empty()),
        ),
        None => CandidateOption::bare(raw.trim()),
    }
}
