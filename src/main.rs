//! Command-line front end for the replay-matchmaking SDK
//!
//! Joins and leaves queues, follows a session until it is matched or gives
//! up, and prints pool statistics, using the same SDK calls the web UI makes.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use replay_matchmaking::config::AppConfig;
use replay_matchmaking::metrics::MetricsCollector;
use replay_matchmaking::utils::format_wait;
use replay_matchmaking::{
    JoinQueueRequest, MatchmakingError, MatchmakingSdk, PollCallbacks, PoolStats,
    QueuePreferences, QueueSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Replay Matchmaking - queue sessions and pool stats from the terminal
#[derive(Parser)]
#[command(
    name = "replay-matchmaking",
    version,
    about = "Join matchmaking queues, follow sessions and inspect pool health",
    long_about = "Replay Matchmaking drives the replay-api matchmaking endpoints: it joins and \
                 leaves queues, polls session status with exponential backoff until a match is \
                 found, and refreshes pool statistics on a fixed period."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        global = true,
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Backend URL override
    #[arg(long, value_name = "URL", global = true, help = "Override replay-api base URL")]
    api_url: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        global = true,
        help = "Validate configuration and exit without contacting the backend"
    )]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the queue and follow the session until it resolves
    Join {
        /// Player ID
        #[arg(short, long)]
        player: String,
        /// Game ID
        #[arg(short, long)]
        game: String,
        /// Game mode
        #[arg(short, long, default_value = "competitive")]
        mode: String,
        /// Region
        #[arg(short, long, default_value = "eu-west")]
        region: String,
        /// Player MMR
        #[arg(long, default_value = "1000")]
        mmr: u32,
        /// Squad ID when queueing as a group
        #[arg(long)]
        squad: Option<String>,
        /// Subscription tier
        #[arg(long, default_value = "free")]
        tier: String,
        /// Return right after joining instead of following the session
        #[arg(long)]
        no_follow: bool,
    },
    /// Print the current state of a session
    Status {
        /// Session ID
        session_id: String,
    },
    /// Leave the queue
    Leave {
        /// Session ID
        session_id: String,
    },
    /// Follow an existing session until it resolves
    Watch {
        /// Session ID
        session_id: String,
    },
    /// Show pool statistics
    Pool {
        /// Game ID
        #[arg(short, long)]
        game: String,
        /// Game mode filter
        #[arg(short, long)]
        mode: Option<String>,
        /// Region filter
        #[arg(short, long)]
        region: Option<String>,
        /// Keep refreshing until Ctrl+C
        #[arg(short, long)]
        follow: bool,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(api_url) = &args.api_url {
        config.api.base_url = api_url.clone();
    }

    replay_matchmaking::config::validate_config(&config)?;
    Ok(config)
}

/// Display startup banner with client settings
fn display_startup_banner(config: &AppConfig) {
    info!("Replay Matchmaking {}", replay_matchmaking::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Backend: {}", config.api.base_url);
    info!("   Request timeout: {}ms", config.api.request_timeout_ms);
    info!(
        "   Polling: {}ms initial, {}ms max, {} retries",
        config.polling.initial_interval_ms,
        config.polling.max_interval_ms,
        config.polling.max_retries
    );
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

fn print_session(session: &QueueSession) {
    println!("Session {}", session.session_id);
    println!("  Status: {}", session.status);
    println!("  Queue position: {}", session.queue_position);
    println!(
        "  Estimated wait: {}",
        format_wait(u64::from(session.estimated_wait_seconds))
    );
    println!("  Elapsed: {}", format_wait(session.elapsed_seconds));
    if let Some(match_id) = &session.match_id {
        println!("  Match: {}", match_id);
    }
}

fn print_pool(stats: &PoolStats) {
    println!(
        "Pool {} ({} / {} / {})",
        stats.pool_id, stats.game_id, stats.game_mode, stats.region
    );
    println!("  Health: {}", stats.queue_health);
    println!("  Players: {}", stats.total_players);
    for (tier, count) in &stats.players_by_tier {
        println!("    {}: {}", tier, count);
    }
    println!(
        "  Average wait: {:.1}s, estimated match: {:.1}s",
        stats.average_wait_time_seconds, stats.estimated_match_time_seconds
    );
    println!("  Updated: {}", stats.timestamp.to_rfc3339());
}

/// How following a session ended
enum FollowOutcome {
    Resolved(QueueSession),
    GaveUp,
    Interrupted,
}

enum PollEvent {
    Update(QueueSession),
    Failed { error: String, retry_count: u32 },
}

/// Poll `session_id` until a terminal status, a give-up, or Ctrl+C
async fn follow_session(sdk: &MatchmakingSdk, session_id: &str) -> Result<FollowOutcome> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let error_tx = tx.clone();

    let callbacks = PollCallbacks::new(move |session| {
        let _ = tx.send(PollEvent::Update(session));
    })
    .on_error(move |err: &MatchmakingError, retry_count| {
        let _ = error_tx.send(PollEvent::Failed {
            error: err.to_string(),
            retry_count,
        });
    });
    sdk.start_polling(session_id, callbacks)?;

    let shutdown = wait_for_shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                sdk.stop_polling();
                return Ok(FollowOutcome::Interrupted);
            }
            event = rx.recv() => match event {
                Some(PollEvent::Update(session)) => {
                    println!(
                        "[{}] position {} | wait ~{} | elapsed {}",
                        session.status,
                        session.queue_position,
                        format_wait(u64::from(session.estimated_wait_seconds)),
                        format_wait(session.elapsed_seconds)
                    );
                    if session.status.is_terminal() {
                        return Ok(FollowOutcome::Resolved(session));
                    }
                }
                Some(PollEvent::Failed { error, retry_count }) => {
                    warn!("Status check failed (retry {}): {}", retry_count, error);
                }
                // The poll loop dropped its callbacks: retries exhausted
                None => return Ok(FollowOutcome::GaveUp),
            },
        }
    }
}

/// Follow a session and print how it ended
async fn report_follow(
    sdk: &MatchmakingSdk,
    session_id: &str,
    leave_on_interrupt: bool,
) -> Result<()> {
    match follow_session(sdk, session_id).await? {
        FollowOutcome::Resolved(session) => {
            print_session(&session);
            Ok(())
        }
        FollowOutcome::GaveUp => {
            let snapshot = sdk.poll_snapshot();
            Err(anyhow!(
                "Stopped following session {} after {} consecutive failures",
                session_id,
                snapshot.retry_count
            ))
        }
        FollowOutcome::Interrupted => {
            if leave_on_interrupt {
                info!("Leaving queue before exit...");
                sdk.leave_queue(session_id).await?;
                println!("Left queue (session {})", session_id);
            }
            Ok(())
        }
    }
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let metrics = Arc::new(MetricsCollector::new()?);
    let sdk = MatchmakingSdk::from_config(&config, Some(metrics.clone()))?;

    let result = match args.command {
        Commands::Join {
            player,
            game,
            mode,
            region,
            mmr,
            squad,
            tier,
            no_follow,
        } => {
            let mut preferences = QueuePreferences::new(game, mode, region);
            preferences.tier = tier;
            let request = JoinQueueRequest {
                player_id: player,
                squad_id: squad,
                preferences,
                player_mmr: mmr,
            };

            let session = sdk.join_queue(&request).await?;
            print_session(&session);
            if no_follow {
                Ok(())
            } else {
                report_follow(&sdk, &session.session_id, true).await
            }
        }
        Commands::Status { session_id } => {
            let session = sdk.get_session_status(&session_id).await?;
            print_session(&session);
            Ok(())
        }
        Commands::Leave { session_id } => {
            sdk.leave_queue(&session_id).await?;
            println!("Left queue (session {})", session_id);
            Ok(())
        }
        Commands::Watch { session_id } => report_follow(&sdk, &session_id, false).await,
        Commands::Pool {
            game,
            mode,
            region,
            follow,
        } => {
            if follow {
                let _subscription = sdk.subscribe_to_pool_updates(
                    &game,
                    mode.as_deref(),
                    region.as_deref(),
                    |stats| print_pool(&stats),
                )?;
                wait_for_shutdown_signal().await;
                Ok(())
            } else {
                let stats = sdk
                    .get_pool_stats(&game, mode.as_deref(), region.as_deref())
                    .await?;
                print_pool(&stats);
                Ok(())
            }
        }
    };

    if let Ok(text) = metrics.gather_text() {
        tracing::debug!("Client metrics:\n{}", text);
    }
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without contacting the backend");
        return Ok(());
    }

    if let Err(e) = run(args, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}
