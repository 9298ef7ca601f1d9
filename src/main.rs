//! PricePulse — simulated price-direction prediction mini-game
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the dashboard, and runs the game loop until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use pricepulse::config::AppConfig;
use pricepulse::dashboard::{self, routes::DashboardState, view::DashboardSurface};
use pricepulse::engine::game::Game;
use pricepulse::engine::runner;
use pricepulse::engine::scheduler::IntervalScheduler;
use pricepulse::surface::console::ConsoleSurface;
use pricepulse::surface::Surface;
use pricepulse::types::format_usd;

const BANNER: &str = r#"
 ___     _          ___      _
| _ \_ _(_)__ ___  | _ \_  _| |___ ___
|  _/ '_| / _/ -_) |  _/ || | (_-</ -_)
|_| |_| |_\__\___| |_|  \_,_|_/__/\___|

  Predict the next move. 30 seconds a round.
"#;

const COMMAND_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("PRICEPULSE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");
    info!(
        name = %cfg.game.name,
        tokens = cfg.game.initial_tokens,
        points = cfg.game.initial_points,
        price = %format_usd(cfg.game.initial_price),
        round_secs = cfg.round.duration_secs,
        "PricePulse starting up"
    );

    // -- Presentation ----------------------------------------------------

    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);

    let surface = if cfg.dashboard.enabled {
        let (surface, view) =
            DashboardSurface::channel(cfg.round.reward_points, cfg.round.penalty_points);
        let state = Arc::new(DashboardState::new(&cfg, view, commands_tx.clone()));
        dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;
        Surface::all(Arc::new(surface))
    } else {
        warn!("Dashboard disabled, running headless (price feed only)");
        Surface::all(Arc::new(ConsoleSurface))
    };
    // Only the dashboard keeps a sender.
    drop(commands_tx);

    // -- Game loop -------------------------------------------------------

    let scheduler = IntervalScheduler::new(cfg.feed.tick_interval(), Duration::from_secs(1));
    let mut game = Game::new(&cfg, surface, scheduler);

    info!("Entering game loop. Press Ctrl+C to stop.");
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let summary = runner::run(&mut game, commands_rx, shutdown).await;

    info!(
        tokens = summary.tokens,
        points = summary.points,
        rounds = summary.stats.rounds_played,
        win_rate = format!("{:.1}%", summary.stats.win_rate()),
        "PricePulse shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pricepulse=info"));

    let json_logging = std::env::var("PRICEPULSE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
