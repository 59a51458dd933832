// =============================================================================
// Meridian Bot — Main Entry Point
// =============================================================================
//
// The bot starts in paper mode against the synthetic market; live venue
// clients plug into the same two traits without touching the core.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod config;
mod engine;
mod error;
mod exchange;
mod indicators;
mod market_data;
mod risk;
mod sim;
mod strategy;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::BotConfig;
use crate::engine::TradingEngine;
use crate::exchange::MarketData;
use crate::sim::{PaperVenue, SyntheticMarket};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║            Meridian Bot — Starting Up                    ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = BotConfig::load("bot_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        BotConfig::default()
    });
    config.apply_env_overrides();

    info!(
        trade_pair = %config.trade_pair,
        time_frame = %config.time_frame,
        history_size = config.history_size,
        tick_secs = config.tick_secs,
        tolerance = config.tolerance,
        "Configuration resolved (paper mode)"
    );

    // ── 2. Paper collaborators ───────────────────────────────────────────
    let market = Arc::new(SyntheticMarket::default());
    let venue = Arc::new(PaperVenue::new(10_000.0));

    let mut bot = TradingEngine::new(config.clone(), market.clone(), venue.clone());

    // ── 3. Evaluation loop ───────────────────────────────────────────────
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(config.tick_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("Evaluation loop running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Revalue the paper position at the current synthetic price
                // so the venue reports fresh profit/loss.
                if let Ok(ticker) = market.fetch_ticker(&config.trade_pair) {
                    venue.mark(ticker.last_price);
                }

                match bot.run_cycle() {
                    Ok(report) => {
                        info!(
                            mts = report.mts,
                            action = %report.action,
                            position = %report.position_before,
                            pl_perc = report.risk.pl_perc,
                            "cycle report"
                        );
                        match serde_json::to_string(&report) {
                            Ok(json) => tracing::debug!(report = %json, "cycle report json"),
                            Err(e) => warn!(error = %e, "cycle report serialization failed"),
                        }
                    }
                    Err(e) => {
                        // Leave all state untouched and retry next tick.
                        error!(error = %e, "cycle failed");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Shutdown signal received — stopping gracefully");
                break;
            }
        }
    }

    info!("Meridian Bot shut down complete.");
    Ok(())
}
