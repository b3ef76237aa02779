use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// Default period of the client liveness probe cycle.
const LIVENESS_PERIOD: Duration = Duration::from_secs(30);

/// Default cadence of the position poll.
const POSITION_POLL_PERIOD: Duration = Duration::from_millis(100);

/// Default delay between player reconnection attempts.
const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Bridge one MPRIS player to WebSocket subscribers.
#[derive(Parser, Debug)]
#[command(name = "mpris-relay", version, about)]
pub struct Cli {
    /// MPRIS player to bind, as in org.mpris.MediaPlayer2.<player>
    #[arg(short, long, default_value = "audacious")]
    pub player: String,

    /// Port to serve WebSocket clients and the browser UI on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory of static files for the browser UI
    #[arg(long, default_value = "public")]
    pub static_dir: PathBuf,

    /// Answer "ping" text frames with plain "pong" instead of the position
    #[arg(long)]
    pub plain_pong: bool,
}

/// Runtime configuration assembled from CLI arguments.
///
/// The three periods are plain fields rather than constants so tests can
/// shrink them.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Short player name, e.g. "audacious".
    pub player: String,

    /// Serving port.
    pub port: u16,

    /// Static file directory for the browser UI.
    pub static_dir: PathBuf,

    /// Reply "pong" to "ping" text frames instead of the current position.
    pub plain_pong: bool,

    /// Period of the client liveness probe cycle.
    pub liveness_period: Duration,

    /// Cadence of the position poll.
    pub poll_period: Duration,

    /// Fixed delay between player reconnection attempts.
    pub reconnect_delay: Duration,
}

impl RelayConfig {
    /// Well-known bus name of the configured player.
    pub fn bus_name(&self) -> String {
        format!("org.mpris.MediaPlayer2.{}", self.player)
    }
}

impl From<Cli> for RelayConfig {
    fn from(cli: Cli) -> Self {
        Self {
            player: cli.player,
            port: cli.port,
            static_dir: cli.static_dir,
            plain_pong: cli.plain_pong,
            liveness_period: LIVENESS_PERIOD,
            poll_period: POSITION_POLL_PERIOD,
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}
