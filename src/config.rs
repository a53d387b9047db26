use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "player-finder")]
#[command(about = "Proxy that looks up the player list of a game server")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Prebuilt UI bundle, served for every path the API does not own
    #[arg(short, long, default_value = "frontend/dist")]
    pub static_dir: PathBuf,

    // Rate limit max requests per window (0 disables the limiter)
    #[arg(long, default_value_t = 120)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 900)]
    pub rate_window: u64,

    // Timeout for the players.json fetch, in seconds
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout: u64,

    // Largest players.json body relayed, in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    // How often expired rate limit windows are dropped, in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval: u64,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}
