use clap::Parser; // for cli
use player_finder::{AppState, Args, rate_limit::window_sweeper, server};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "player_finder=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    // creating shared state
    let state = Arc::new(AppState::new(&args)?);

    // spawn the background sweeper
    let sweeper_state = Arc::clone(&state);
    let sweep_interval = args.sweep_interval();
    tokio::spawn(async move {
        window_sweeper(sweeper_state, sweep_interval).await;
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;

    tracing::info!(port = args.port, "player-finder listening");
    tracing::info!(
        static_dir = %args.static_dir.display(),
        fetch_timeout_secs = args.fetch_timeout,
        "Serving UI bundle, fetching players.json over plain HTTP"
    );
    tracing::info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );

    server::serve(listener, state).await?;
    Ok(())
}
