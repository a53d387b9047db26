use std::path::PathBuf;
use crate::config::Args;
use crate::fetcher::PlayerFetcher;
use crate::rate_limit::RequestGate;
// app's shared state

pub struct AppState {
    pub fetcher: PlayerFetcher,
    pub gate: RequestGate,     // only state shared between requests
    pub static_dir: PathBuf,   // prebuilt UI bundle
}

impl AppState {
    pub fn new(args: &Args) -> Result<Self, reqwest::Error> {
        Ok(Self {
            fetcher: PlayerFetcher::new(args.fetch_timeout(), args.max_body_bytes)?,
            gate: RequestGate::new(args.rate_limit, args.rate_window()),
            static_dir: args.static_dir.clone(),
        })
    }
}
