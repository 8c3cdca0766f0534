use std::path::PathBuf;

use clap::Args;

use crate::constants::{DEFAULT_API_URL, DEFAULT_WS_URL, STATE_DIR_NAME};

/// Endpoints and local state location shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL of the REST API
    #[arg(long, global = true, env = "NSE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Websocket endpoint streaming live quotes
    #[arg(long, global = true, env = "NSE_WS_URL", default_value = DEFAULT_WS_URL)]
    pub ws_url: String,

    /// Directory holding the persisted session and chart selection
    #[arg(long, global = true, env = "NSE_TICKER_HOME", default_value_os_t = default_state_dir())]
    pub state_dir: PathBuf,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR_NAME)
}
