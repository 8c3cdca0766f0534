use clap::{Parser, Subcommand};

use crate::auth::{SignInArgs, SignUpArgs};
use crate::chart::ChartArgs;
use crate::config::Settings;
use crate::live::LiveArgs;
use crate::sidebar::SidebarArgs;

#[derive(Debug, Parser)]
#[command(author, version, about = "Live NSE quotes, sidebar movers and price charts in the terminal")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and remember the session token
    Signin(SignInArgs),
    /// Create a new account
    Signup(SignUpArgs),
    /// Forget the session and every stored selection
    Logout,
    /// Show the current session
    Whoami,
    /// Show one of the top-20 sidebar lists
    Sidebar(SidebarArgs),
    /// Stream the live quote table
    Live(LiveArgs),
    /// Fetch and draw the price history of a symbol
    Chart(ChartArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Live(LiveArgs::default())
    }
}
