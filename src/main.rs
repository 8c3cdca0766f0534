use anyhow::Result;
use clap::Parser;
use nse_ticker::cli::{Cli, Command};
use nse_ticker::{auth, chart, live, logging, sidebar};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env();
    if cli.settings.quiet {
        logging::set_silent(true);
    }

    let settings = &cli.settings;
    match cli.command() {
        Command::Signin(args) => auth::sign_in(args, settings).await,
        Command::Signup(args) => auth::sign_up(args, settings).await,
        Command::Logout => auth::logout(settings),
        Command::Whoami => auth::whoami(settings),
        Command::Sidebar(args) => sidebar::run(args, settings).await,
        Command::Live(args) => live::run(args, settings).await,
        Command::Chart(args) => chart::run(args, settings).await,
    }
}
