use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde_json::json;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::board::LiveBoard;
use crate::config::Settings;
use crate::constants::LIVE_REDRAW_LIMIT;
use crate::error::Error;
use crate::logging;
use crate::notify;
use crate::quote::Quote;
use crate::session::SessionHolder;
use crate::storage::FileStore;
use crate::stream::{self, FeedObserver, StreamStatus};

#[derive(Debug, Args, Clone, Default)]
pub struct LiveArgs {
    /// Only show stocks whose name or symbol contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Maximum rows drawn per refresh
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Stop after this many snapshots
    #[arg(short = 'n', long)]
    pub snapshots: Option<u64>,

    /// Append each table instead of redrawing the screen
    #[arg(long)]
    pub no_clear: bool,
}

pub async fn run(args: LiveArgs, settings: &Settings) -> Result<()> {
    let session = SessionHolder::initialize(FileStore::open(&settings.state_dir));
    let token = session.require_token()?.to_string();
    drop(session);

    let (token_tx, token_rx) = watch::channel(Some(token));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let watcher = tokio::spawn(watch_session_token(
        settings.state_dir.clone(),
        token_tx,
        shutdown_rx.clone(),
    ));
    let interrupt = {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                logging::info_simple("live.interrupt", "Interrupted; closing quote stream");
                let _ = shutdown_tx.send(true);
            }
        })
    };

    let mut board = LiveBoard::new();
    let mut view = TableView {
        search: args.search.unwrap_or_default(),
        limit: args.limit.unwrap_or(LIVE_REDRAW_LIMIT),
        redraw: !args.no_clear,
        stop_after: args.snapshots,
        seen: 0,
        status: StreamStatus::Disconnected,
        shutdown: shutdown_tx,
    };

    let result = stream::run_feed(&settings.ws_url, token_rx, shutdown_rx, &mut board, &mut view).await;

    watcher.abort();
    interrupt.abort();
    let _ = watcher.await;
    let _ = interrupt.await;

    result?;
    Ok(())
}

/// Poll the persisted session and forward token changes to the feed.
///
/// Signing in or out from another terminal restarts or stops the stream.
async fn watch_session_token(
    state_dir: std::path::PathBuf,
    token_tx: watch::Sender<Option<String>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_secs(2));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.reset();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let current = SessionHolder::initialize(FileStore::open(&state_dir))
                    .token()
                    .map(str::to_string);
                let changed = token_tx.send_if_modified(|token| {
                    if *token != current {
                        *token = current.clone();
                        true
                    } else {
                        false
                    }
                });
                if changed {
                    logging::info(
                        "live.session_changed",
                        "Session token changed on disk",
                        json!({ "signed_in": current.is_some() }),
                    );
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

struct TableView {
    search: String,
    limit: usize,
    redraw: bool,
    stop_after: Option<u64>,
    seen: u64,
    status: StreamStatus,
    shutdown: watch::Sender<bool>,
}

impl FeedObserver for TableView {
    fn on_status(&mut self, status: StreamStatus) {
        if self.status != status {
            println!("[{}]", status.label());
        }
        self.status = status;
    }

    fn on_snapshot(&mut self, board: &LiveBoard) {
        if self.redraw {
            print!("\x1b[2J\x1b[H");
        }
        println!("{}", render_table(board, &self.search, self.limit, self.status));

        self.seen += 1;
        if self.stop_after.is_some_and(|limit| self.seen >= limit) {
            let _ = self.shutdown.send(true);
        }
    }

    fn on_error(&mut self, error: &Error) {
        notify::error(&format!("Live quote stream failed: {error}"));
    }
}

fn format_row(quote: &Quote) -> String {
    format!(
        "{} {:<28} ₹{:>10.2} {:>14} {:>10.2} {:>10.2}",
        quote.direction().marker(),
        truncate(quote.display_name(), 28),
        quote.live_price,
        quote.volume,
        quote.high52,
        quote.low52
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Text table of the board, filtered by `search` and capped at `limit` rows.
pub fn render_table(board: &LiveBoard, search: &str, limit: usize, status: StreamStatus) -> String {
    let rows = board.filtered(search);
    let (up, down, flat) = board.counts();

    let mut out = format!(
        "{} | {} stocks | ▲ {up} ▼ {down} = {flat}\n",
        status.label(),
        board.len()
    );
    out.push_str(&format!(
        "  {:<28} {:>11} {:>14} {:>10} {:>10}\n",
        "Name", "Price", "Volume", "52W High", "52W Low"
    ));

    if rows.is_empty() {
        out.push_str(if board.is_empty() {
            "Data Loading...\n"
        } else {
            "No stocks match the search\n"
        });
        return out;
    }

    for quote in rows.iter().take(limit) {
        out.push_str(&format_row(quote));
        out.push('\n');
    }
    if rows.len() > limit {
        out.push_str(&format!("… {} more\n", rows.len() - limit));
    }
    out
}
