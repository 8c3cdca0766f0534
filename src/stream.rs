//! Live quote subscription over a websocket.
//!
//! One subscription is open at a time. Its lifecycle is
//! `Disconnected -> Connecting -> Open -> Disconnected`; a dropped connection
//! is not reopened on its own. [`run_feed`] opens a new subscription only
//! when the session token changes.

use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::board::LiveBoard;
use crate::error::{Error, Result};
use crate::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

impl StreamStatus {
    pub fn label(self) -> &'static str {
        match self {
            StreamStatus::Disconnected => "Disconnected",
            StreamStatus::Connecting => "Connecting",
            StreamStatus::Open => "Live",
        }
    }
}

/// Receives everything a running subscription produces.
pub trait FeedObserver {
    fn on_status(&mut self, status: StreamStatus);

    /// Called after each snapshot has been reconciled into `board`.
    fn on_snapshot(&mut self, board: &LiveBoard);

    /// Connection-level failure. Malformed payloads are not reported here.
    fn on_error(&mut self, _error: &Error) {}
}

/// Stream endpoint with the session token as a query parameter.
pub fn subscription_url(base: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// Run a single subscription until the server closes it or it fails.
///
/// Snapshots are applied to `board` in arrival order. A payload that does not
/// parse is dropped and the board keeps its previous contents.
pub async fn run_subscription<O>(url: &Url, board: &mut LiveBoard, observer: &mut O) -> Result<()>
where
    O: FeedObserver + ?Sized,
{
    observer.on_status(StreamStatus::Connecting);
    let mut socket = match connect_async(url.as_str()).await {
        Ok((socket, _)) => socket,
        Err(err) => {
            let err = Error::from(err);
            logging::error(
                "stream.connect_failed",
                "Quote stream connection failed",
                json!({ "host": url.host_str(), "error": err.to_string() }),
            );
            observer.on_error(&err);
            observer.on_status(StreamStatus::Disconnected);
            return Err(err);
        }
    };

    logging::info(
        "stream.open",
        "Quote stream connected",
        json!({ "host": url.host_str(), "path": url.path() }),
    );
    observer.on_status(StreamStatus::Open);

    let mut outcome = Ok(());
    while let Some(message) = socket.next().await {
        let payload = match message {
            Ok(Message::Text(text)) => text.into_bytes(),
            Ok(Message::Binary(bytes)) => bytes,
            Ok(Message::Close(frame)) => {
                logging::info(
                    "stream.close",
                    "Quote stream closed by server",
                    json!({ "reason": frame.map(|f| f.reason.to_string()) }),
                );
                break;
            }
            Ok(_) => continue,
            Err(err) => {
                let err = Error::from(err);
                logging::error(
                    "stream.read_error",
                    "Quote stream read failed",
                    json!({ "error": err.to_string() }),
                );
                observer.on_error(&err);
                outcome = Err(err);
                break;
            }
        };

        if board.apply_payload(&payload).is_ok() {
            observer.on_snapshot(board);
        }
    }

    logging::info(
        "stream.disconnected",
        "Quote stream disconnected",
        json!({ "snapshots": board.snapshots() }),
    );
    observer.on_status(StreamStatus::Disconnected);
    outcome
}

/// Keep one subscription alive per session token until shutdown.
///
/// The subscription is torn down and reopened whenever the token changes, and
/// stays down while the token is absent or after the server drops it. Returns
/// when `shutdown` flips to `true`, or when the feed is down and no further
/// token can arrive.
pub async fn run_feed<O>(
    ws_base: &str,
    mut token_rx: watch::Receiver<Option<String>>,
    mut shutdown: watch::Receiver<bool>,
    board: &mut LiveBoard,
    observer: &mut O,
) -> Result<()>
where
    O: FeedObserver + ?Sized,
{
    loop {
        if *shutdown.borrow() {
            return Ok(());
        }

        let token = token_rx.borrow_and_update().clone();
        if let Some(token) = token {
            let url = subscription_url(ws_base, &token)?;
            tokio::select! {
                result = run_subscription(&url, board, observer) => {
                    if let Err(err) = result {
                        logging::warn(
                            "feed.subscription_ended",
                            "Subscription ended with error; waiting for a new session token",
                            json!({ "error": err.to_string() }),
                        );
                    }
                }
                _ = token_replaced(&mut token_rx) => {
                    observer.on_status(StreamStatus::Disconnected);
                    logging::info_simple("feed.token_changed", "Session token changed; resubscribing");
                    continue;
                }
                _ = shutdown_requested(&mut shutdown) => {
                    observer.on_status(StreamStatus::Disconnected);
                    return Ok(());
                }
            }
        }

        tokio::select! {
            changed = token_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = shutdown_requested(&mut shutdown) => return Ok(()),
        }
    }
}

/// Resolves on the next token change. A closed channel never resolves, so a
/// live subscription outlives the sender.
async fn token_replaced(token_rx: &mut watch::Receiver<Option<String>>) {
    if token_rx.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            // Sender gone: nobody can ask for shutdown any more.
            std::future::pending::<()>().await;
        }
    }
}
