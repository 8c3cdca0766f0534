//! Client for an NSE quote service: session handling, live quote
//! reconciliation over a websocket, sidebar lists and price charts.

pub mod api;
pub mod auth;
pub mod board;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod handoff;
pub mod live;
pub mod logging;
pub mod notify;
pub mod quote;
pub mod reconcile;
pub mod session;
pub mod sidebar;
pub mod storage;
pub mod stream;
pub mod validate;

pub use board::LiveBoard;
pub use error::{Error, Result};
pub use quote::{Candle, PriceDirection, Quote, SidebarCategory, SidebarSummary};
pub use reconcile::{filter_quotes, reconcile};
pub use session::{Session, SessionHolder};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use stream::{FeedObserver, StreamStatus};
