use anyhow::{bail, Context, Result};
use clap::Args;
use textplots::{Chart, Plot, Shape};

use crate::api::{ApiClient, ChartRequest};
use crate::config::Settings;
use crate::constants::SELECTED_STOCK_KEY;
use crate::error::Error;
use crate::handoff::{self, ChartHandoff};
use crate::notify;
use crate::quote::{Candle, Quote};
use crate::session::SessionHolder;
use crate::storage::{FileStore, KeyValueStore};

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Symbol to chart (e.g. TCS). Omit to redraw the last fetched chart
    pub symbol: Option<String>,

    /// Exchange instrument token sent with the chart request
    #[arg(short = 't', long)]
    pub instrument_token: Option<String>,

    /// Chart width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = 30)]
    pub height: u32,

    /// Keep the fetched candles stored after drawing
    #[arg(long)]
    pub keep: bool,
}

/// One plotted sample: the candle's time label and its closing price.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub time_label: String,
    pub price: f64,
}

pub fn chart_points(candles: &[Candle]) -> Vec<ChartPoint> {
    candles
        .iter()
        .filter(|candle| candle.close.is_finite())
        .map(|candle| ChartPoint {
            time_label: candle.time.to_string(),
            price: candle.close,
        })
        .collect()
}

/// Lowest and highest price, or `None` for an empty series.
pub fn price_range(points: &[ChartPoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let min = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

pub async fn run(args: ChartArgs, settings: &Settings) -> Result<()> {
    let mut session = SessionHolder::initialize(FileStore::open(&settings.state_dir));

    if let Some(symbol) = args.symbol.clone() {
        let token = session.require_token()?.to_string();
        let stock = selected_stock(session.store(), &symbol, args.instrument_token.clone());
        let client = ApiClient::new(&settings.api_url)?.with_bearer(token);

        let candles = match client
            .chart_data(&ChartRequest {
                token: stock.instrument_token.clone(),
                symbol: stock.symbol.clone(),
            })
            .await
        {
            Ok(candles) => candles,
            Err(err) => {
                notify::error("Failed to fetch stock data");
                return Err(err).context(format!("chart data request for {symbol} failed"));
            }
        };

        if candles.is_empty() {
            notify::error("No chart data available");
            return Err(Error::NoData(format!("no chart data for {symbol}")).into());
        }
        if chart_points(&candles).len() < 2 {
            notify::error("Not enough chart data to draw");
            return Err(Error::NoData(format!(
                "only {} usable candle(s) for {symbol}",
                candles.len()
            ))
            .into());
        }
        notify::success(&format!("Fetched {} data successfully!", stock.display_name()));
        handoff::store(session.store_mut(), &stock, &candles);
    }

    let Some(ChartHandoff { stock, candles }) = handoff::load(session.store()) else {
        bail!("Invalid stock/chart data; run `nse-ticker chart <SYMBOL>` first");
    };

    render(&stock, &chart_points(&candles), args.width, args.height)?;

    if !args.keep {
        handoff::clear_chart_data(session.store_mut());
    }
    Ok(())
}

/// Reuse the last selected stock when it matches, so its name and token carry over.
fn selected_stock<S: KeyValueStore>(store: &S, symbol: &str, instrument_token: Option<String>) -> Quote {
    let previous = store
        .get(SELECTED_STOCK_KEY)
        .and_then(|json| serde_json::from_str::<Quote>(&json).ok())
        .filter(|stock| stock.symbol.eq_ignore_ascii_case(symbol));

    let mut stock = previous.unwrap_or_else(|| Quote::new(symbol.to_uppercase(), "", 0.0));
    if instrument_token.is_some() {
        stock.instrument_token = instrument_token;
    }
    stock
}

pub fn render(stock: &Quote, points: &[ChartPoint], width: u32, height: u32) -> Result<()> {
    if points.len() < 2 {
        bail!("not enough data points to render a chart");
    }

    println!("{} - Live Price Chart", stock.display_name());
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        println!("{} → {} ({} candles)", first.time_label, last.time_label, points.len());
    }
    if let Some((min_price, max_price)) = price_range(points) {
        println!("Price range: ₹{:.2} → ₹{:.2}", min_price, max_price);
    }

    let samples: Vec<(f32, f32)> = points
        .iter()
        .enumerate()
        .map(|(index, point)| (index as f32, point.price as f32))
        .collect();

    Chart::new(width.max(40), height.max(10), 0.0, (points.len() - 1) as f32)
        .lineplot(&Shape::Lines(&samples))
        .display();
    println!();
    Ok(())
}
