//! Selected stock and its candles, persisted between the live and chart views.

use serde_json::json;

use crate::constants::{CHART_DATA_KEY, SELECTED_STOCK_KEY};
use crate::logging;
use crate::quote::{Candle, Quote};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandoff {
    pub stock: Quote,
    pub candles: Vec<Candle>,
}

/// Persist the selection. Empty candle sets are never stored.
pub fn store<S: KeyValueStore + ?Sized>(store: &mut S, stock: &Quote, candles: &[Candle]) -> bool {
    if candles.is_empty() {
        return false;
    }

    match (serde_json::to_string(stock), serde_json::to_string(candles)) {
        (Ok(stock_json), Ok(candles_json)) => {
            store.set(SELECTED_STOCK_KEY, &stock_json);
            store.set(CHART_DATA_KEY, &candles_json);
            true
        }
        (Err(err), _) | (_, Err(err)) => {
            logging::warn(
                "handoff.encode",
                "Could not encode chart selection",
                json!({ "symbol": stock.symbol, "error": err.to_string() }),
            );
            false
        }
    }
}

/// Load the selection; `None` when either half is missing, unreadable or empty.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Option<ChartHandoff> {
    let stock_json = store.get(SELECTED_STOCK_KEY)?;
    let candles_json = store.get(CHART_DATA_KEY)?;

    let stock: Quote = serde_json::from_str(&stock_json).ok()?;
    let candles: Vec<Candle> = serde_json::from_str(&candles_json).ok()?;
    if candles.is_empty() {
        logging::warn_simple("handoff.invalid", "Invalid stock/chart data");
        return None;
    }

    Some(ChartHandoff { stock, candles })
}

/// Drop the candles when leaving the chart view. The selected stock stays.
pub fn clear_chart_data<S: KeyValueStore + ?Sized>(store: &mut S) {
    store.remove(CHART_DATA_KEY);
}
