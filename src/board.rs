use indexmap::IndexMap;
use serde_json::json;

use crate::error::Result;
use crate::logging;
use crate::quote::{PriceDirection, Quote};
use crate::reconcile::{filter_quotes, reconcile};

/// Currently displayed quote collection, keyed by symbol in snapshot order.
#[derive(Debug, Clone, Default)]
pub struct LiveBoard {
    quotes: IndexMap<String, Quote>,
    snapshots: u64,
}

impl LiveBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the board with `snapshot`, carrying previous prices forward.
    pub fn apply(&mut self, snapshot: Vec<Quote>) {
        let previous: Vec<Quote> = self.quotes.values().cloned().collect();
        let merged = reconcile(&previous, snapshot);

        self.quotes.clear();
        for quote in merged {
            // A repeated symbol keeps its first position, latest values.
            self.quotes.insert(quote.symbol.clone(), quote);
        }
        self.snapshots += 1;
    }

    /// Parse a raw stream payload and apply it.
    ///
    /// A payload that is not a JSON array of quotes leaves the board untouched.
    pub fn apply_payload(&mut self, bytes: &[u8]) -> Result<usize> {
        let snapshot: Vec<Quote> = serde_json::from_slice(bytes).inspect_err(|err| {
            logging::warn(
                "board.decode",
                "Discarding malformed quote snapshot",
                json!({ "bytes": bytes.len(), "error": err.to_string() }),
            );
        })?;
        let count = snapshot.len();
        self.apply(snapshot);
        Ok(count)
    }

    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    pub fn filtered(&self, query: &str) -> Vec<&Quote> {
        filter_quotes(self.quotes.values(), query)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Number of snapshots applied since creation.
    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    /// Advancing, declining and flat row counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        self.quotes
            .values()
            .fold((0, 0, 0), |(up, down, flat), quote| match quote.direction() {
                PriceDirection::Up => (up + 1, down, flat),
                PriceDirection::Down => (up, down + 1, flat),
                PriceDirection::Unchanged => (up, down, flat + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(rows: &[(&str, f64)]) -> Vec<u8> {
        let quotes: Vec<Quote> = rows
            .iter()
            .map(|(symbol, price)| Quote::new(*symbol, *symbol, *price))
            .collect();
        serde_json::to_vec(&quotes).unwrap()
    }

    #[test]
    fn consecutive_payloads_track_direction() {
        let mut board = LiveBoard::new();
        board.apply_payload(&payload(&[("TCS", 100.0), ("INFY", 50.0)])).unwrap();
        board.apply_payload(&payload(&[("TCS", 105.0), ("INFY", 49.0)])).unwrap();

        assert_eq!(board.get("TCS").unwrap().direction(), PriceDirection::Up);
        assert_eq!(board.get("INFY").unwrap().direction(), PriceDirection::Down);
        assert_eq!(board.counts(), (1, 1, 0));
        assert_eq!(board.snapshots(), 2);
    }

    #[test]
    fn malformed_payload_keeps_previous_board() {
        let mut board = LiveBoard::new();
        board.apply_payload(&payload(&[("TCS", 100.0)])).unwrap();

        assert!(board.apply_payload(b"{\"not\":\"an array\"}").is_err());
        assert!(board.apply_payload(b"garbage").is_err());

        assert_eq!(board.len(), 1);
        assert_eq!(board.get("TCS").unwrap().live_price, 100.0);
        assert_eq!(board.snapshots(), 1);
    }

    #[test]
    fn empty_snapshot_clears_board() {
        let mut board = LiveBoard::new();
        board.apply_payload(&payload(&[("TCS", 100.0)])).unwrap();
        assert_eq!(board.apply_payload(b"[]").unwrap(), 0);
        assert!(board.is_empty());
    }

    #[test]
    fn keeps_snapshot_order() {
        let mut board = LiveBoard::new();
        board.apply(vec![Quote::new("B", "B", 1.0), Quote::new("A", "A", 2.0)]);
        let symbols: Vec<_> = board.quotes().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B", "A"]);
    }

    #[test]
    fn repeated_symbol_keeps_first_position_and_last_values() {
        let mut board = LiveBoard::new();
        board.apply(vec![Quote::new("A", "A", 1.0), Quote::new("TCS", "TCS", 100.0)]);
        board.apply(vec![
            Quote::new("TCS", "TCS", 101.0),
            Quote::new("A", "A", 2.0),
            Quote::new("TCS", "TCS", 99.0),
        ]);

        let symbols: Vec<_> = board.quotes().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TCS", "A"]);
        let tcs = board.get("TCS").unwrap();
        assert_eq!(tcs.live_price, 99.0);
        assert_eq!(tcs.previous_live_price, 100.0);
        assert_eq!(tcs.direction(), PriceDirection::Down);
    }
}
