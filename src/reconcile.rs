//! Merging of consecutive quote snapshots.
//!
//! Each snapshot from the stream replaces the previous one wholesale. The only
//! state carried across is the last displayed price per symbol, which becomes
//! `previous_live_price` so the view can tell which way a row moved.

use std::collections::HashMap;

use crate::quote::Quote;

/// Tag every quote in `snapshot` with the price it had in `previous`.
///
/// Symbols seen for the first time get their own price as the previous one,
/// so they render without a direction. Output order is `snapshot` order and
/// symbols absent from `snapshot` are dropped.
pub fn reconcile(previous: &[Quote], snapshot: Vec<Quote>) -> Vec<Quote> {
    let index: HashMap<&str, f64> = previous
        .iter()
        .map(|quote| (quote.symbol.as_str(), quote.live_price))
        .collect();

    snapshot
        .into_iter()
        .map(|mut quote| {
            quote.previous_live_price = index
                .get(quote.symbol.as_str())
                .copied()
                .unwrap_or(quote.live_price);
            quote
        })
        .collect()
}

/// Case-insensitive search over symbol and name. An empty query keeps everything.
pub fn filter_quotes<'a, I>(quotes: I, query: &str) -> Vec<&'a Quote>
where
    I: IntoIterator<Item = &'a Quote>,
{
    let needle = query.trim().to_lowercase();
    quotes
        .into_iter()
        .filter(|quote| {
            needle.is_empty()
                || quote.symbol.to_lowercase().contains(&needle)
                || quote.name.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::PriceDirection;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote::new(symbol, format!("{symbol} Ltd"), price)
    }

    #[test]
    fn carries_previous_price_and_defaults_new_symbols() {
        let previous = vec![quote("TCS", 100.0)];
        let merged = reconcile(&previous, vec![quote("TCS", 105.0), quote("INFY", 50.0)]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].symbol, "TCS");
        assert_eq!(merged[0].live_price, 105.0);
        assert_eq!(merged[0].previous_live_price, 100.0);
        assert_eq!(merged[1].symbol, "INFY");
        assert_eq!(merged[1].previous_live_price, 50.0);
    }

    #[test]
    fn first_snapshot_has_no_direction() {
        let merged = reconcile(&[], vec![quote("TCS", 105.0), quote("INFY", 50.0)]);
        assert!(merged
            .iter()
            .all(|quote| quote.direction() == PriceDirection::Unchanged));
    }

    #[test]
    fn reapplying_same_snapshot_is_flat() {
        let snapshot = reconcile(&[], vec![quote("TCS", 105.0), quote("HDFC", 1500.0)]);
        let merged = reconcile(&snapshot, snapshot.clone());
        for quote in merged {
            assert_eq!(quote.previous_live_price, quote.live_price);
        }
    }

    #[test]
    fn drops_symbols_missing_from_new_snapshot() {
        let previous = vec![quote("TCS", 100.0), quote("WIPRO", 400.0)];
        let merged = reconcile(&previous, vec![quote("TCS", 99.0)]);

        assert_eq!(merged.len(), 1);
        assert!(merged.iter().all(|quote| quote.symbol != "WIPRO"));
        assert_eq!(merged[0].direction(), PriceDirection::Down);
    }

    #[test]
    fn preserves_snapshot_order() {
        let previous = vec![quote("A", 1.0), quote("B", 2.0), quote("C", 3.0)];
        let merged = reconcile(&previous, vec![quote("C", 3.5), quote("A", 0.5), quote("B", 2.0)]);
        let symbols: Vec<_> = merged.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A", "B"]);
    }

    #[test]
    fn duplicate_symbols_each_read_previous_snapshot() {
        let previous = vec![quote("TCS", 100.0)];
        let merged = reconcile(&previous, vec![quote("TCS", 105.0), quote("TCS", 95.0)]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].previous_live_price, 100.0);
        assert_eq!(merged[1].previous_live_price, 100.0);
        assert_eq!(merged[0].direction(), PriceDirection::Up);
        assert_eq!(merged[1].direction(), PriceDirection::Down);

        let fresh = reconcile(&[], vec![quote("INFY", 50.0), quote("INFY", 52.0)]);
        assert_eq!(fresh[0].previous_live_price, 50.0);
        assert_eq!(fresh[1].previous_live_price, 52.0);
    }

    #[test]
    fn ignores_server_supplied_previous_price() {
        let mut incoming = quote("TCS", 105.0);
        incoming.previous_live_price = 1.0;
        let merged = reconcile(&[quote("TCS", 104.0)], vec![incoming]);
        assert_eq!(merged[0].previous_live_price, 104.0);
    }

    #[test]
    fn filter_matches_symbol_or_name_case_insensitively() {
        let mut reliance = quote("RELIANCE", 2900.0);
        reliance.name = "Reliance Industries".into();
        let quotes = vec![reliance, quote("TCS", 3900.0), quote("INFY", 1500.0)];

        let by_name = filter_quotes(&quotes, "industries");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].symbol, "RELIANCE");

        let by_symbol = filter_quotes(&quotes, "tc");
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].symbol, "TCS");

        assert_eq!(filter_quotes(&quotes, "  ").len(), 3);
    }
}
