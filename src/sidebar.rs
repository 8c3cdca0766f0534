use anyhow::{Context, Result};
use clap::Args;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::notify;
use crate::quote::{SidebarCategory, SidebarQuote};
use crate::session::SessionHolder;
use crate::storage::FileStore;

#[derive(Debug, Args, Clone)]
pub struct SidebarArgs {
    /// List to display
    #[arg(short, long, value_enum, default_value_t = SidebarCategory::HighVolumes)]
    pub category: SidebarCategory,

    /// Print all four lists
    #[arg(long, conflicts_with = "category")]
    pub all: bool,
}

pub async fn run(args: SidebarArgs, settings: &Settings) -> Result<()> {
    let session = SessionHolder::initialize(FileStore::open(&settings.state_dir));
    let mut client = ApiClient::new(&settings.api_url)?;
    if let Some(token) = session.token() {
        client = client.with_bearer(token);
    }

    let summary = match client.sidebar().await {
        Ok(summary) => summary,
        Err(err) => {
            notify::error("Failed to load sidebar data");
            return Err(err).context("sidebar request failed");
        }
    };

    let categories: Vec<SidebarCategory> = if args.all {
        SidebarCategory::ALL.to_vec()
    } else {
        vec![args.category]
    };

    for category in categories {
        println!("{}", render_list(category, summary.category(category)));
    }
    Ok(())
}

pub fn render_list(category: SidebarCategory, quotes: &[SidebarQuote]) -> String {
    let mut out = format!("== {} ==\n", category.title());
    if quotes.is_empty() {
        out.push_str("No data available\n");
        return out;
    }
    for (rank, quote) in quotes.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<28} ₹{:>10.2}",
            rank + 1,
            quote.display_name(),
            quote.live_price
        ));
        if let Some(volume) = quote.volume {
            out.push_str(&format!("  vol {volume}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_says_so() {
        let rendered = render_list(SidebarCategory::LowestPrices, &[]);
        assert!(rendered.contains("Low Prices"));
        assert!(rendered.contains("No data available"));
    }

    #[test]
    fn rows_are_ranked_with_two_decimals() {
        let rendered = render_list(
            SidebarCategory::HighVolumes,
            &[SidebarQuote {
                symbol: "SBIN".into(),
                name: None,
                live_price: 812.4,
                volume: Some(9_000_000),
            }],
        );
        assert!(rendered.contains(" 1. SBIN"));
        assert!(rendered.contains("812.40"));
        assert!(rendered.contains("vol 9000000"));
    }

    #[test]
    fn rows_show_company_name_when_present() {
        let rendered = render_list(
            SidebarCategory::HighestPrices,
            &[SidebarQuote {
                symbol: "MRF".into(),
                name: Some("MRF Ltd".into()),
                live_price: 131_250.0,
                volume: None,
            }],
        );
        assert!(rendered.contains(" 1. MRF Ltd"));
        assert!(!rendered.contains("vol"));
    }
}
