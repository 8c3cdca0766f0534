use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One instrument's live price, volume and 52-week range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireQuote")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub live_price: f64,
    /// Price shown before this snapshot. Defaults to `live_price` when absent.
    pub previous_live_price: f64,
    pub volume: u64,
    pub high52: f64,
    pub low52: f64,
    /// Exchange instrument token, required by the chart-data endpoint.
    #[serde(rename = "token", skip_serializing_if = "Option::is_none")]
    pub instrument_token: Option<String>,
}

/// Quote as it arrives on the wire, before missing fields are filled in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuote {
    symbol: String,
    #[serde(default)]
    name: String,
    live_price: f64,
    #[serde(default, alias = "prevLivePrice")]
    previous_live_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_volume")]
    volume: u64,
    #[serde(default)]
    high52: f64,
    #[serde(default)]
    low52: f64,
    #[serde(default, rename = "token", deserialize_with = "lenient_token")]
    instrument_token: Option<String>,
}

impl From<WireQuote> for Quote {
    fn from(wire: WireQuote) -> Self {
        Self {
            previous_live_price: wire.previous_live_price.unwrap_or(wire.live_price),
            symbol: wire.symbol,
            name: wire.name,
            live_price: wire.live_price,
            volume: wire.volume,
            high52: wire.high52,
            low52: wire.low52,
            instrument_token: wire.instrument_token,
        }
    }
}

impl Quote {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, live_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            live_price,
            previous_live_price: live_price,
            volume: 0,
            high52: 0.0,
            low52: 0.0,
            instrument_token: None,
        }
    }

    /// Company name, falling back to the symbol when the feed omits it.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }

    pub fn direction(&self) -> PriceDirection {
        PriceDirection::of(self)
    }
}

/// Colour hint for a quote row: how the price moved since the last snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceDirection {
    Up,
    Down,
    Unchanged,
}

impl PriceDirection {
    pub fn of(quote: &Quote) -> Self {
        if quote.live_price > quote.previous_live_price {
            PriceDirection::Up
        } else if quote.live_price < quote.previous_live_price {
            PriceDirection::Down
        } else {
            PriceDirection::Unchanged
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            PriceDirection::Up => "▲",
            PriceDirection::Down => "▼",
            PriceDirection::Unchanged => " ",
        }
    }
}

/// Volumes occasionally arrive as floats; accept both.
fn lenient_volume<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Volume {
        Int(u64),
        Float(f64),
    }

    Ok(match Volume::deserialize(deserializer)? {
        Volume::Int(value) => value,
        Volume::Float(value) if value.is_finite() && value > 0.0 => value.round() as u64,
        Volume::Float(_) => 0,
    })
}

fn lenient_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Token>::deserialize(deserializer)?.map(|token| match token {
        Token::Text(text) => text,
        Token::Number(number) => number.to_string(),
    }))
}

/// Partial quote used by the sidebar top-20 lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarQuote {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub live_price: f64,
    #[serde(default, deserialize_with = "lenient_optional_volume")]
    pub volume: Option<u64>,
}

impl SidebarQuote {
    /// Company name, or the symbol when the list entry has none.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.symbol)
    }
}

fn lenient_optional_volume<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_volume(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidebarSummary {
    #[serde(rename = "top20High_Volumes", default)]
    pub high_volumes: Vec<SidebarQuote>,
    #[serde(rename = "top20Low_Volumes", default)]
    pub low_volumes: Vec<SidebarQuote>,
    #[serde(rename = "top20Highest_Prices", default)]
    pub highest_prices: Vec<SidebarQuote>,
    #[serde(rename = "top20Lowest_Prices", default)]
    pub lowest_prices: Vec<SidebarQuote>,
}

impl SidebarSummary {
    pub fn category(&self, category: SidebarCategory) -> &[SidebarQuote] {
        match category {
            SidebarCategory::HighVolumes => &self.high_volumes,
            SidebarCategory::LowVolumes => &self.low_volumes,
            SidebarCategory::HighestPrices => &self.highest_prices,
            SidebarCategory::LowestPrices => &self.lowest_prices,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum SidebarCategory {
    #[default]
    HighVolumes,
    LowVolumes,
    HighestPrices,
    LowestPrices,
}

impl SidebarCategory {
    pub const ALL: [SidebarCategory; 4] = [
        SidebarCategory::HighVolumes,
        SidebarCategory::LowVolumes,
        SidebarCategory::HighestPrices,
        SidebarCategory::LowestPrices,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SidebarCategory::HighVolumes => "High Volumes",
            SidebarCategory::LowVolumes => "Low Volumes",
            SidebarCategory::HighestPrices => "Highest Prices",
            SidebarCategory::LowestPrices => "Low Prices",
        }
    }
}

impl fmt::Display for SidebarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Candle timestamps come back either as text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandleTime {
    Millis(i64),
    Text(String),
}

impl fmt::Display for CandleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleTime::Millis(ms) => write!(f, "{ms}"),
            CandleTime::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: CandleTime,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Chart responses are either a bare array or wrapped in `{ "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartPayload {
    Wrapped { data: Vec<Candle> },
    Bare(Vec<Candle>),
}

impl ChartPayload {
    pub fn into_candles(self) -> Vec<Candle> {
        match self {
            ChartPayload::Wrapped { data } => data,
            ChartPayload::Bare(candles) => candles,
        }
    }
}
