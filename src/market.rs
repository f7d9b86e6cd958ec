use serde::{Deserialize, Serialize};

/// Whether a positive mental-form score raises or lowers the modeled
/// probability for a market. Promoted to explicit configuration instead of
/// string-matching market names at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPolarity {
    Positive,
    Negative,
}

impl MarketPolarity {
    pub fn factor(self) -> f64 {
        match self {
            MarketPolarity::Positive => 1.0,
            MarketPolarity::Negative => -1.0,
        }
    }
}

// Wire names are spelled out per variant so they stay byte-identical to
// `key()`; a rename_all rule would drop the underscore before digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "win")]
    Win,
    #[serde(rename = "top_5")]
    Top5,
    #[serde(rename = "top_10")]
    Top10,
    #[serde(rename = "top_20")]
    Top20,
    #[serde(rename = "make_cut")]
    MakeCut,
    #[serde(rename = "miss_cut")]
    MissCut,
}

impl Market {
    pub const ALL: [Market; 6] = [
        Market::Win,
        Market::Top5,
        Market::Top10,
        Market::Top20,
        Market::MakeCut,
        Market::MissCut,
    ];

    /// Stable key used in stored rows and payloads.
    pub fn key(self) -> &'static str {
        match self {
            Market::Win => "win",
            Market::Top5 => "top_5",
            Market::Top10 => "top_10",
            Market::Top20 => "top_20",
            Market::MakeCut => "make_cut",
            Market::MissCut => "miss_cut",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Market::Win => "Win",
            Market::Top5 => "Top 5",
            Market::Top10 => "Top 10",
            Market::Top20 => "Top 20",
            Market::MakeCut => "Make Cut",
            Market::MissCut => "Miss Cut",
        }
    }

    /// A sharp mental state helps every outcome market except missing the
    /// cut, where it cuts the other way.
    pub fn polarity(self) -> MarketPolarity {
        match self {
            Market::MissCut => MarketPolarity::Negative,
            _ => MarketPolarity::Positive,
        }
    }

    pub fn from_key(key: &str) -> Option<Market> {
        let k = key.trim().to_ascii_lowercase();
        Market::ALL.iter().copied().find(|m| m.key() == k)
    }
}
