use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};

use crate::best_bet::{SportsbookQuote, select_best_bet};
use crate::market::Market;
use crate::mental_ev::{AdjustmentConfig, evaluate};
use crate::odds;

pub const NOT_AVAILABLE: &str = "N/A";

/// One bookmaker quote for one proposition, as supplied by the data layer.
/// Model probability and mental score may be unknown; the row transform
/// degrades the affected figures to "N/A" instead of inventing numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropositionRecord {
    pub player: String,
    pub event: String,
    pub market: Market,
    pub sportsbook: String,
    pub book_decimal_odds: f64,
    #[serde(default)]
    pub model_probability: Option<f64>,
    #[serde(default)]
    pub mental_score: Option<f64>,
}

/// Fully formatted row for whatever renders the betting board. Numeric
/// fields serialize as numbers when defined and as the literal "N/A" string
/// when not, matching what the table and JSON surfaces print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropositionRow {
    pub player: String,
    pub event: String,
    pub market: Market,
    pub sportsbook: String,
    #[serde(skip)]
    pub book_decimal_odds: f64,
    pub book_american_odds: String,
    pub model_american_odds: String,
    #[serde(serialize_with = "na_f64")]
    pub base_ev_pct: Option<f64>,
    #[serde(serialize_with = "na_f64")]
    pub mental_adjustment_pct: Option<f64>,
    #[serde(serialize_with = "na_f64")]
    pub adjusted_ev_pct: Option<f64>,
    pub clamped: bool,
    pub best_bet: bool,
}

fn na_f64<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

/// Render an optional percentage the way every surface prints it.
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.1}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Transform one record into a display row. Engine errors degrade the row's
/// figures to "N/A"; they never abort the batch and never turn into zeros.
pub fn evaluate_record(record: &PropositionRecord, cfg: AdjustmentConfig) -> PropositionRow {
    let book_american_odds = odds::decimal_to_american_display(record.book_decimal_odds)
        .unwrap_or_else(|_| NOT_AVAILABLE.to_string());

    let model_american_odds = record
        .model_probability
        .and_then(|p| odds::implied_to_decimal(p).ok())
        .and_then(|d| odds::decimal_to_american_display(d).ok())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let evaluation = record.model_probability.and_then(|p| {
        evaluate(
            p,
            record.book_decimal_odds,
            record.mental_score,
            record.market.polarity(),
            cfg,
        )
        .ok()
    });

    let (base_ev_pct, mental_adjustment_pct, adjusted_ev_pct, clamped) = match evaluation {
        Some(ev) => (
            Some(ev.base_ev_pct),
            ev.adjusted.map(|a| a.mental_adjustment_pct),
            ev.adjusted.map(|a| a.adjusted_ev_pct),
            ev.adjusted.map(|a| a.clamped).unwrap_or(false),
        ),
        None => (None, None, None, false),
    };

    PropositionRow {
        player: record.player.clone(),
        event: record.event.clone(),
        market: record.market,
        sportsbook: record.sportsbook.clone(),
        book_decimal_odds: record.book_decimal_odds,
        book_american_odds,
        model_american_odds,
        base_ev_pct,
        mental_adjustment_pct,
        adjusted_ev_pct,
        clamped,
        best_bet: false,
    }
}

/// Evaluate a whole board and flag, per (player, event, market) group, the
/// quote the best-bet selection picks.
pub fn evaluate_board(records: &[PropositionRecord], cfg: AdjustmentConfig) -> Vec<PropositionRow> {
    let mut rows: Vec<PropositionRow> = records.iter().map(|r| evaluate_record(r, cfg)).collect();

    let mut seen: HashSet<(String, String, Market)> = HashSet::new();
    for record in records {
        let group_key = (
            record.player.clone(),
            record.event.clone(),
            record.market,
        );
        if !seen.insert(group_key) {
            continue;
        }

        let group: Vec<&PropositionRecord> = records
            .iter()
            .filter(|r| {
                r.player == record.player && r.event == record.event && r.market == record.market
            })
            .collect();

        // Model inputs are per proposition, not per book; take the first
        // quote that knows them.
        let Some(reference) = group.iter().find(|r| r.model_probability.is_some()) else {
            continue;
        };
        let model_probability = reference.model_probability.unwrap_or_default();
        let mental_score = reference.mental_score;

        let quotes: Vec<SportsbookQuote> = group
            .iter()
            .map(|r| SportsbookQuote {
                sportsbook: r.sportsbook.clone(),
                decimal_odds: r.book_decimal_odds,
            })
            .collect();

        let Some(best) = select_best_bet(
            &quotes,
            model_probability,
            mental_score,
            record.market.polarity(),
            cfg,
        ) else {
            continue;
        };

        if let Some(row) = rows.iter_mut().find(|row| {
            row.player == record.player
                && row.event == record.event
                && row.market == record.market
                && row.sportsbook == best.quote.sportsbook
        }) {
            row.best_bet = true;
        }
    }

    rows
}
