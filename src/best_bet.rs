use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::market::MarketPolarity;
use crate::mental_ev::{AdjustmentConfig, Evaluation, evaluate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportsbookQuote {
    pub sportsbook: String,
    pub decimal_odds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestBet {
    pub quote: SportsbookQuote,
    pub evaluation: Evaluation,
}

/// Pick the best price for one proposition across sportsbooks: highest
/// adjusted EV when a mental score is present, else highest base EV. Ties go
/// to the higher raw price, then the lexically first book name, so the
/// selection is deterministic for any input order. Quotes the engine rejects
/// (degenerate odds) are skipped; an empty or fully-rejected set yields None.
pub fn select_best_bet(
    quotes: &[SportsbookQuote],
    model_probability: f64,
    mental_score: Option<f64>,
    polarity: MarketPolarity,
    cfg: AdjustmentConfig,
) -> Option<BestBet> {
    let mut best: Option<BestBet> = None;
    for quote in quotes {
        let Ok(evaluation) = evaluate(
            model_probability,
            quote.decimal_odds,
            mental_score,
            polarity,
            cfg,
        ) else {
            continue;
        };
        let candidate = BestBet {
            quote: quote.clone(),
            evaluation,
        };
        best = Some(match best.take() {
            None => candidate,
            Some(current) => {
                if rank(&candidate, &current) == Ordering::Greater {
                    candidate
                } else {
                    current
                }
            }
        });
    }
    best
}

fn rank(a: &BestBet, b: &BestBet) -> Ordering {
    a.evaluation
        .effective_ev_pct()
        .partial_cmp(&b.evaluation.effective_ev_pct())
        .unwrap_or(Ordering::Equal)
        .then(
            a.quote
                .decimal_odds
                .partial_cmp(&b.quote.decimal_odds)
                .unwrap_or(Ordering::Equal),
        )
        // Lexically-first name wins the final tie.
        .then_with(|| b.quote.sportsbook.cmp(&a.quote.sportsbook))
}
