use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::market::Market;
use crate::odds;
use crate::rows::NOT_AVAILABLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetOutcome {
    Won,
    Lost,
    Push,
    Void,
}

/// One settled bet as recorded in the bet log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledBet {
    pub settled_date: NaiveDate,
    pub event_name: String,
    pub player_name: String,
    pub bet_market: Market,
    pub american_odds: i64,
    pub stake_units: f64,
    #[serde(default)]
    pub mental_form_score: Option<f64>,
    /// Adjusted EV recorded when the bet was placed, if it was.
    #[serde(default)]
    pub ev_pct: Option<f64>,
    pub outcome: BetOutcome,
}

impl SettledBet {
    /// Profit in units. None when the stored odds are malformed; such rows
    /// are excluded from money aggregates rather than counted as zero.
    pub fn profit_units(&self) -> Option<f64> {
        match self.outcome {
            BetOutcome::Won => odds::american_to_decimal(self.american_odds)
                .ok()
                .map(|d| self.stake_units * (d - 1.0)),
            BetOutcome::Lost => Some(-self.stake_units),
            BetOutcome::Push | BetOutcome::Void => Some(0.0),
        }
    }
}

/// Aggregate figures for the scorecard screen and the JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorecardSummary {
    pub total_bets: usize,
    pub profit_loss_units: f64,
    pub roi: f64,
    pub avg_stake_units: f64,
    pub avg_odds_american: String,
    #[serde(serialize_with = "na_f64")]
    pub avg_ev: Option<f64>,
}

fn na_f64<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

pub fn compute_summary(bets: &[SettledBet]) -> ScorecardSummary {
    let mut profit = 0.0;
    let mut staked = 0.0;
    let mut stake_sum = 0.0;
    let mut decimal_sum = 0.0;
    let mut decimal_n = 0usize;
    let mut ev_sum = 0.0;
    let mut ev_n = 0usize;

    for bet in bets {
        stake_sum += bet.stake_units;
        if let Some(p) = bet.profit_units() {
            profit += p;
            // Pushes and voids return the stake; they don't enter ROI.
            if matches!(bet.outcome, BetOutcome::Won | BetOutcome::Lost) {
                staked += bet.stake_units;
            }
        }
        if let Ok(d) = odds::american_to_decimal(bet.american_odds) {
            decimal_sum += d;
            decimal_n += 1;
        }
        if let Some(ev) = bet.ev_pct {
            ev_sum += ev;
            ev_n += 1;
        }
    }

    let total_bets = bets.len();
    let roi = if staked > 0.0 {
        profit / staked * 100.0
    } else {
        0.0
    };
    let avg_stake_units = if total_bets > 0 {
        stake_sum / total_bets as f64
    } else {
        0.0
    };
    let avg_odds_american = if decimal_n > 0 {
        odds::decimal_to_american_display(decimal_sum / decimal_n as f64)
            .unwrap_or_else(|_| NOT_AVAILABLE.to_string())
    } else {
        NOT_AVAILABLE.to_string()
    };
    let avg_ev = if ev_n > 0 {
        Some(ev_sum / ev_n as f64)
    } else {
        None
    };

    ScorecardSummary {
        total_bets,
        profit_loss_units: profit,
        roi,
        avg_stake_units,
        avg_odds_american,
        avg_ev,
    }
}

/// The `/api/scorecard-data`-shaped payload: summary plus settled rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorecardPayload {
    #[serde(flatten)]
    pub summary: ScorecardSummary,
    pub bets: Vec<SettledBet>,
}

pub fn scorecard_payload(bets: Vec<SettledBet>) -> ScorecardPayload {
    ScorecardPayload {
        summary: compute_summary(&bets),
        bets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(odds: i64, stake: f64, outcome: BetOutcome, ev: Option<f64>) -> SettledBet {
        SettledBet {
            settled_date: NaiveDate::from_ymd_opt(2026, 6, 21).unwrap(),
            event_name: "Travelers Championship".to_string(),
            player_name: "R. Mack".to_string(),
            bet_market: Market::Top10,
            american_odds: odds,
            stake_units: stake,
            mental_form_score: Some(0.4),
            ev_pct: ev,
            outcome,
        }
    }

    #[test]
    fn profit_follows_american_odds() {
        assert!((bet(150, 2.0, BetOutcome::Won, None).profit_units().unwrap() - 3.0).abs() < 1e-9);
        assert!((bet(-200, 2.0, BetOutcome::Won, None).profit_units().unwrap() - 1.0).abs() < 1e-9);
        assert!((bet(150, 2.0, BetOutcome::Lost, None).profit_units().unwrap() + 2.0).abs() < 1e-9);
        assert_eq!(bet(150, 2.0, BetOutcome::Push, None).profit_units(), Some(0.0));
        assert_eq!(bet(150, 2.0, BetOutcome::Void, None).profit_units(), Some(0.0));
    }

    #[test]
    fn malformed_odds_drop_out_of_money_aggregates() {
        assert_eq!(bet(50, 2.0, BetOutcome::Won, None).profit_units(), None);
        let summary = compute_summary(&[
            bet(50, 2.0, BetOutcome::Won, None),
            bet(100, 1.0, BetOutcome::Won, None),
        ]);
        assert_eq!(summary.total_bets, 2);
        assert!((summary.profit_loss_units - 1.0).abs() < 1e-9);
    }

    #[test]
    fn summary_matches_hand_arithmetic() {
        let bets = [
            bet(150, 2.0, BetOutcome::Won, Some(12.0)),   // +3.0
            bet(-120, 1.0, BetOutcome::Lost, Some(4.0)),  // -1.0
            bet(200, 1.0, BetOutcome::Push, None),        //  0.0
        ];
        let summary = compute_summary(&bets);
        assert_eq!(summary.total_bets, 3);
        assert!((summary.profit_loss_units - 2.0).abs() < 1e-9);
        // ROI over won/lost stakes only: 2.0 / 3.0.
        assert!((summary.roi - 66.666_666_666_666_67).abs() < 1e-6);
        assert!((summary.avg_stake_units - 4.0 / 3.0).abs() < 1e-9);
        assert!((summary.avg_ev.unwrap() - 8.0).abs() < 1e-9);
        // Mean decimal of 2.5, 1.8333.., 3.0 is 2.4444.. -> +144.
        assert_eq!(summary.avg_odds_american, "+144");
    }

    #[test]
    fn empty_log_yields_zeroes_and_na() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.total_bets, 0);
        assert_eq!(summary.profit_loss_units, 0.0);
        assert_eq!(summary.roi, 0.0);
        assert_eq!(summary.avg_odds_american, NOT_AVAILABLE);
        assert_eq!(summary.avg_ev, None);
    }

    #[test]
    fn payload_serializes_summary_fields_at_top_level() {
        let payload = scorecard_payload(vec![bet(150, 2.0, BetOutcome::Won, None)]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["total_bets"], 1);
        assert_eq!(json["avg_ev"], "N/A");
        assert_eq!(json["bets"][0]["player_name"], "R. Mack");
        assert_eq!(json["bets"][0]["outcome"], "won");
        assert_eq!(json["bets"][0]["bet_market"], "top_10");
        assert_eq!(json["bets"][0]["settled_date"], "2026-06-21");
    }
}
