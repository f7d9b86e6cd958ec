use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::market::Market;
use crate::rows::PropositionRecord;
use crate::scorecard::{BetOutcome, SettledBet};
use crate::state::{Delta, ProviderCommand};

const DEMO_EVENT: &str = "Sawgrass Invitational";

const DEMO_BOOKS: [&str; 4] = ["betmgm", "caesars", "draftkings", "fanduel"];

// (player, model win prob, mental score if known). One player deliberately
// has no mental read so the board always shows an N/A column.
const DEMO_FIELD: [(&str, f64, Option<f64>); 6] = [
    ("C. Ashford", 0.16, Some(0.70)),
    ("D. Navarro", 0.12, Some(0.35)),
    ("H. Okada", 0.09, Some(-0.20)),
    ("J. Whitlock", 0.07, None),
    ("M. Reyes", 0.05, Some(-0.65)),
    ("T. Kilbride", 0.04, Some(0.10)),
];

/// Offline provider: seeds a realistic board and settled log, then jitters
/// quotes and mental reads over time. Keeps the terminal usable with no
/// external model, sportsbook, or transcript services attached.
pub fn spawn_demo_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();

        let jitter_interval = Duration::from_millis(
            env::var("HEADPRO_FEED_JITTER_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(900)
                .clamp(100, 60_000),
        );

        let mut board = seed_board(&mut rng);
        let _ = tx.send(Delta::Board(board.clone()));
        let _ = tx.send(Delta::Settled(seed_settled()));
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Demo feed online: {} quotes across {} books",
            board.len(),
            DEMO_BOOKS.len()
        )));

        let mut last_jitter = Instant::now();
        loop {
            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::RefreshBoard => {
                        board = seed_board(&mut rng);
                        let _ = tx.send(Delta::Board(board.clone()));
                        let _ = tx.send(Delta::Log("[INFO] Board reseeded".to_string()));
                    }
                }
            }

            thread::sleep(Duration::from_millis(100));
            if last_jitter.elapsed() < jitter_interval || board.is_empty() {
                continue;
            }
            last_jitter = Instant::now();

            let idx = rng.gen_range(0..board.len());
            let record = &mut board[idx];
            jitter_quote(record, &mut rng);
            if tx.send(Delta::UpsertQuote(record.clone())).is_err() {
                // UI is gone.
                return;
            }
        }
    });
}

fn seed_board(rng: &mut impl Rng) -> Vec<PropositionRecord> {
    let mut board = Vec::new();
    for (player, win_prob, mental) in DEMO_FIELD {
        for (market, model_probability) in [
            (Market::Win, win_prob),
            (Market::Top10, (win_prob * 3.4).min(0.85)),
            (Market::MissCut, (0.55 - win_prob * 2.0).max(0.08)),
        ] {
            let fair = 1.0 / model_probability;
            for book in DEMO_BOOKS {
                // Books hang around fair value with a little spread and vig.
                let spread = rng.gen_range(-0.06..0.10);
                let decimal = (fair * (1.0 + spread)).max(1.05);
                board.push(PropositionRecord {
                    player: player.to_string(),
                    event: DEMO_EVENT.to_string(),
                    market,
                    sportsbook: book.to_string(),
                    book_decimal_odds: round_to_cents(decimal),
                    model_probability: Some(model_probability),
                    mental_score: mental,
                });
            }
        }
    }
    board
}

fn jitter_quote(record: &mut PropositionRecord, rng: &mut impl Rng) {
    let drift = rng.gen_range(-0.03..0.03);
    record.book_decimal_odds = round_to_cents((record.book_decimal_odds * (1.0 + drift)).max(1.05));

    // Mental reads move rarely and only when one exists at all.
    if rng.gen_bool(0.15) {
        if let Some(score) = record.mental_score {
            let moved = (score + rng.gen_range(-0.08..0.08)).clamp(-1.0, 1.0);
            record.mental_score = Some(moved);
        }
    }
}

fn round_to_cents(decimal: f64) -> f64 {
    (decimal * 100.0).round() / 100.0
}

fn seed_settled() -> Vec<SettledBet> {
    let today = Utc::now().date_naive();
    let entries = [
        ("C. Ashford", Market::Top10, 210, 1.5, Some(0.55), Some(14.2), BetOutcome::Won, 25),
        ("M. Reyes", Market::MissCut, -115, 2.0, Some(-0.60), Some(9.8), BetOutcome::Won, 18),
        ("D. Navarro", Market::Win, 1400, 0.5, Some(0.40), Some(22.5), BetOutcome::Lost, 18),
        ("H. Okada", Market::Top20, 120, 1.0, Some(-0.15), Some(3.1), BetOutcome::Lost, 11),
        ("J. Whitlock", Market::Top10, 330, 1.0, None, None, BetOutcome::Lost, 11),
        ("T. Kilbride", Market::MakeCut, -180, 2.0, Some(0.25), Some(5.6), BetOutcome::Push, 4),
    ];
    entries
        .into_iter()
        .map(
            |(player, market, odds, stake, mental, ev, outcome, days_ago)| SettledBet {
                settled_date: today - ChronoDuration::days(days_ago),
                event_name: DEMO_EVENT.to_string(),
                player_name: player.to_string(),
                bet_market: market,
                american_odds: odds,
                stake_units: stake,
                mental_form_score: mental,
                ev_pct: ev,
                outcome,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_board_covers_every_book_for_every_proposition() {
        let mut rng = rand::thread_rng();
        let board = seed_board(&mut rng);
        assert_eq!(board.len(), DEMO_FIELD.len() * 3 * DEMO_BOOKS.len());
        assert!(board.iter().all(|r| r.book_decimal_odds > 1.0));
        assert!(
            board
                .iter()
                .filter(|r| r.player == "J. Whitlock")
                .all(|r| r.mental_score.is_none())
        );
    }

    #[test]
    fn jitter_keeps_quotes_and_scores_in_range() {
        let mut rng = rand::thread_rng();
        let mut record = seed_board(&mut rng).remove(0);
        for _ in 0..500 {
            jitter_quote(&mut record, &mut rng);
            assert!(record.book_decimal_odds > 1.0);
            if let Some(score) = record.mental_score {
                assert!((-1.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn settled_seed_parses_into_consistent_log() {
        let settled = seed_settled();
        assert_eq!(settled.len(), 6);
        assert!(settled.iter().all(|b| b.stake_units > 0.0));
    }
}
