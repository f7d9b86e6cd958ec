use headpro_terminal::best_bet::{SportsbookQuote, select_best_bet};
use headpro_terminal::market::{Market, MarketPolarity};
use headpro_terminal::mental_ev::{AdjustmentConfig, evaluate};
use headpro_terminal::odds::{decimal_to_american, decimal_to_american_display};
use headpro_terminal::rows::{NOT_AVAILABLE, PropositionRecord, evaluate_record};

fn cfg() -> AdjustmentConfig {
    AdjustmentConfig::default()
}

#[test]
fn even_money_boundary_through_the_public_api() {
    assert_eq!(decimal_to_american_display(2.0).unwrap(), "+100");
    let just_under = decimal_to_american(1.9999).unwrap();
    assert!(just_under < 0 && just_under >= -101);
}

#[test]
fn known_longshot_scenario_without_mental_read() {
    let ev = evaluate(0.20, 6.0, None, MarketPolarity::Positive, cfg()).unwrap();
    assert!((ev.base_ev_pct - 20.0).abs() < 1e-9);
    assert!(ev.adjusted.is_none());
}

#[test]
fn known_longshot_scenario_with_positive_read() {
    let ev = evaluate(0.20, 6.0, Some(0.5), MarketPolarity::Positive, cfg()).unwrap();
    let adj = ev.adjusted.unwrap();
    assert!((adj.mental_adjustment_pct - 7.5).abs() < 1e-9);
    assert!((adj.adjustment_factor - 1.075).abs() < 1e-9);
    assert!((adj.adjusted_probability - 0.215).abs() < 1e-9);
    assert!((adj.adjusted_ev_pct - 29.0).abs() < 1e-9);
}

#[test]
fn heavy_favourite_with_full_confidence_is_clamped() {
    let ev = evaluate(0.95, 1.4, Some(1.0), MarketPolarity::Positive, cfg()).unwrap();
    let adj = ev.adjusted.unwrap();
    assert!(adj.clamped);
    assert_eq!(adj.adjusted_probability, 1.0);
}

#[test]
fn row_transform_renders_na_for_unknowns_end_to_end() {
    let record = PropositionRecord {
        player: "J. Whitlock".to_string(),
        event: "Sawgrass Invitational".to_string(),
        market: Market::Win,
        sportsbook: "fanduel".to_string(),
        book_decimal_odds: 15.0,
        model_probability: Some(0.07),
        mental_score: None,
    };
    let row = evaluate_record(&record, cfg());
    assert_eq!(row.book_american_odds, "+1400");
    assert!((row.base_ev_pct.unwrap() - 5.0).abs() < 1e-9);
    assert_eq!(row.adjusted_ev_pct, None);

    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["adjusted_ev_pct"], NOT_AVAILABLE);
    assert_eq!(json["mental_adjustment_pct"], NOT_AVAILABLE);
}

#[test]
fn miss_cut_market_rewards_a_struggling_player() {
    // Negative mental read raises the miss-cut probability and its EV.
    let record = PropositionRecord {
        player: "M. Reyes".to_string(),
        event: "Sawgrass Invitational".to_string(),
        market: Market::MissCut,
        sportsbook: "caesars".to_string(),
        book_decimal_odds: 2.4,
        model_probability: Some(0.45),
        mental_score: Some(-0.8),
    };
    let row = evaluate_record(&record, cfg());
    assert!(row.adjusted_ev_pct.unwrap() > row.base_ev_pct.unwrap());
    assert!(row.mental_adjustment_pct.unwrap() > 0.0);
}

#[test]
fn best_bet_selection_is_order_independent() {
    let mut quotes = vec![
        SportsbookQuote {
            sportsbook: "betmgm".to_string(),
            decimal_odds: 6.2,
        },
        SportsbookQuote {
            sportsbook: "caesars".to_string(),
            decimal_odds: 5.8,
        },
        SportsbookQuote {
            sportsbook: "fanduel".to_string(),
            decimal_odds: 6.2,
        },
    ];
    let forward = select_best_bet(&quotes, 0.20, Some(0.5), MarketPolarity::Positive, cfg())
        .unwrap();
    quotes.reverse();
    let backward = select_best_bet(&quotes, 0.20, Some(0.5), MarketPolarity::Positive, cfg())
        .unwrap();

    // Equal top prices tie on EV and price; lexically first book wins both ways.
    assert_eq!(forward.quote.sportsbook, "betmgm");
    assert_eq!(backward.quote.sportsbook, "betmgm");
}
