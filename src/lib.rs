pub mod best_bet;
pub mod export;
pub mod fake_feed;
pub mod market;
pub mod mental_ev;
pub mod odds;
pub mod persist;
pub mod rows;
pub mod scorecard;
pub mod state;
