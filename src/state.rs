use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::market::Market;
use crate::mental_ev::AdjustmentConfig;
use crate::rows::{PropositionRecord, PropositionRow, evaluate_board};
use crate::scorecard::{ScorecardSummary, SettledBet, compute_summary};

const MAX_LOG_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Board,
    Scorecard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    AdjustedEv,
    BaseEv,
    Price,
    Player,
}

impl SortMode {
    pub fn next(self) -> SortMode {
        match self {
            SortMode::AdjustedEv => SortMode::BaseEv,
            SortMode::BaseEv => SortMode::Price,
            SortMode::Price => SortMode::Player,
            SortMode::Player => SortMode::AdjustedEv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketFilter {
    All,
    Only(Market),
}

impl MarketFilter {
    pub fn next(self) -> MarketFilter {
        match self {
            MarketFilter::All => MarketFilter::Only(Market::ALL[0]),
            MarketFilter::Only(market) => {
                let idx = Market::ALL.iter().position(|m| *m == market).unwrap_or(0);
                match Market::ALL.get(idx + 1) {
                    Some(next) => MarketFilter::Only(*next),
                    None => MarketFilter::All,
                }
            }
        }
    }

    pub fn accepts(self, market: Market) -> bool {
        match self {
            MarketFilter::All => true,
            MarketFilter::Only(only) => market == only,
        }
    }
}

/// Messages from the provider thread to the UI.
#[derive(Debug, Clone)]
pub enum Delta {
    Board(Vec<PropositionRecord>),
    UpsertQuote(PropositionRecord),
    Settled(Vec<SettledBet>),
    Log(String),
}

/// Requests from the UI back to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    RefreshBoard,
}

pub struct AppState {
    pub screen: Screen,
    pub sort: SortMode,
    pub market_filter: MarketFilter,
    pub selected: usize,
    pub records: Vec<PropositionRecord>,
    pub settled: Vec<SettledBet>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub config: AdjustmentConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Board,
            sort: SortMode::AdjustedEv,
            market_filter: MarketFilter::All,
            selected: 0,
            records: Vec::new(),
            settled: Vec::new(),
            logs: VecDeque::new(),
            help_overlay: false,
            config: AdjustmentConfig::shared(),
        }
    }

    /// Rows for the board screen: filtered, evaluated, best-bet flagged,
    /// sorted. Rows missing the active sort figure go last.
    pub fn board_rows(&self) -> Vec<PropositionRow> {
        let filtered: Vec<PropositionRecord> = self
            .records
            .iter()
            .filter(|r| self.market_filter.accepts(r.market))
            .cloned()
            .collect();

        let mut rows = evaluate_board(&filtered, self.config);
        let sort = self.sort;
        rows.sort_by(|a, b| compare_rows(a, b, sort));
        rows
    }

    pub fn scorecard_summary(&self) -> ScorecardSummary {
        compute_summary(&self.settled)
    }

    pub fn selected_row(&self) -> Option<PropositionRow> {
        self.board_rows().into_iter().nth(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.selected = 0;
    }

    pub fn cycle_market_filter(&mut self) {
        self.market_filter = self.market_filter.next();
        self.selected = 0;
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Board => Screen::Scorecard,
            Screen::Scorecard => Screen::Board,
        };
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_back(line.into());
        while self.logs.len() > MAX_LOG_LINES {
            self.logs.pop_front();
        }
    }

    fn filtered_board_len(&self) -> usize {
        self.records
            .iter()
            .filter(|r| self.market_filter.accepts(r.market))
            .count()
    }

    fn visible_len(&self) -> usize {
        match self.screen {
            Screen::Board => self.filtered_board_len(),
            Screen::Scorecard => self.settled.len(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_rows(a: &PropositionRow, b: &PropositionRow, sort: SortMode) -> Ordering {
    match sort {
        SortMode::AdjustedEv => desc_opt(a.adjusted_ev_pct, b.adjusted_ev_pct)
            .then_with(|| desc_opt(a.base_ev_pct, b.base_ev_pct))
            .then_with(|| a.player.cmp(&b.player)),
        SortMode::BaseEv => {
            desc_opt(a.base_ev_pct, b.base_ev_pct).then_with(|| a.player.cmp(&b.player))
        }
        SortMode::Price => b
            .book_decimal_odds
            .partial_cmp(&a.book_decimal_odds)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player.cmp(&b.player)),
        SortMode::Player => a
            .player
            .cmp(&b.player)
            .then_with(|| a.market.key().cmp(b.market.key()))
            .then_with(|| a.sportsbook.cmp(&b.sportsbook)),
    }
}

// Descending on the figure; rows without it sink to the bottom.
fn desc_opt(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Board(records) => {
            state.records = records;
            // Clamp against what the board actually shows under the filter.
            let visible = state.filtered_board_len();
            if state.selected >= visible {
                state.selected = visible.saturating_sub(1);
            }
        }
        Delta::UpsertQuote(record) => {
            let slot = state.records.iter_mut().find(|r| {
                r.player == record.player
                    && r.event == record.event
                    && r.market == record.market
                    && r.sportsbook == record.sportsbook
            });
            match slot {
                Some(existing) => *existing = record,
                None => state.records.push(record),
            }
        }
        Delta::Settled(bets) => state.settled = bets,
        Delta::Log(line) => state.push_log(line),
    }
}

pub fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::AdjustedEv => "ADJ EV",
        SortMode::BaseEv => "BASE EV",
        SortMode::Price => "PRICE",
        SortMode::Player => "PLAYER",
    }
}

pub fn market_filter_label(filter: MarketFilter) -> &'static str {
    match filter {
        MarketFilter::All => "ALL",
        MarketFilter::Only(market) => market.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(player: &str, market: Market, book: &str, decimal: f64) -> PropositionRecord {
        PropositionRecord {
            player: player.to_string(),
            event: "Sawgrass Open".to_string(),
            market,
            sportsbook: book.to_string(),
            book_decimal_odds: decimal,
            model_probability: Some(0.20),
            mental_score: Some(0.2),
        }
    }

    #[test]
    fn market_filter_cycles_through_all_and_back() {
        let mut filter = MarketFilter::All;
        for _ in 0..=Market::ALL.len() {
            filter = filter.next();
        }
        assert_eq!(filter, MarketFilter::All);
    }

    #[test]
    fn upsert_replaces_matching_quote() {
        let mut state = AppState::new();
        apply_delta(
            &mut state,
            Delta::Board(vec![record("R. Mack", Market::Win, "fanduel", 6.0)]),
        );
        let mut updated = record("R. Mack", Market::Win, "fanduel", 6.5);
        updated.mental_score = Some(0.3);
        apply_delta(&mut state, Delta::UpsertQuote(updated));
        assert_eq!(state.records.len(), 1);
        assert!((state.records[0].book_decimal_odds - 6.5).abs() < 1e-9);

        apply_delta(
            &mut state,
            Delta::UpsertQuote(record("R. Mack", Market::Win, "caesars", 6.2)),
        );
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn rows_without_the_sort_figure_sink() {
        let mut state = AppState::new();
        let mut unknown = record("A. Aaron", Market::Win, "fanduel", 9.0);
        unknown.model_probability = None;
        state.records = vec![unknown, record("Z. Zeller", Market::Win, "fanduel", 6.0)];

        state.sort = SortMode::AdjustedEv;
        let rows = state.board_rows();
        assert_eq!(rows[0].player, "Z. Zeller");
        assert_eq!(rows[1].player, "A. Aaron");
    }

    #[test]
    fn log_buffer_is_bounded() {
        let mut state = AppState::new();
        for i in 0..200 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOG_LINES);
        assert_eq!(state.logs.back().unwrap(), "line 199");
    }
}
