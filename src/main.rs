use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use headpro_terminal::rows::{NOT_AVAILABLE, fmt_pct};
use headpro_terminal::scorecard::BetOutcome;
use headpro_terminal::state::{
    AppState, Delta, ProviderCommand, Screen, apply_delta, market_filter_label, sort_label,
};
use headpro_terminal::{export, fake_feed, odds, persist};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Board,
            KeyCode::Char('2') => self.state.screen = Screen::Scorecard,
            KeyCode::Tab => self.state.toggle_screen(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('s') => self.state.cycle_sort(),
            KeyCode::Char('m') | KeyCode::Char('M') => self.state.cycle_market_filter(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_scorecard(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_refresh(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Board refresh unavailable");
            return;
        };
        if tx.send(ProviderCommand::RefreshBoard).is_err() {
            self.state.push_log("[WARN] Board refresh request failed");
        } else {
            self.state.push_log("[INFO] Board refresh requested");
        }
    }

    fn export_scorecard(&mut self) {
        let path = PathBuf::from("headpro_scorecard.xlsx");
        match export::export_scorecard(&path, &self.state.settled) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} settled bets to {}",
                report.bets,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    fake_feed::spawn_demo_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    persist::load_into_state(&mut app.state);
    let res = run_app(&mut terminal, &mut app, rx);
    persist::save_from_state(&app.state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Board => render_board(frame, chunks[1], &app.state),
        Screen::Scorecard => render_scorecard(frame, chunks[1], &app.state),
    }

    let console =
        Paragraph::new(console_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Board => "BETTING BOARD",
        Screen::Scorecard => "SCORECARD",
    };
    format!(
        "THE HEAD PRO | {screen} | Sort: {} | Market: {}",
        sort_label(state.sort),
        market_filter_label(state.market_filter)
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Board => {
            "1 Board | 2 Scorecard | j/k Move | s Sort | m Market | r Refresh | e Export | ? Help | q Quit"
                .to_string()
        }
        Screen::Scorecard => {
            "1 Board | 2 Scorecard | e Export | ? Help | q Quit".to_string()
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state.logs.back().cloned().unwrap_or_default()
}

const BOARD_COLUMNS: [Constraint; 9] = [
    Constraint::Length(14),
    Constraint::Length(10),
    Constraint::Length(12),
    Constraint::Length(7),
    Constraint::Length(7),
    Constraint::Length(9),
    Constraint::Length(9),
    Constraint::Length(9),
    Constraint::Min(4),
];

fn render_board(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    render_board_header(frame, sections[0]);

    let list_area = sections[1];
    let rows = state.board_rows();
    if rows.is_empty() {
        let empty =
            Paragraph::new("No propositions on the board").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(BOARD_COLUMNS)
            .split(row_area);

        let row = &rows[idx];
        render_cell(frame, cols[0], &row.player, row_style);
        render_cell(frame, cols[1], row.market.label(), row_style);
        render_cell(frame, cols[2], &row.sportsbook, row_style);
        render_cell(frame, cols[3], &row.book_american_odds, row_style);
        render_cell(frame, cols[4], &row.model_american_odds, row_style);
        render_cell(frame, cols[5], &fmt_pct(row.base_ev_pct), ev_style(row.base_ev_pct, selected));
        render_cell(
            frame,
            cols[6],
            &fmt_pct(row.mental_adjustment_pct),
            row_style,
        );
        let adj = if row.clamped {
            format!("{}*", fmt_pct(row.adjusted_ev_pct))
        } else {
            fmt_pct(row.adjusted_ev_pct)
        };
        render_cell(frame, cols[7], &adj, ev_style(row.adjusted_ev_pct, selected));
        let marker = if row.best_bet { "BEST" } else { "" };
        render_cell(
            frame,
            cols[8],
            marker,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        );
    }
}

fn render_board_header(frame: &mut Frame, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(BOARD_COLUMNS)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell(frame, cols[0], "Player", style);
    render_cell(frame, cols[1], "Market", style);
    render_cell(frame, cols[2], "Book", style);
    render_cell(frame, cols[3], "Odds", style);
    render_cell(frame, cols[4], "Model", style);
    render_cell(frame, cols[5], "Base EV", style);
    render_cell(frame, cols[6], "Mental", style);
    render_cell(frame, cols[7], "Adj EV", style);
    render_cell(frame, cols[8], "Pick", style);
}

fn render_scorecard(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let summary = state.scorecard_summary();
    let summary_text = format!(
        "Bets: {}   P/L: {:+.2}u   ROI: {:+.1}%\nAvg stake: {:.2}u   Avg odds: {}   Avg EV: {}",
        summary.total_bets,
        summary.profit_loss_units,
        summary.roi,
        summary.avg_stake_units,
        summary.avg_odds_american,
        fmt_pct(summary.avg_ev),
    );
    let summary_widget = Paragraph::new(summary_text)
        .block(Block::default().title("Season").borders(Borders::BOTTOM));
    frame.render_widget(summary_widget, sections[0]);

    let widths = scorecard_columns();
    render_scorecard_header(frame, sections[1], &widths);

    let list_area = sections[2];
    if state.settled.is_empty() {
        let empty =
            Paragraph::new("No settled bets yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    for (i, bet) in state.settled.iter().take(visible).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let mental = bet
            .mental_form_score
            .map(|s| format!("{s:+.2}"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        render_cell(frame, cols[0], &bet.settled_date.to_string(), Style::default());
        render_cell(frame, cols[1], &bet.player_name, Style::default());
        render_cell(frame, cols[2], bet.bet_market.label(), Style::default());
        render_cell(
            frame,
            cols[3],
            &odds::format_american(bet.american_odds),
            Style::default(),
        );
        render_cell(frame, cols[4], &format!("{:.2}", bet.stake_units), Style::default());
        render_cell(frame, cols[5], &mental, Style::default());
        render_cell(frame, cols[6], &fmt_pct(bet.ev_pct), Style::default());
        render_cell(
            frame,
            cols[7],
            outcome_label(bet.outcome),
            outcome_style(bet.outcome),
        );
    }
}

fn scorecard_columns() -> [Constraint; 8] {
    [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Min(5),
    ]
}

fn render_scorecard_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell(frame, cols[0], "Settled", style);
    render_cell(frame, cols[1], "Player", style);
    render_cell(frame, cols[2], "Market", style);
    render_cell(frame, cols[3], "Odds", style);
    render_cell(frame, cols[4], "Stake", style);
    render_cell(frame, cols[5], "Mental", style);
    render_cell(frame, cols[6], "EV", style);
    render_cell(frame, cols[7], "Result", style);
}

fn render_cell(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn ev_style(ev: Option<f64>, selected: bool) -> Style {
    let mut style = match ev {
        Some(v) if v > 0.0 => Style::default().fg(Color::Green),
        Some(v) if v < 0.0 => Style::default().fg(Color::Red),
        Some(_) => Style::default(),
        None => Style::default().fg(Color::DarkGray),
    };
    if selected {
        style = style.bg(Color::DarkGray);
    }
    style
}

fn outcome_label(outcome: BetOutcome) -> &'static str {
    match outcome {
        BetOutcome::Won => "WON",
        BetOutcome::Lost => "LOST",
        BetOutcome::Push => "PUSH",
        BetOutcome::Void => "VOID",
    }
}

fn outcome_style(outcome: BetOutcome) -> Style {
    match outcome {
        BetOutcome::Won => Style::default().fg(Color::Green),
        BetOutcome::Lost => Style::default().fg(Color::Red),
        BetOutcome::Push | BetOutcome::Void => Style::default().fg(Color::DarkGray),
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "The Head Pro - Help",
        "",
        "Global:",
        "  1            Betting board",
        "  2            Scorecard",
        "  Tab          Toggle screen",
        "  e            Export scorecard xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Board:",
        "  j/k or ↑/↓   Move",
        "  s            Cycle sort mode",
        "  m            Cycle market filter",
        "  r            Reseed demo board",
        "",
        "Adj EV marked * was probability-clamped.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
