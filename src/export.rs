use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::odds;
use crate::rows::{NOT_AVAILABLE, fmt_pct};
use crate::scorecard::{BetOutcome, SettledBet, compute_summary};

pub struct ExportReport {
    pub bets: usize,
}

/// Write the settled log plus its summary to an xlsx workbook.
pub fn export_scorecard(path: &Path, bets: &[SettledBet]) -> Result<ExportReport> {
    let summary = compute_summary(bets);

    let summary_rows = vec![
        vec!["Total Bets".to_string(), summary.total_bets.to_string()],
        vec![
            "Profit/Loss (units)".to_string(),
            format!("{:+.2}", summary.profit_loss_units),
        ],
        vec!["ROI".to_string(), format!("{:+.1}%", summary.roi)],
        vec![
            "Avg Stake (units)".to_string(),
            format!("{:.2}", summary.avg_stake_units),
        ],
        vec!["Avg Odds".to_string(), summary.avg_odds_american.clone()],
        vec!["Avg EV".to_string(), fmt_pct(summary.avg_ev)],
    ];

    let mut bet_rows = vec![vec![
        "Settled".to_string(),
        "Event".to_string(),
        "Player".to_string(),
        "Market".to_string(),
        "Odds".to_string(),
        "Stake (units)".to_string(),
        "Mental Form".to_string(),
        "EV".to_string(),
        "Outcome".to_string(),
    ]];
    for bet in bets {
        bet_rows.push(vec![
            bet.settled_date.format("%Y-%m-%d").to_string(),
            bet.event_name.clone(),
            bet.player_name.clone(),
            bet.bet_market.label().to_string(),
            odds::format_american(bet.american_odds),
            format!("{:.2}", bet.stake_units),
            bet.mental_form_score
                .map(|s| format!("{s:+.2}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            fmt_pct(bet.ev_pct),
            outcome_label(bet.outcome).to_string(),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Bets")?;
        write_rows(sheet, &bet_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook to {}", path.display()))?;

    Ok(ExportReport { bets: bets.len() })
}

fn outcome_label(outcome: BetOutcome) -> &'static str {
    match outcome {
        BetOutcome::Won => "Won",
        BetOutcome::Lost => "Lost",
        BetOutcome::Push => "Push",
        BetOutcome::Void => "Void",
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
