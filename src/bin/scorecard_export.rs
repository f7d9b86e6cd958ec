use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use headpro_terminal::scorecard::{SettledBet, scorecard_payload};

/// Load a settled-bet log from JSON and print the scorecard payload, the
/// same shape the web surface serves.
fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/settled_bets.json"));

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let bets: Vec<SettledBet> = serde_json::from_str(&raw).context("invalid settled-bet json")?;

    let payload = scorecard_payload(bets);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
