use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rows::PropositionRecord;
use crate::scorecard::SettledBet;
use crate::state::AppState;

const CACHE_DIR: &str = "headpro_terminal";
const CACHE_FILE: &str = "snapshot.json";
const CACHE_VERSION: u32 = 1;

/// Last-rendered board and settled log, so the terminal has something to
/// show before the provider's first delta lands. Purely a UI cache; the bet
/// log of record lives with the data layer, not here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SnapshotFile {
    version: u32,
    records: Vec<PropositionRecord>,
    settled: Vec<SettledBet>,
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = snapshot_path() else {
        return;
    };
    let Some(snapshot) = load_snapshot_file(&path) else {
        return;
    };
    if snapshot.version != CACHE_VERSION {
        return;
    }
    state.records = snapshot.records;
    state.settled = snapshot.settled;
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = snapshot_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let snapshot = SnapshotFile {
        version: CACHE_VERSION,
        records: state.records.clone(),
        settled: state.settled.clone(),
    };

    if let Ok(json) = serde_json::to_string(&snapshot) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn load_snapshot_file(path: &Path) -> Option<SnapshotFile> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<SnapshotFile>(&raw).ok()
}

fn snapshot_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}
