//! Flat-file score store: one `"<name> <score>"` line per finished round,
//! appended at round end and read back for the leaderboard.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const MAX_NAME_LEN: usize = 15;
pub const DEFAULT_LOAD_LIMIT: usize = 20;
pub const LEADERBOARD_SIZE: usize = 10;

/// Player name as typed on the name-entry screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(raw: &str) -> Result<Self, String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err("Player name is empty".to_string());
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(format!(
                "Player name '{}' is longer than {} characters",
                name, MAX_NAME_LEN
            ));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ')))
        {
            return Err(format!("Player name '{}' contains '{}'", name, bad));
        }
        Ok(Self(name.to_string()))
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

pub fn append_score(path: &Path, name: &PlayerName, score: u32) -> Result<(), String> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    writeln!(file, "{} {}", name, score)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    log::info!("Recorded score {} for '{}' in {}", score, name, path.display());
    Ok(())
}

/// Read at most `max` entries in file order. A missing store is empty.
/// Malformed lines are skipped with a warning.
pub fn load_scores(path: &Path, max: usize) -> Result<Vec<ScoreEntry>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;

    let mut entries = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if entries.len() >= max {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        // Names may contain spaces; the score is after the last one.
        let parsed = line
            .rsplit_once(' ')
            .and_then(|(name, score)| Some((name, score.parse::<u32>().ok()?)));
        match parsed {
            Some((name, score)) if !name.is_empty() => entries.push(ScoreEntry {
                name: name.to_string(),
                score,
            }),
            _ => log::warn!(
                "Skipping malformed score line {} in {}: '{}'",
                line_no + 1,
                path.display(),
                line
            ),
        }
    }
    Ok(entries)
}

/// Highest score first; equal scores keep file order.
pub fn sort_leaderboard(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}
