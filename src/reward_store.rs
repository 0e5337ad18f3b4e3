use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionSummary;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredRewardEntry {
    name: String,
    wins: u64,
    #[serde(rename = "bestDepth", alias = "best_depth")]
    best_depth: f32,
    #[serde(rename = "totalPocketsCleared", alias = "total_pockets_cleared")]
    total_pockets_cleared: u64,
    #[serde(rename = "updatedAtMs", alias = "updated_at_ms")]
    updated_at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RewardStoreFile {
    version: u8,
    players: HashMap<String, StoredRewardEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct RewardStoreFileRaw {
    version: u8,
    players: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RewardEntryView {
    pub name: String,
    pub wins: u64,
    #[serde(rename = "bestDepth")]
    pub best_depth: f32,
    #[serde(rename = "totalPocketsCleared")]
    pub total_pockets_cleared: u64,
    #[serde(rename = "updatedAtMs")]
    pub updated_at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RewardsResponse {
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    pub entries: Vec<RewardEntryView>,
}

/// Fire-and-forget sink for finished winning dives. The game never waits on
/// this; a write failure costs one update, not the session.
pub struct RewardStore {
    file_path: PathBuf,
    players: HashMap<String, StoredRewardEntry>,
}

impl RewardStore {
    pub fn new(file_path: PathBuf) -> Self {
        let players = load_players(&file_path);
        Self { file_path, players }
    }

    pub fn record_win(&mut self, name: &str, summary: &SessionSummary) {
        let key = reward_key(name);
        if key.is_empty() {
            return;
        }
        let now_ms = now_ms();
        let entry = self
            .players
            .entry(key)
            .or_insert_with(|| StoredRewardEntry {
                name: name.trim().to_string(),
                wins: 0,
                best_depth: 0.0,
                total_pockets_cleared: 0,
                updated_at_ms: now_ms,
            });

        entry.name = name.trim().to_string();
        entry.wins += 1;
        entry.best_depth = entry.best_depth.max(summary.max_depth);
        entry.total_pockets_cleared += summary.pockets_cleared as u64;
        entry.updated_at_ms = now_ms;

        self.save();
    }

    pub fn build_response(&self, requested_limit: Option<usize>) -> RewardsResponse {
        RewardsResponse {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            entries: self.get_top(requested_limit),
        }
    }

    fn get_top(&self, requested_limit: Option<usize>) -> Vec<RewardEntryView> {
        let normalized_limit = requested_limit.unwrap_or(10).clamp(1, 100);
        let mut entries: Vec<RewardEntryView> = self
            .players
            .values()
            .map(|entry| RewardEntryView {
                name: entry.name.clone(),
                wins: entry.wins,
                best_depth: entry.best_depth,
                total_pockets_cleared: entry.total_pockets_cleared,
                updated_at_ms: entry.updated_at_ms,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.best_depth
                .partial_cmp(&a.best_depth)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.wins.cmp(&a.wins))
                .then_with(|| b.total_pockets_cleared.cmp(&a.total_pockets_cleared))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        entries.truncate(normalized_limit);
        entries
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[reward-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                return;
            }
        }

        let payload = RewardStoreFile {
            version: 1,
            players: self.players.clone(),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    eprintln!(
                        "[reward-store] failed to write {}: {error}",
                        self.file_path.display()
                    );
                }
            }
            Err(error) => {
                eprintln!(
                    "[reward-store] failed to serialize payload for {}: {error}",
                    self.file_path.display()
                );
            }
        }
    }
}

fn reward_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn load_players(path: &Path) -> HashMap<String, StoredRewardEntry> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[reward-store] failed to read {}: {error}", path.display());
            }
            return HashMap::new();
        }
    };
    let parsed: RewardStoreFileRaw = match serde_json::from_str::<RewardStoreFileRaw>(&text) {
        Ok(value) if value.version == 1 => value,
        Ok(value) => {
            eprintln!(
                "[reward-store] unsupported version {} at {}",
                value.version,
                path.display()
            );
            return HashMap::new();
        }
        Err(error) => {
            eprintln!("[reward-store] failed to parse {}: {error}", path.display());
            return HashMap::new();
        }
    };

    let mut sanitized = HashMap::<String, StoredRewardEntry>::new();
    for (player_key, raw_value) in parsed.players {
        let value: StoredRewardEntry = match serde_json::from_value(raw_value) {
            Ok(entry) => entry,
            Err(error) => {
                eprintln!(
                    "[reward-store] dropping malformed entry {player_key} at {}: {error}",
                    path.display()
                );
                continue;
            }
        };
        let normalized_key = reward_key(&value.name);
        if normalized_key.is_empty() {
            continue;
        }
        match sanitized.entry(normalized_key) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let merged = slot.get_mut();
                merged.wins += value.wins;
                merged.best_depth = merged.best_depth.max(value.best_depth);
                merged.total_pockets_cleared += value.total_pockets_cleared;
                merged.updated_at_ms = merged.updated_at_ms.max(value.updated_at_ms);
            }
        }
    }
    sanitized
}
