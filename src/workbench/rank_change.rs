use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::KeyedSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "direction", content = "places")]
pub enum RankChange {
    Up(u32),
    Down(u32),
    Unchanged,
}

impl RankChange {
    pub fn between(previous: Option<u32>, current: u32) -> Self {
        let previous = previous.unwrap_or(current);
        match previous.cmp(&current) {
            std::cmp::Ordering::Greater => RankChange::Up(previous - current),
            std::cmp::Ordering::Less => RankChange::Down(current - previous),
            std::cmp::Ordering::Equal => RankChange::Unchanged,
        }
    }
}

/// Remembers the rank each target held in the previous ranking pass.
#[derive(Debug, Clone, Default)]
pub struct RankTracker {
    previous: HashMap<String, u32>,
}

impl RankTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_rank(&self, target_id: &str) -> Option<u32> {
        self.previous.get(target_id).copied()
    }

    /// Compares `ranked` with the last pass, then remembers it.
    pub fn update(&mut self, ranked: &[KeyedSample]) -> Vec<(String, RankChange)> {
        let changes = ranked
            .iter()
            .map(|keyed| {
                (
                    keyed.target_id.clone(),
                    RankChange::between(self.previous_rank(&keyed.target_id), keyed.rank),
                )
            })
            .collect();
        self.previous = ranked
            .iter()
            .map(|keyed| (keyed.target_id.clone(), keyed.rank))
            .collect();
        changes
    }

    pub fn clear(&mut self) {
        self.previous.clear();
    }
}
