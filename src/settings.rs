use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::PoisonError, sync::RwLock, time::Duration};

use crate::bands::default_active_bands;
use crate::workbench::{
    PartitionOptions, PercentileRankStyle, DEFAULT_PERCENTILE_RANKS, DEFAULT_TOP_COUNT,
};

const DEBUG_TICK_INTERVAL_MILLI: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadTimeSettings {
    pub tick_interval_milli: u64,
    pub active_bands: Vec<String>,
    pub percentile_ranks: Vec<u32>,
    pub percentile_style: PercentileRankStyle,
    pub top_count: usize,
    pub hide_unread: bool,
    pub show_minute: bool,
    /// Delay between navigation and scanning the new page's content root.
    pub content_root_mount_buffer_milli: u64,
}

impl Default for ReadTimeSettings {
    fn default() -> Self {
        Self {
            tick_interval_milli: 250,
            active_bands: default_active_bands(),
            percentile_ranks: DEFAULT_PERCENTILE_RANKS.to_vec(),
            percentile_style: PercentileRankStyle::Th,
            top_count: DEFAULT_TOP_COUNT,
            hide_unread: false,
            show_minute: false,
            content_root_mount_buffer_milli: 3 * 1000,
        }
    }
}

impl ReadTimeSettings {
    /// Aggregator period. `READTIME_DEBUG=1` shortens it for local debugging.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval_with(debug_mode())
    }

    fn tick_interval_with(&self, debug: bool) -> Duration {
        let milli = if debug {
            self.tick_interval_milli.min(DEBUG_TICK_INTERVAL_MILLI)
        } else {
            self.tick_interval_milli
        };
        Duration::from_millis(milli.max(1))
    }

    pub fn content_root_mount_buffer(&self) -> Duration {
        Duration::from_millis(self.content_root_mount_buffer_milli)
    }

    pub fn partition_options(&self, ascending: bool) -> PartitionOptions {
        PartitionOptions {
            ascending,
            top_count: self.top_count,
            hide_unread: self.hide_unread,
            label_style: self.percentile_style,
        }
    }
}

fn debug_mode() -> bool {
    std::env::var("READTIME_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// JSON-file-backed settings. A missing or unreadable file yields defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ReadTimeSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring invalid settings in {}: {}",
                    path.display(),
                    err
                );
                ReadTimeSettings::default()
            })
        } else {
            ReadTimeSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> ReadTimeSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update(&self, settings: ReadTimeSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: ReadTimeSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = data;
        Ok(())
    }

    fn persist(&self, data: &ReadTimeSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
