//! In-memory game data tables.
//!
//! `StaticGameData` holds each sheet as a `BTreeMap` keyed by row ID. Tables
//! are built with the `with_*` methods or loaded from a JSON export shaped
//! like [`GameDataFile`].

use std::collections::BTreeMap;
#[cfg(feature = "serde")]
use std::path::Path;

use crate::domain::Job;

use super::{ClassJobInfo, DutyInfo, GameData, ItemInfo, RouletteInfo, WorldInfo};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GameDataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("invalid game data JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// On-disk layout of a game data export. Every sheet is optional.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameDataFile {
    pub duties: Vec<DutyInfo>,
    pub roulettes: Vec<RouletteInfo>,
    pub class_jobs: Vec<ClassJobInfo>,
    pub worlds: Vec<WorldInfo>,
    pub items: Vec<ItemInfo>,
}

// ---------------------------------------------------------------------------
// StaticGameData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StaticGameData {
    duties: BTreeMap<u32, DutyInfo>,
    roulettes: BTreeMap<u32, RouletteInfo>,
    class_jobs: BTreeMap<u8, ClassJobInfo>,
    worlds: BTreeMap<u32, WorldInfo>,
    max_body_item_level: Option<u32>,
}

impl StaticGameData {
    /// Tables containing only the class-job rows for every [`Job`].
    pub fn with_builtin_jobs() -> Self {
        let mut data = Self::default();
        for job in Job::ALL {
            data.class_jobs.insert(
                job.row_id(),
                ClassJobInfo {
                    row_id: job.row_id(),
                    name: job.name().to_string(),
                    abbreviation: String::new(),
                },
            );
        }
        data
    }

    pub fn from_file_data(file: GameDataFile) -> Self {
        let mut data = Self::with_builtin_jobs();
        for d in file.duties {
            data = data.with_duty(d);
        }
        for r in file.roulettes {
            data = data.with_roulette(r);
        }
        for c in file.class_jobs {
            data = data.with_class_job(c);
        }
        for w in file.worlds {
            data = data.with_world(w);
        }
        for i in file.items {
            data = data.with_item(i);
        }
        data
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, GameDataError> {
        let file: GameDataFile = serde_json::from_str(json)?;
        Ok(Self::from_file_data(file))
    }

    #[cfg(feature = "serde")]
    pub fn from_file(path: &Path) -> Result<Self, GameDataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_duty(mut self, duty: DutyInfo) -> Self {
        self.duties.insert(duty.row_id, duty);
        self
    }

    pub fn with_roulette(mut self, roulette: RouletteInfo) -> Self {
        self.roulettes.insert(roulette.row_id, roulette);
        self
    }

    pub fn with_class_job(mut self, class_job: ClassJobInfo) -> Self {
        self.class_jobs.insert(class_job.row_id, class_job);
        self
    }

    pub fn with_world(mut self, world: WorldInfo) -> Self {
        self.worlds.insert(world.row_id, world);
        self
    }

    /// Items are not kept; only the body-slot maximum is tracked.
    pub fn with_item(mut self, item: ItemInfo) -> Self {
        if item.body {
            let current = self.max_body_item_level.unwrap_or(0);
            self.max_body_item_level = Some(current.max(item.item_level));
        }
        self
    }

    pub fn duty_count(&self) -> usize {
        self.duties.len()
    }

    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }
}

impl GameData for StaticGameData {
    fn duty(&self, row_id: u32) -> Option<&DutyInfo> {
        self.duties.get(&row_id)
    }

    fn roulette(&self, row_id: u32) -> Option<&RouletteInfo> {
        self.roulettes.get(&row_id)
    }

    fn class_job(&self, row_id: u8) -> Option<&ClassJobInfo> {
        self.class_jobs.get(&row_id)
    }

    fn world(&self, row_id: u32) -> Option<&WorldInfo> {
        self.worlds.get(&row_id)
    }

    fn duties(&self) -> Vec<&DutyInfo> {
        self.duties.values().collect()
    }

    fn worlds(&self) -> Vec<&WorldInfo> {
        self.worlds.values().collect()
    }

    fn max_body_item_level(&self) -> Option<u32> {
        self.max_body_item_level
    }
}
