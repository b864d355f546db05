//! The preset store: named presets, the selected preset and global settings.
//!
//! [`PresetStore`] is the persisted snapshot and is plain data.
//! [`PresetManager`] pairs it with a [`PresetRepository`] and saves after
//! every mutation. A failed save is returned to the caller but the in-memory
//! change is kept.

pub mod persist;

pub use persist::{MemoryRepository, PresetRepository, StoreError};
#[cfg(feature = "serde")]
pub use persist::JsonFileRepository;

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::domain::WindowSide;
use crate::filter::evaluate::{ActiveFilter, EvalContext};
use crate::filter::preset::{Preset, PresetId};

/// Current snapshot format version.
pub const STORE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreSettings {
    /// Open the filter window together with the recruitment board.
    pub show_when_host_ui_open: bool,
    pub window_side: WindowSide,
    /// Print a joined listing's description as a system message.
    pub show_description_on_join: bool,
    /// Evaluate joinability as if every listing were one-player-per-job.
    pub always_one_player_per_job: bool,
}

// ---------------------------------------------------------------------------
// PresetStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PresetStore {
    pub version: u32,
    pub presets: BTreeMap<PresetId, Preset>,
    pub selected_preset: Option<PresetId>,
    pub settings: StoreSettings,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            presets: BTreeMap::new(),
            selected_preset: None,
            settings: StoreSettings::default(),
        }
    }
}

impl PresetStore {
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: PresetId) -> Option<&Preset> {
        self.presets.get(&id)
    }

    pub fn get_mut(&mut self, id: PresetId) -> Option<&mut Preset> {
        self.presets.get_mut(&id)
    }

    /// Presets ordered by name, then ID.
    pub fn presets_by_name(&self) -> Vec<(PresetId, &Preset)> {
        let mut list: Vec<_> = self.presets.iter().map(|(id, p)| (*id, p)).collect();
        list.sort_by(|a, b| a.1.name.cmp(&b.1.name).then(a.0.cmp(&b.0)));
        list
    }

    /// Stores `preset` under a fresh ID.
    pub fn insert(&mut self, preset: Preset) -> PresetId {
        let id = PresetId::new();
        self.presets.insert(id, preset);
        id
    }

    /// Adds a new preset with every category selected and selects it.
    pub fn create(&mut self) -> PresetId {
        let id = self.insert(Preset::create());
        self.selected_preset = Some(id);
        id
    }

    /// Copies preset `id` under a fresh ID and selects the copy.
    pub fn duplicate(&mut self, id: PresetId) -> Result<PresetId, StoreError> {
        let copy = self
            .get(id)
            .ok_or(StoreError::UnknownPreset(id))?
            .duplicate();
        let new_id = self.insert(copy);
        self.selected_preset = Some(new_id);
        Ok(new_id)
    }

    /// Selects a preset, or clears the selection with `None`.
    pub fn select(&mut self, id: Option<PresetId>) -> Result<(), StoreError> {
        if let Some(id) = id {
            if !self.presets.contains_key(&id) {
                return Err(StoreError::UnknownPreset(id));
            }
        }
        self.selected_preset = id;
        Ok(())
    }

    /// Removes a preset. Clears the selection if it pointed at it.
    pub fn remove(&mut self, id: PresetId) -> Option<Preset> {
        let removed = self.presets.remove(&id)?;
        if self.selected_preset == Some(id) {
            self.selected_preset = None;
        }
        Some(removed)
    }

    pub fn rename(&mut self, id: PresetId, name: &str) -> Result<(), StoreError> {
        let preset = self.get_mut(id).ok_or(StoreError::UnknownPreset(id))?;
        preset.rename(name)?;
        Ok(())
    }

    /// Clears a selection that points at a missing preset. Returns `true` if
    /// the selection was changed.
    pub fn demote_dangling(&mut self) -> bool {
        match self.selected_preset {
            Some(id) if !self.presets.contains_key(&id) => {
                warn!(preset = %id, "selected preset no longer exists, clearing selection");
                self.selected_preset = None;
                true
            }
            _ => false,
        }
    }

    /// The selected preset, demoting a dangling selection first.
    pub fn active(&mut self) -> Option<&Preset> {
        self.demote_dangling();
        self.selected_preset.and_then(|id| self.presets.get(&id))
    }

    /// Read-only view of the selected preset. A dangling selection reads as
    /// no preset.
    pub fn peek_active(&self) -> Option<&Preset> {
        self.selected_preset.and_then(|id| self.presets.get(&id))
    }

    pub fn eval_context(&self, max_item_level: u32) -> EvalContext {
        EvalContext {
            max_item_level,
            assume_one_player_per_job: self.settings.always_one_player_per_job,
        }
    }

    /// Owned snapshot of the active filter for the feed.
    pub fn active_filter(&self, max_item_level: u32) -> ActiveFilter {
        ActiveFilter::new(
            self.peek_active().cloned(),
            self.eval_context(max_item_level),
        )
    }
}

// ---------------------------------------------------------------------------
// PresetManager
// ---------------------------------------------------------------------------

/// Store plus repository: every mutation is followed by a save.
pub struct PresetManager<R: PresetRepository> {
    store: PresetStore,
    repo: R,
}

impl<R: PresetRepository> PresetManager<R> {
    /// Loads the store, or starts empty when nothing was saved.
    pub fn load(repo: R) -> Result<Self, StoreError> {
        let mut store = match repo.load()? {
            Some(store) => {
                info!(presets = store.len(), "loaded preset store");
                store
            }
            None => {
                info!("no saved preset store, starting empty");
                PresetStore::default()
            }
        };
        store.demote_dangling();
        Ok(Self { store, repo })
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Persists the whole store.
    pub fn save(&self) -> Result<(), StoreError> {
        match self.repo.save(&self.store) {
            Ok(()) => {
                info!(presets = self.store.len(), "saved preset store");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to save preset store, continuing unsaved");
                Err(e)
            }
        }
    }

    /// Applies `f` to a copy of the store and saves. If `f` fails the store
    /// is left unchanged. If the save fails the change stays in memory and
    /// the save error is returned.
    pub fn update<T>(
        &mut self,
        f: impl FnOnce(&mut PresetStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.store.clone();
        let out = f(&mut next)?;
        self.store = next;
        self.save()?;
        Ok(out)
    }

    /// Applies `f` to preset `id` and saves.
    pub fn edit_preset<T>(
        &mut self,
        id: PresetId,
        f: impl FnOnce(&mut Preset) -> T,
    ) -> Result<T, StoreError> {
        self.update(|store| {
            let preset = store.get_mut(id).ok_or(StoreError::UnknownPreset(id))?;
            Ok(f(preset))
        })
    }

    pub fn create(&mut self) -> Result<PresetId, StoreError> {
        self.update(|store| Ok(store.create()))
    }

    pub fn duplicate(&mut self, id: PresetId) -> Result<PresetId, StoreError> {
        self.update(|store| store.duplicate(id))
    }

    pub fn select(&mut self, id: Option<PresetId>) -> Result<(), StoreError> {
        self.update(|store| store.select(id))
    }

    pub fn remove(&mut self, id: PresetId) -> Result<Preset, StoreError> {
        let missing = StoreError::UnknownPreset(id);
        self.update(|store| store.remove(id).ok_or(missing))
    }

    pub fn rename(&mut self, id: PresetId, name: &str) -> Result<(), StoreError> {
        self.update(|store| store.rename(id, name))
    }

    pub fn update_settings(
        &mut self,
        f: impl FnOnce(&mut StoreSettings),
    ) -> Result<(), StoreError> {
        self.update(|store| {
            f(&mut store.settings);
            Ok(())
        })
    }

    pub fn active_filter(&self, max_item_level: u32) -> ActiveFilter {
        self.store.active_filter(max_item_level)
    }
}
