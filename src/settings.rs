use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::lifecycle::FocusLossPolicy;

const MIN_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusSettings {
    /// How often the countdown re-reads the clock.
    pub poll_interval_ms: u64,
    pub focus_loss_policy: FocusLossPolicy,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            focus_loss_policy: FocusLossPolicy::default(),
        }
    }
}

impl FocusSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<FocusSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring malformed settings at {}: {err}",
                    path.display()
                );
                FocusSettings::default()
            })
        } else {
            FocusSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> FocusSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: FocusSettings) -> Result<()> {
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn update_focus_loss_policy(&self, policy: FocusLossPolicy) -> Result<()> {
        let mut next = self.get();
        next.focus_loss_policy = policy;
        self.update(next)
    }

    fn read(&self) -> RwLockReadGuard<'_, FocusSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, FocusSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &FocusSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
