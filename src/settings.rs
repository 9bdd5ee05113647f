use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const BACKEND_URL_ENV: &str = "RECIPE_COMPANION_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    /// Rescale on the client with the scaling engine.
    Local,
    /// Ask the agent to rescale and wait for its snapshot.
    Dispatched,
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Local
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanionSettings {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub confirm_timeout_ms: u64,
    pub scale_mode: ScaleMode,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            poll_interval_ms: 50,
            confirm_timeout_ms: 15_000,
            scale_mode: ScaleMode::Local,
        }
    }
}

impl CompanionSettings {
    /// Environment wins over the stored backend URL so a dev build can
    /// point at a local backend without touching settings.json.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend_url = url.trim().to_string();
            }
        }
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<CompanionSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings at {}: {err}", path.display());
                CompanionSettings::default()
            })
        } else {
            CompanionSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> CompanionSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: CompanionSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &CompanionSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, CompanionSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, CompanionSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get(), CompanionSettings::default());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let settings = CompanionSettings {
            scale_mode: ScaleMode::Dispatched,
            confirm_timeout_ms: 5_000,
            ..CompanionSettings::default()
        };
        store.update(settings.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.get(), settings);
    }

    #[test]
    fn test_partial_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{"scaleMode":"dispatched"}"#).unwrap();
        let partial = SettingsStore::new(path.clone()).unwrap().get();
        assert_eq!(partial.scale_mode, ScaleMode::Dispatched);
        assert_eq!(partial.poll_interval_ms, 50);

        fs::write(&path, "{not json").unwrap();
        let corrupt = SettingsStore::new(path).unwrap().get();
        assert_eq!(corrupt, CompanionSettings::default());
    }
}
