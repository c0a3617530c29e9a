use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

use crate::analysis::AnalysisConfig;

pub const ENV_API_URL: &str = "DROWSEWATCH_API_URL";
pub const ENV_TOKEN: &str = "DROWSEWATCH_TOKEN";
pub const ENV_DB: &str = "DROWSEWATCH_DB";
pub const ENV_FPS: &str = "DROWSEWATCH_FPS";

/// Accepted capture rates. Cooldowns and the blink window are sample counts
/// derived from the rate, so zero would disable them.
pub const SAMPLES_PER_SECOND_RANGE: RangeInclusive<u32> = 1..=1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorSettings {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub samples_per_second: u32,
    /// When set, sessions are kept in this SQLite file instead of the backend.
    pub database_path: Option<PathBuf>,
    /// Bearer credential. Only ever comes from the environment.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001".into(),
            request_timeout_ms: 10_000,
            samples_per_second: 30,
            database_path: None,
            token: None,
        }
    }
}

impl MonitorSettings {
    pub fn validate(&self) -> Result<()> {
        if !SAMPLES_PER_SECOND_RANGE.contains(&self.samples_per_second) {
            bail!(
                "samplesPerSecond must be within {}..={}, got {}",
                SAMPLES_PER_SECOND_RANGE.start(),
                SAMPLES_PER_SECOND_RANGE.end(),
                self.samples_per_second
            );
        }
        Ok(())
    }

    /// Replaces values that fail `validate` with their defaults.
    fn sanitized(mut self) -> Self {
        if let Err(err) = self.validate() {
            warn!("{err}; using {}", Self::default().samples_per_second);
            self.samples_per_second = Self::default().samples_per_second;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::with_samples_per_second(self.samples_per_second)
    }

    /// Applies `DROWSEWATCH_*` overrides from `vars`. Unparseable values are
    /// ignored with a warning.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let value: String = value.into();
            match key.as_ref() {
                ENV_API_URL => self.api_url = value,
                ENV_TOKEN if !value.is_empty() => self.token = Some(value),
                ENV_DB if !value.is_empty() => self.database_path = Some(PathBuf::from(value)),
                ENV_FPS => match value.parse::<u32>() {
                    Ok(fps) if SAMPLES_PER_SECOND_RANGE.contains(&fps) => {
                        self.samples_per_second = fps
                    }
                    _ => warn!(
                        "ignoring {ENV_FPS}={value}: expected an integer in {}..={}",
                        SAMPLES_PER_SECOND_RANGE.start(),
                        SAMPLES_PER_SECOND_RANGE.end()
                    ),
                },
                _ => {}
            }
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<MonitorSettings>,
}

impl SettingsStore {
    /// Loads `path` if it exists, otherwise starts from defaults. A file that
    /// fails to parse also falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str::<MonitorSettings>(&contents)
                .map(MonitorSettings::sanitized)
                .unwrap_or_else(|err| {
                    warn!("settings file {} is invalid ({err}); using defaults", path.display());
                    MonitorSettings::default()
                })
        } else {
            MonitorSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Like `new`, then applies overrides from the process environment.
    pub fn load_with_env(path: PathBuf) -> Result<Self> {
        let store = Self::new(path)?;
        store.write().apply_overrides(std::env::vars());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> MonitorSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: MonitorSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &MonitorSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MonitorSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MonitorSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
