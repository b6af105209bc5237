//! Persisted settings and the usage counter store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::budget::DEFAULT_MAX_PROMPT_TOKENS;
use crate::error::SettingsError;
use crate::prompt::DEFAULT_TEMPLATE;

/// Process-wide configuration, loaded once at startup.
///
/// `hits` counts successful generations across invocations; everything else
/// is user configuration with documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Instruction template with a `{diff}` placeholder.
    pub prompt_template: String,
    /// Ceiling on prompt size in tokens.
    pub max_prompt_tokens: usize,
    /// Number of alternative completions requested per call.
    pub candidate_count: u32,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Successful generations recorded so far.
    pub hits: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt_template: DEFAULT_TEMPLATE.to_string(),
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            candidate_count: 1,
            model: "gpt-4o-mini".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 60,
            hits: 0,
        }
    }
}

/// Records one usage hit per successful generation; persisted across
/// invocations.
pub trait UsageStore: Send + Sync {
    fn record_hit(&self) -> Result<(), SettingsError>;
}

/// File-backed settings store.
///
/// Constructed once in `main` and passed explicitly to whatever needs it;
/// there is no ambient global. Counter updates take an exclusive advisory
/// lock so concurrent invocations do not race.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the platform configuration directory
    /// (e.g. `~/.config/epigraf/settings.toml`).
    pub fn from_default_location() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::at(dir.join("epigraf").join("settings.toml")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unparseable. A corrupt file is reported but never fatal.
    pub fn load(&self) -> Settings {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Settings::default(),
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Settings file {} is invalid ({e}); using defaults",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    /// Atomically rewrite the settings file.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let dir = self.path.parent().ok_or(SettingsError::NoConfigDir)?;
        fs::create_dir_all(dir).map_err(SettingsError::WriteFailed)?;

        let content =
            toml::to_string_pretty(settings).map_err(SettingsError::SerializeFailed)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(SettingsError::WriteFailed)?;
        tmp.write_all(content.as_bytes())
            .map_err(SettingsError::WriteFailed)?;
        tmp.persist(&self.path)
            .map_err(|e| SettingsError::WriteFailed(e.error))?;

        Ok(())
    }

    /// Take the exclusive advisory lock guarding counter updates. Released
    /// when the returned handle is dropped.
    fn lock(&self) -> Result<File, SettingsError> {
        let dir = self.path.parent().ok_or(SettingsError::NoConfigDir)?;
        fs::create_dir_all(dir).map_err(SettingsError::LockFailed)?;

        let lock_path = self.path.with_extension("toml.lock");
        let file = File::create(&lock_path).map_err(SettingsError::LockFailed)?;
        file.lock_exclusive().map_err(SettingsError::LockFailed)?;
        Ok(file)
    }
}

impl UsageStore for SettingsStore {
    fn record_hit(&self) -> Result<(), SettingsError> {
        let _lock = self.lock()?;
        let mut settings = self.load();
        settings.hits += 1;
        self.save(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_prompt_tokens, 4000);
        assert_eq!(settings.candidate_count, 1);
        assert_eq!(settings.hits, 0);
        assert!(settings.prompt_template.contains("{diff}"));
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.toml"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_load_corrupt_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is { not toml").unwrap();

        let store = SettingsStore::at(&path);
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.toml"));

        let settings = Settings {
            model: "test-model".to_string(),
            max_prompt_tokens: 8000,
            ..Settings::default()
        };
        store.save(&settings).unwrap();

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "model = \"custom\"\n").unwrap();

        let settings = SettingsStore::at(&path).load();
        assert_eq!(settings.model, "custom");
        assert_eq!(settings.max_prompt_tokens, 4000);
    }

    #[test]
    fn test_record_hit_increments_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.toml"));

        store.record_hit().unwrap();
        store.record_hit().unwrap();

        assert_eq!(store.load().hits, 2);

        // A fresh store over the same file sees the persisted counter.
        let reopened = SettingsStore::at(dir.path().join("settings.toml"));
        assert_eq!(reopened.load().hits, 2);
    }

    #[test]
    fn test_record_hit_preserves_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.toml"));

        let settings = Settings {
            model: "kept".to_string(),
            ..Settings::default()
        };
        store.save(&settings).unwrap();

        store.record_hit().unwrap();

        let loaded = store.load();
        assert_eq!(loaded.model, "kept");
        assert_eq!(loaded.hits, 1);
    }
}
