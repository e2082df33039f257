// fileref-check/src/settings.rs

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};
use tracing::{debug, warn};

use crate::{
    error::SettingsError,
    report::DEFAULT_CONTEXT_RADIUS,
    resolver::{Resolver, DEFAULT_MAX_DEPTH},
};

/// Checked when nothing else names a document.
pub const DEFAULT_DOCUMENT: &str = "~/.config/opencode/opencode.json";

/// Used for `~` when neither settings, `HOME`, nor the platform know a home directory.
pub const FALLBACK_HOME: &str = "/";

/// Tool settings. Merged: defaults -> user file -> `--settings` file -> command line.
/// Every field is optional so a layer only overrides what it sets.
#[derive(Clone, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON document to check; a leading `~` is expanded.
    pub document: Option<PathBuf>,
    /// Replacement for `~` inside `{file:...}` paths.
    pub home: Option<String>,
    pub max_depth: Option<usize>,
    pub context_radius: Option<usize>,
    /// JSON Schema the resolved document is validated against.
    pub schema: Option<PathBuf>,
}

pub fn merge(a: &mut Settings, b: &Settings) {
    fn ov<T: Clone>(dst: &mut Option<T>, src: &Option<T>) { if src.is_some() { *dst = src.clone(); } }
    ov(&mut a.document, &b.document);
    ov(&mut a.home, &b.home);
    ov(&mut a.max_depth, &b.max_depth);
    ov(&mut a.context_radius, &b.context_radius);
    ov(&mut a.schema, &b.schema);
}

/// `config.toml` in the per-user config directory, if the platform has one.
pub fn user_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "earthlings", "fileref-check").map(|p| p.config_dir().join("config.toml"))
}

impl Settings {
    pub fn read_file(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)
            .map_err(|source| SettingsError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })
    }

    /// Merge the file layers. A broken user file is skipped with a warning;
    /// an explicit file must exist and parse.
    pub fn load_layers(user: Option<&Path>, explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut merged = Settings::default();
        if let Some(path) = user.filter(|p| p.exists()) {
            match Self::read_file(path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "loaded user settings");
                    merge(&mut merged, &layer);
                }
                Err(e) => warn!(error = %e, "ignoring user settings"),
            }
        }
        if let Some(path) = explicit {
            merge(&mut merged, &Self::read_file(path)?);
            debug!(path = %path.display(), "loaded settings file");
        }
        Ok(merged)
    }

    /// Pick the home directory: settings, then the given `HOME` value, then the platform.
    pub fn home_dir(&self, env_home: Option<String>) -> String {
        self.home
            .clone()
            .or(env_home.filter(|h| !h.is_empty()))
            .or_else(|| BaseDirs::new().map(|b| b.home_dir().display().to_string()))
            .unwrap_or_else(|| FALLBACK_HOME.to_string())
    }

    pub fn document_path(&self, home: &str) -> PathBuf {
        let doc = self.document.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT));
        match doc.to_str().and_then(|s| s.strip_prefix('~')) {
            Some(rest) => PathBuf::from(format!("{home}{rest}")),
            None => doc,
        }
    }

    pub fn context_radius(&self) -> usize { self.context_radius.unwrap_or(DEFAULT_CONTEXT_RADIUS) }

    pub fn resolver(&self, home: &str) -> Resolver {
        Resolver::new(home).with_max_depth(self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH))
    }
}
