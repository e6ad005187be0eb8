//! Persistent storage
//!
//! String-keyed entries kept as one file per key under the platform config
//! directory, plus TOML helpers for typed entries.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory of the shared clock series config dir
pub const APP_DIR_NAME: &str = "world_clock";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Base configuration directory shared by the clocks
pub fn base_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "clock-series", "clocks").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Directory holding the world clock's entries
pub fn config_dir() -> Option<PathBuf> {
    base_config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Raw string storage. Absent keys read as `None`.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// One `{key}.toml` file per entry
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at [`config_dir`]
    pub fn open_default() -> Result<Self> {
        config_dir().map(Self::new).ok_or(ConfigError::NoConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.toml", key)))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and as a fallback when no config dir exists
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Load a TOML entry
///
/// Returns `None` if the entry doesn't exist yet.
/// Returns an error if it exists but can't be parsed.
pub fn load_entry<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.read(key)? {
        Some(contents) => Ok(Some(toml::from_str(&contents)?)),
        None => Ok(None),
    }
}

/// Save a TOML entry
pub fn save_entry<T: Serialize>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let contents = toml::to_string_pretty(value)?;
    store.write(key, &contents)
}
