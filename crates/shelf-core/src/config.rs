//! Library configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use shelf_interchange::DuplicateHandling;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Where `export_to_file` writes
    pub export_dir: PathBuf,
    /// What an import does with URLs already in the library
    pub duplicate_handling: DuplicateHandling,
    /// Write the folder tree in HTML exports
    pub include_folders: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let export_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("Exports"));

        Self {
            database_path: data_dir.join("shelf.db"),
            export_dir,
            duplicate_handling: DuplicateHandling::default(),
            include_folders: true,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Shelf"))
            .unwrap_or_else(|| PathBuf::from(".shelf"))
    }

    /// Read a JSON config file. Fields missing from the file keep their
    /// defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Platform directories from the usual environment variables
mod dirs {
    use std::path::PathBuf;

    fn home() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        let var = "USERPROFILE";
        #[cfg(not(target_os = "windows"))]
        let var = "HOME";

        std::env::var_os(var).map(PathBuf::from)
    }

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            home().map(|h| h.join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var_os("XDG_DATA_HOME")
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join(".local/share")))
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    pub fn download_dir() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            std::env::var_os("XDG_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join("Downloads")))
        }
        #[cfg(not(target_os = "linux"))]
        {
            home().map(|h| h.join("Downloads"))
        }
    }
}
