//! Directory listing for hash tree construction

use crate::collector::naming::META_DIR;
use crate::error::StorageError;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One hashable child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A canonical JSON file
    File { path: PathBuf, name: String },
    /// A subdirectory
    Directory { path: PathBuf, name: String },
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::File { name, .. } | Entry::Directory { name, .. } => name,
        }
    }
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    pub follow_symlinks: bool,
    /// Entry names excluded from hashing and from all output
    pub excluded_names: Vec<String>,
    /// Only files with this extension are hashed
    pub file_extension: String,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            excluded_names: vec![META_DIR.to_string()],
            file_extension: "json".to_string(),
        }
    }
}

/// Lists the hashable children of one directory at a time, sorted by name.
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            config: WalkerConfig::default(),
        }
    }

    /// Immediate children of `dir` that take part in hashing.
    pub fn children(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                StorageError::io(path, io::Error::from(e))
            })?;

            if self.should_ignore(&entry) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                entries.push(Entry::Directory {
                    path: entry.into_path(),
                    name,
                });
            } else if file_type.is_file() && self.has_hashed_extension(entry.path()) {
                entries.push(Entry::File {
                    path: entry.into_path(),
                    name,
                });
            }
            // Symlinks are skipped unless followed
        }

        Ok(entries)
    }

    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config
            .excluded_names
            .iter()
            .any(|excluded| excluded.as_str() == name)
    }

    fn has_hashed_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy() == self.config.file_extension.as_str())
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}
