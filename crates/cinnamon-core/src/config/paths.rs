use std::path::PathBuf;

use directories::ProjectDirs;

/// Platform directories for an application, following the XDG Base Directory
/// spec on Linux, `~/Library/Application Support` on macOS and `%APPDATA%` on
/// Windows.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// Returns `None` when no home directory can be determined.
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| ProjectPaths { dirs })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dirs.config_dir().to_path_buf()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dirs.data_dir().to_path_buf()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dirs.cache_dir().to_path_buf()
    }

    /// Directory holding the running executable, i.e. the game directory when
    /// loaded into the host process.
    pub fn executable_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
    }
}
