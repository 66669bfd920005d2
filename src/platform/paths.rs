use directories::ProjectDirs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Per-user locations: the TOML config and the rolling log files.
pub struct AppPaths {
    project_dirs: ProjectDirs,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("ru", "arcticbear", "ArcticGuide")
            .ok_or_else(|| Error::platform("Failed to determine application directories"))?;

        Ok(Self { project_dirs })
    }

    pub fn config_file(&self) -> PathBuf {
        self.project_dirs.config_dir().join("config.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.project_dirs.data_dir().join("logs")
    }

    pub fn ensure_dirs_exist(&self) -> Result<()> {
        std::fs::create_dir_all(self.project_dirs.config_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
