use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "typepad")
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Suggested location for `--log-file`.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("typepad");
            Some(state_dir.join("typepad.log"))
        } else {
            Self::project().map(|dirs| dirs.data_local_dir().join("typepad.log"))
        }
    }
}
