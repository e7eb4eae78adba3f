use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{
    app_dirs::AppDirs,
    error::{Error, Result},
    quote_generator::{CleanOptions, DEFAULT_TABSIZE},
    session::SessionConfig,
    stats::SpeedUnit,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Lines per quote.
    pub maxlines: usize,
    /// Columns per quote line.
    pub width: usize,
    pub wrap: usize,
    pub strip: bool,
    pub tabsize: usize,
    pub strict: bool,
    pub indent: bool,
    pub syntax: bool,
    /// Robot speed in `unit`. 0 keeps the robot parked.
    pub robot_speed: f64,
    pub unit: SpeedUnit,
    pub player_name: String,
    pub robot_name: String,
    pub files: Vec<PathBuf>,
    pub sentences: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            maxlines: 10,
            width: 72,
            wrap: 0,
            strip: false,
            tabsize: DEFAULT_TABSIZE,
            strict: false,
            indent: true,
            syntax: true,
            robot_speed: 0.0,
            unit: SpeedUnit::default(),
            player_name: "you".to_string(),
            robot_name: "robot".to_string(),
            files: Vec::new(),
            sentences: false,
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.maxlines == 0 {
            return Err(Error::InvalidConfig {
                field: "maxlines",
                reason: "needs at least one line".into(),
            });
        }
        if self.width == 0 {
            return Err(Error::InvalidConfig {
                field: "width",
                reason: "needs at least one column".into(),
            });
        }
        if !self.robot_speed.is_finite() || self.robot_speed < 0.0 {
            return Err(Error::InvalidConfig {
                field: "robot speed",
                reason: format!("{} is not a speed", self.robot_speed),
            });
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            strict: self.strict,
            indent: self.indent,
            syntax: self.syntax,
            tabsize: self.tabsize,
        }
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            strip: self.strip,
            tabsize: self.tabsize,
            wrap: self.wrap,
        }
    }

    /// Robot speed in characters per second.
    pub fn robot_cps(&self) -> f64 {
        self.unit.to_cps(self.robot_speed)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typepad_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Falls back to the defaults when the file is missing or unreadable.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
