use crate::session::{Mode, TestOptions, DURATIONS, WORD_COUNTS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User preferences persisted between runs: test options plus the theme.
/// The session core never touches this; the binary loads it at startup and
/// saves it whenever an option changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub duration_secs: u64,
    pub word_count: usize,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        let options = TestOptions::default();
        Self {
            mode: options.mode,
            duration_secs: options.duration_secs,
            word_count: options.word_count,
            theme: "default".to_string(),
        }
    }
}

impl Config {
    pub fn options(&self) -> TestOptions {
        TestOptions {
            mode: self.mode,
            duration_secs: self.duration_secs,
            word_count: self.word_count,
        }
    }

    /// Clamp persisted values back onto the supported sets, in case the
    /// file was hand-edited.
    pub fn sanitized(mut self) -> Self {
        if !DURATIONS.contains(&self.duration_secs) {
            self.duration_secs = TestOptions::default().duration_secs;
        }
        if !WORD_COUNTS.contains(&self.word_count) {
            self.word_count = TestOptions::default().word_count;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tappr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("tappr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg.sanitized();
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
