use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::tree::ProbabilityPath;
use crate::types::{FortuneError, Result};

pub const DEFAULT_FORTUNE_PATH: &str = "/usr/share/games/fortunes";
pub const DEFAULT_OFFENSIVE_PATH: &str = "/usr/share/games/fortunes/off";
pub const CONFIG_FILE_NAME: &str = ".gofortune.json";
pub const FORTUNE_PATH_ENV: &str = "FORTUNE_PATH";

/// Which part of the configured corpus a request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchSet {
    #[default]
    Normal,
    Offensive,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortuneConfig {
    pub fortune_paths: Vec<PathBuf>,
    pub offensive_paths: Vec<PathBuf>,
    /// Fortunes shorter than this many bytes count as short.
    pub longest_short: u32,
    pub min_wait_seconds: u64,
    pub chars_per_second: u64,
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            fortune_paths: vec![PathBuf::from(DEFAULT_FORTUNE_PATH)],
            offensive_paths: vec![PathBuf::from(DEFAULT_OFFENSIVE_PATH)],
            longest_short: 160,
            min_wait_seconds: 6,
            chars_per_second: 20,
        }
    }
}

impl FortuneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FortuneError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_reader(file).map_err(|e| FortuneError::Config(format!("{}: {e}", path.display())))
    }

    /// `$HOME/.gofortune.json` if present, defaults otherwise, then the
    /// `FORTUNE_PATH` override and localized default directories.
    pub fn discover() -> Result<Self> {
        let from_home = env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file());

        let config = match from_home {
            Some(path) => {
                debug!("using config file {}", path.display());
                Self::load(&path)?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides().localized(env::var("LANG").ok().as_deref()))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(paths) = env::var_os(FORTUNE_PATH_ENV) {
            let paths: Vec<PathBuf> = env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()).collect();
            if !paths.is_empty() {
                self.fortune_paths = paths;
            }
        }
        self
    }

    /// Swap each search directory for its `<dir>/<lang>` subdirectory when
    /// that exists, e.g. `LANG=de_DE.UTF-8` selects `fortunes/de`.
    pub fn localized(mut self, lang: Option<&str>) -> Self {
        let Some(lang) = lang.and_then(language_code) else {
            return self;
        };
        let localize = |paths: &mut Vec<PathBuf>| {
            for path in paths.iter_mut() {
                let candidate = path.join(&lang);
                if candidate.is_dir() {
                    *path = candidate;
                }
            }
        };
        localize(&mut self.fortune_paths);
        localize(&mut self.offensive_paths);
        self
    }

    pub fn search_paths(&self, set: SearchSet) -> Vec<ProbabilityPath> {
        let paths: Vec<&PathBuf> = match set {
            SearchSet::Normal => self.fortune_paths.iter().collect(),
            SearchSet::Offensive => self.offensive_paths.iter().collect(),
            SearchSet::All => self.fortune_paths.iter().chain(&self.offensive_paths).collect(),
        };
        paths.into_iter().map(|p| ProbabilityPath::new(p.clone())).collect()
    }

    /// Seconds to linger after printing `len` bytes.
    pub fn wait_seconds(&self, len: usize) -> u64 {
        let per_second = self.chars_per_second.max(1);
        (len as u64 / per_second).max(self.min_wait_seconds)
    }
}

/// `de_DE.UTF-8` -> `de`. `C` and `POSIX` carry no language.
fn language_code(lang: &str) -> Option<String> {
    let code = lang.split(['_', '.', '@']).next()?.trim();
    if code.is_empty() || code == "C" || code == "POSIX" {
        None
    } else {
        Some(code.to_lowercase())
    }
}
