use crate::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

// region:        --- Constants

pub const DEFAULT_THREADS: usize = 50;
pub const DEFAULT_WORDLIST_PATH: &str = "wordlists/default.txt";

// timeouts
pub const SOCKET_CON_TIMEOUT_MS: u64 = 2000;
pub const HTTP_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const RESOLVE_DNS_TIMEOUT_MS: u64 = 4000;

// endregion:     --- Constants

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: String,
    pub wordlist: Option<PathBuf>,
    pub threads: usize,
    pub output_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub verbose: bool,
    pub save_logs: bool,
}

impl ScanConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            wordlist: None,
            threads: DEFAULT_THREADS,
            output_file: None,
            output_dir: None,
            verbose: false,
            save_logs: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(Error::InvalidConfig("target domain is required".into()));
        }
        if self.threads == 0 {
            return Err(Error::InvalidConfig("threads must be at least 1".into()));
        }
        Ok(())
    }

    pub fn wordlist_path(&self) -> Result<PathBuf> {
        match &self.wordlist {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(Error::WordlistNotFound {
                tried: vec![path.clone()],
            }),
            None => {
                warn!("No wordlist specified, using default wordlist");
                let exe_dir = env::current_exe()?
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                default_wordlist(Path::new("."), &exe_dir)
            }
        }
    }
}

fn default_wordlist(cwd: &Path, exe_dir: &Path) -> Result<PathBuf> {
    let tried: Vec<PathBuf> = [cwd, exe_dir]
        .iter()
        .map(|dir| dir.join(DEFAULT_WORDLIST_PATH))
        .collect();

    match tried.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(Error::WordlistNotFound { tried }),
    }
}
