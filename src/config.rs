//! Runtime configuration, read from flags or the environment.

use std::path::PathBuf;

use clap::Args;

use crate::content::{Corpus, Locale};
use crate::error::CorpusError;
use crate::state::{StateError, StateStore};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Content language (en, ja). Unknown values fall back to en
    #[arg(long = "lang", env = "SKILL_FORGE_LANG", global = true)]
    pub lang: Option<String>,

    /// Persist progress and the access log across restarts ("true" to enable)
    #[arg(long, env = "SKILL_FORGE_PERSIST", global = true)]
    pub persist: Option<String>,

    /// Override the state file location (default: ~/.skill-forge-mcp/state.json)
    #[arg(long, env = "SKILL_FORGE_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Load phase documents from this directory instead of the bundled set
    #[arg(long, env = "SKILL_FORGE_CONTENT_DIR", global = true)]
    pub content_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub locale: Locale,
    pub persist: bool,
    pub state_file: Option<PathBuf>,
    pub content_dir: Option<PathBuf>,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            locale: args.lang.as_deref().map(Locale::resolve).unwrap_or_default(),
            persist: is_enabled(args.persist.as_deref()),
            state_file: args.state_file,
            content_dir: args.content_dir,
        }
    }
}

impl Config {
    /// Bundled documents unless a content directory was given.
    pub fn corpus(&self) -> Result<Corpus, CorpusError> {
        match &self.content_dir {
            Some(dir) => {
                tracing::info!("Loading phase documents from {}", dir.display());
                Corpus::from_dir(dir)
            }
            None => Corpus::bundled(),
        }
    }

    pub fn state_store(&self) -> Result<StateStore, StateError> {
        if !self.persist {
            return Ok(StateStore::disabled());
        }
        let path = match &self.state_file {
            Some(path) => path.clone(),
            None => StateStore::default_path()?,
        };
        Ok(StateStore::enabled(path))
    }
}

/// Only a case-insensitive `true` turns persistence on.
pub fn is_enabled(flag: Option<&str>) -> bool {
    flag.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
