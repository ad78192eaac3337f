//! Resolved settings for one invocation.
//!
//! Every operation receives its directories, game version and endpoints
//! from a `Config` value instead of shared global state.

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::auth::{Credentials, DEFAULT_AUTH_URL};
use crate::domain::model::Version;
use crate::matchmaking::DEFAULT_MATCHMAKING_URL;
use crate::portal::DEFAULT_PORTAL_URL;
use crate::runtime::Runtime;

/// Values supplied on the command line (or through their environment fallbacks).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mod_dir: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub game_version: Option<String>,
    pub allow_multiple: bool,
    pub portal_url: Option<String>,
    pub auth_url: Option<String>,
    pub matchmaking_url: Option<String>,
    pub credentials: Credentials,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mod_dir: PathBuf,
    pub save_dir: PathBuf,
    /// `0.0.0` accepts releases for any game version
    pub game_version: Version,
    pub allow_multiple: bool,
    pub portal_url: String,
    pub auth_url: String,
    pub matchmaking_url: String,
    pub credentials: Credentials,
}

impl Config {
    /// Resolve overrides against defaults.
    ///
    /// Directories default to `~/.factorio/mods` and `~/.factorio/saves`.
    pub fn load<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let game_version = match overrides.game_version.as_deref() {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid game version {:?}", v))?,
            None => Version::ZERO,
        };

        let mod_dir = match overrides.mod_dir {
            Some(dir) => dir,
            None => default_game_dir(runtime)?.join("mods"),
        };
        let save_dir = match overrides.save_dir {
            Some(dir) => dir,
            None => default_game_dir(runtime)?.join("saves"),
        };

        let config = Self {
            mod_dir,
            save_dir,
            game_version,
            allow_multiple: overrides.allow_multiple,
            portal_url: overrides
                .portal_url
                .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string()),
            auth_url: overrides
                .auth_url
                .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            matchmaking_url: overrides
                .matchmaking_url
                .unwrap_or_else(|| DEFAULT_MATCHMAKING_URL.to_string()),
            credentials: overrides.credentials,
        };
        debug!(
            "Using mod dir {:?}, save dir {:?}, game version {}",
            config.mod_dir, config.save_dir, config.game_version
        );
        Ok(config)
    }
}

fn default_game_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    runtime
        .home_dir()
        .map(|home| home.join(".factorio"))
        .context("Could not determine home directory; pass --mod-dir and --save-dir")
}
