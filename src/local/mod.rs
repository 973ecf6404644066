//! # Local API assembly
//!
//! Builds a ready [`Api`] for the current user and working directory:
//!
//! 1. Discover user and project configuration paths.
//! 2. Register the `local` and `null` builders.
//! 3. With a project: apply the project's activation table (or the default).
//!    Without one: activate `local` for `project` only.
//! 4. Activate `null` for every required capability still unclaimed.
//!
//! A missing project is reported as [`Error::NoProjectFound`] alongside a
//! usable API, never instead of one.

pub mod discovery;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use discovery::{
    discover_project_paths, discover_user_paths, find_project_root, set_project_root,
};

use crate::builder::{
    ActivationConfig, Api, BuilderApi, Capability, Priority, DEFAULT_PRIORITY,
};
use crate::context::RunContext;
use crate::errors::Error;
use crate::handlers::local::{LocalBuilder, LOCAL_BUILDER_NAME};
use crate::handlers::null::{NullBuilder, NULL_BUILDER_NAME};
use crate::operation::OperationResult;

/// Project configuration folder, searched for up the directory tree.
pub const PROJECT_CONF_FOLDER: &str = ".kraut";
/// User configuration sub-path under the platform config dir.
pub const USER_CONF_SUBPATH: &str = "kraut";
/// Activation table file name inside a configuration path.
pub const ACTIVATION_FILE: &str = "api.yml";
/// Flat settings file name inside a configuration path.
pub const SETTINGS_FILE: &str = "settings.yml";

/// Overrides project discovery.
pub const PROJECT_DIR_ENV: &str = "KRAUT_PROJECT_DIR";
/// Overrides the user configuration directory.
pub const USER_DIR_ENV: &str = "KRAUT_USER_DIR";

/// Priority the null builder uses for fallback claims.
pub const FALLBACK_PRIORITY: Priority = 0;

/// Discovered environment for the local builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSettings {
    /// Directory the API is assembled from.
    pub exec_path: PathBuf,
    /// Configuration directories, lowest priority first.
    #[serde(default)]
    pub config_paths: Vec<PathBuf>,
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    #[serde(default)]
    pub project_exists: bool,
    #[serde(skip)]
    pub context: RunContext,
}

impl LocalSettings {
    pub fn new(exec_path: impl Into<PathBuf>) -> Self {
        Self {
            exec_path: exec_path.into(),
            ..Self::default()
        }
    }
}

/// The activation table used when a project has no `api.yml`.
pub fn default_activations() -> ActivationConfig {
    ActivationConfig::default().with(
        LOCAL_BUILDER_NAME,
        [Capability::Config, Capability::Setting, Capability::Project],
        DEFAULT_PRIORITY,
    )
}

/// The activation table from the highest-priority `api.yml`, or the default.
pub fn load_activations(config_paths: &[PathBuf]) -> ActivationConfig {
    let found = config_paths
        .iter()
        .rev()
        .map(|dir| dir.join(ACTIVATION_FILE))
        .find(|path| path.is_file());

    match found {
        Some(path) => match ActivationConfig::load(&path) {
            Ok(config) => {
                log::debug!("Using activation table {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}; using default activations", e);
                default_activations()
            }
        },
        None => default_activations(),
    }
}

/// Assemble the registry without snapshotting it, for callers that want to
/// inspect activations.
pub fn build_local_registry(settings: LocalSettings) -> (BuilderApi, Option<Error>) {
    let project_exists = settings.project_exists;
    let config_paths = settings.config_paths.clone();

    let mut registry = BuilderApi::new();
    if let Err(e) = registry.add_builder(LocalBuilder::new(settings)) {
        log::error!("{}", e);
    }
    if let Err(e) = registry.add_builder(NullBuilder::new()) {
        log::error!("{}", e);
    }

    let mut error = None;
    if project_exists {
        report(registry.apply_activations(&load_activations(&config_paths)));
    } else {
        report(registry.activate_builder(
            LOCAL_BUILDER_NAME,
            [Capability::Project],
            DEFAULT_PRIORITY,
        ));
        error = Some(Error::NoProjectFound);
    }

    let gaps = registry.unclaimed(&Capability::REQUIRED);
    if !gaps.is_empty() {
        log::info!(
            "Falling back to null handlers for: {}",
            gaps.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
        );
        report(registry.activate_builder(NULL_BUILDER_NAME, gaps, FALLBACK_PRIORITY));
    }

    (registry, error)
}

/// Assemble the composed API from already discovered settings.
pub fn make_local_api(settings: LocalSettings) -> (Api, Option<Error>) {
    let (registry, error) = build_local_registry(settings);
    (registry.api(), error)
}

/// Discover settings from the current directory and assemble the API.
pub fn make_default_local_api() -> (Api, Option<Error>) {
    let exec_path = std::env::current_dir().unwrap_or_else(|e| {
        log::warn!("Cannot read working directory ({}); using \".\"", e);
        PathBuf::from(".")
    });
    let mut settings = LocalSettings::new(exec_path);
    discover_user_paths(&mut settings);
    discover_project_paths(&mut settings);
    make_local_api(settings)
}

// Activation problems are logged; the fallback pass still closes any gap.
fn report(result: OperationResult) {
    for error in result.errors() {
        log::warn!("Activation: {}", error);
    }
}
