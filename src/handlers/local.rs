//! Local builder: filesystem-backed config, settings and project handlers.
//!
//! Config paths are ordered lowest priority first, so lookups that want the
//! "winning" source walk them in reverse while merges walk them forward.
//!
//! Every handler carries the run context from [`LocalSettings`] and stops
//! touching the filesystem once it is cancelled.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::{
    Builder, Capability, ConfigHandler, Handler, Implementations, ProjectHandler, SettingHandler,
};
use crate::context::RunContext;
use crate::errors::{BuilderError, HandlerError};
use crate::local::{LocalSettings, ACTIVATION_FILE, PROJECT_CONF_FOLDER, SETTINGS_FILE};
use crate::operation::{Properties, Property, PropertyKind};

pub const LOCAL_BUILDER_NAME: &str = "local";

pub const LOCAL_EXECPATH: &str = "local.execpath";
pub const LOCAL_CONFIGPATHS: &str = "local.configpaths";

const CONFIG_EXTENSION: &str = "yml";

// Files in a configuration path that belong to the API itself.
const RESERVED_FILES: [&str; 2] = [SETTINGS_FILE, ACTIVATION_FILE];

// ---------------------------------------------------------------------------
// LocalBuilder
// ---------------------------------------------------------------------------

/// Builds handlers over a set of discovered local paths.
#[derive(Debug)]
pub struct LocalBuilder {
    settings: LocalSettings,
    properties: Properties,
}

impl LocalBuilder {
    pub fn new(settings: LocalSettings) -> Self {
        let properties = builder_properties(&settings);
        Self {
            settings,
            properties,
        }
    }

    pub fn settings(&self) -> &LocalSettings {
        &self.settings
    }
}

fn builder_properties(settings: &LocalSettings) -> Properties {
    let mut exec_path = Property::new(
        LOCAL_EXECPATH,
        "Execution path.",
        "The directory the API was assembled from.",
        PropertyKind::String,
    );
    exec_path.set(settings.exec_path.display().to_string());

    let mut config_paths = Property::new(
        LOCAL_CONFIGPATHS,
        "Configuration paths.",
        "Directories searched for configuration, lowest priority first.",
        PropertyKind::StringList,
    );
    config_paths.set(
        settings
            .config_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    );

    Properties::new().with(exec_path).with(config_paths)
}

impl Builder for LocalBuilder {
    fn name(&self) -> &str {
        LOCAL_BUILDER_NAME
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn implementations(&self) -> Implementations {
        Implementations::new([Capability::Config, Capability::Setting, Capability::Project])
    }

    fn build(
        &self,
        capability: &Capability,
        _options: &Properties,
    ) -> Result<Handler, BuilderError> {
        self.ensure_supported(capability)?;
        let paths = self.settings.config_paths.clone();
        let context = self.settings.context.clone();
        let handler = match capability {
            Capability::Config => {
                Handler::Config(Arc::new(LocalConfigHandler::new(paths, context)))
            }
            Capability::Setting => {
                Handler::Setting(Arc::new(LocalSettingHandler::load(&paths, &context)))
            }
            Capability::Project => Handler::Project(Arc::new(LocalProjectHandler {
                root: self.settings.project_root.clone(),
                exists: self.settings.project_exists,
                context,
            })),
            _ => {
                return Err(BuilderError::CapabilityNotSupported {
                    builder: LOCAL_BUILDER_NAME.to_string(),
                    capability: capability.clone(),
                })
            }
        };
        Ok(handler)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Reads `<path>/<key>.yml` from the highest-priority path that has it.
///
/// `settings.yml` and `api.yml` are not config blobs and are never served.
#[derive(Debug, Clone)]
pub struct LocalConfigHandler {
    paths: Vec<PathBuf>,
    context: RunContext,
}

impl LocalConfigHandler {
    pub fn new(paths: Vec<PathBuf>, context: RunContext) -> Self {
        Self { paths, context }
    }
}

fn is_reserved(file_name: &str) -> bool {
    RESERVED_FILES.contains(&file_name)
}

impl ConfigHandler for LocalConfigHandler {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HandlerError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(HandlerError::Config(format!("invalid config key: {:?}", key)));
        }
        let file_name = format!("{}.{}", key, CONFIG_EXTENSION);
        if is_reserved(&file_name) {
            log::debug!("Config key {} names a reserved file", key);
            return Ok(None);
        }
        for dir in self.paths.iter().rev() {
            self.context.check()?;
            let path = dir.join(&file_name);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    log::debug!("Config {} read from {}", key, path.display());
                    return Ok(Some(bytes));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    log::warn!("Skipping unreadable config {}: {}", path.display(), e);
                }
            }
        }
        Ok(None)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        for dir in &self.paths {
            if self.context.is_cancelled() {
                log::debug!("Config listing cancelled");
                break;
            }
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::debug!("Cannot list {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let reserved = path
                    .file_name()
                    .map_or(false, |name| is_reserved(&name.to_string_lossy()));
                if !reserved && path.extension().map_or(false, |ext| ext == CONFIG_EXTENSION) {
                    if let Some(stem) = path.file_stem() {
                        keys.insert(stem.to_string_lossy().to_string());
                    }
                }
            }
        }
        keys.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Flat settings merged from every `settings.yml`; later paths override.
///
/// Loading stops at the first path reached after `context` is cancelled,
/// keeping whatever was merged so far.
#[derive(Debug, Clone, Default)]
pub struct LocalSettingHandler {
    values: BTreeMap<String, String>,
}

impl LocalSettingHandler {
    pub fn load(paths: &[PathBuf], context: &RunContext) -> Self {
        let mut values = BTreeMap::new();
        for dir in paths {
            if context.is_cancelled() {
                log::debug!("Settings load cancelled before {}", dir.display());
                break;
            }
            let path = dir.join(SETTINGS_FILE);
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    log::warn!("Skipping unreadable settings {}: {}", path.display(), e);
                    continue;
                }
            };
            let map: BTreeMap<String, serde_yaml::Value> = match serde_yaml::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("Skipping malformed settings {}: {}", path.display(), e);
                    continue;
                }
            };
            for (key, value) in map {
                match scalar_to_string(&value) {
                    Some(s) => {
                        values.insert(key, s);
                    }
                    None => {
                        log::debug!("Ignoring non-scalar setting {} in {}", key, path.display())
                    }
                }
            }
        }
        Self { values }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl SettingHandler for LocalSettingHandler {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LocalProjectHandler {
    root: Option<PathBuf>,
    exists: bool,
    context: RunContext,
}

impl ProjectHandler for LocalProjectHandler {
    fn exists(&self) -> bool {
        self.exists
    }

    fn root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn init(&self, path: &Path) -> Result<PathBuf, HandlerError> {
        self.context.check()?;
        let folder = path.join(PROJECT_CONF_FOLDER);
        std::fs::create_dir_all(&folder).map_err(|source| HandlerError::Io {
            path: folder.clone(),
            source,
        })?;
        log::info!("Initialised project configuration at {}", folder.display());
        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings_with(paths: Vec<PathBuf>) -> LocalSettings {
        LocalSettings {
            exec_path: PathBuf::from("/work"),
            config_paths: paths,
            ..LocalSettings::default()
        }
    }

    #[test]
    fn test_builder_properties_reflect_settings() {
        let builder =
            LocalBuilder::new(settings_with(vec![PathBuf::from("/u"), PathBuf::from("/p")]));
        assert_eq!(builder.name(), "local");
        let props = builder.properties();
        assert_eq!(props.get(LOCAL_EXECPATH).unwrap().as_str(), Some("/work"));
        assert_eq!(
            props.get(LOCAL_CONFIGPATHS).unwrap().as_list(),
            Some(&["/u".to_string(), "/p".to_string()][..])
        );
    }

    #[test]
    fn test_command_is_not_supported() {
        let builder = LocalBuilder::new(LocalSettings::default());
        assert!(!builder.implementations().contains(&Capability::Command));
        assert!(matches!(
            builder.build(&Capability::Command, &Properties::new()),
            Err(BuilderError::CapabilityNotSupported { .. })
        ));
    }

    #[test]
    fn test_config_prefers_last_path() {
        let user = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(user.path().join("compose.yml"), "user").unwrap();
        fs::write(project.path().join("compose.yml"), "project").unwrap();
        fs::write(user.path().join("only-user.yml"), "u").unwrap();

        fs::write(project.path().join(SETTINGS_FILE), "name: shop\n").unwrap();
        fs::write(project.path().join(ACTIVATION_FILE), "activations: []\n").unwrap();

        let handler = LocalConfigHandler::new(
            vec![user.path().to_path_buf(), project.path().to_path_buf()],
            RunContext::new(),
        );
        assert_eq!(handler.get("compose").unwrap(), Some(b"project".to_vec()));
        assert_eq!(handler.get("only-user").unwrap(), Some(b"u".to_vec()));
        assert_eq!(handler.get("absent").unwrap(), None);
        assert_eq!(handler.keys(), vec!["compose".to_string(), "only-user".to_string()]);
        assert!(matches!(handler.get("../escape"), Err(HandlerError::Config(_))));
        assert_eq!(handler.get("settings").unwrap(), None);
        assert_eq!(handler.get("api").unwrap(), None);
    }

    #[test]
    fn test_cancelled_context_stops_filesystem_access() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("compose.yml"), "services: {}").unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "name: shop\n").unwrap();

        let context = RunContext::new();
        let builder = LocalBuilder::new(LocalSettings {
            context: context.clone(),
            ..settings_with(vec![dir.path().to_path_buf()])
        });
        let config = builder
            .build(&Capability::Config, &Properties::new())
            .unwrap()
            .into_config()
            .unwrap();
        let project = builder
            .build(&Capability::Project, &Properties::new())
            .unwrap()
            .into_project()
            .unwrap();
        assert!(config.get("compose").unwrap().is_some());

        context.cancel();
        assert!(matches!(config.get("compose"), Err(HandlerError::Cancelled)));
        assert!(config.keys().is_empty());
        assert!(matches!(project.init(dir.path()), Err(HandlerError::Cancelled)));
        assert!(!dir.path().join(PROJECT_CONF_FOLDER).exists());

        let settings = LocalSettingHandler::load(&[dir.path().to_path_buf()], &context);
        assert!(settings.get("name").is_none());
    }

    #[test]
    fn test_settings_merge_in_path_order() {
        let user = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(
            user.path().join(SETTINGS_FILE),
            "name: user\nport: 8080\nverbose: true\n",
        )
        .unwrap();
        fs::write(project.path().join(SETTINGS_FILE), "name: shop\nnested: {a: 1}\n").unwrap();

        let handler = LocalSettingHandler::load(
            &[user.path().to_path_buf(), project.path().to_path_buf()],
            &RunContext::new(),
        );
        assert_eq!(handler.get("name"), Some("shop".to_string()));
        assert_eq!(handler.get("port"), Some("8080".to_string()));
        assert_eq!(handler.get("verbose"), Some("true".to_string()));
        assert!(handler.get("nested").is_none());
        assert_eq!(handler.keys(), vec!["name", "port", "verbose"]);
    }

    #[test]
    fn test_malformed_settings_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "- just\n- a list\n").unwrap();
        let handler = LocalSettingHandler::load(&[dir.path().to_path_buf()], &RunContext::new());
        assert!(handler.keys().is_empty());
    }

    #[test]
    fn test_project_init_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let builder = LocalBuilder::new(settings_with(vec![]));
        let project = builder
            .build(&Capability::Project, &Properties::new())
            .unwrap()
            .into_project()
            .unwrap();
        assert!(!project.exists());
        assert!(project.root().is_none());

        let created = project.init(dir.path()).unwrap();
        assert_eq!(created, dir.path().join(PROJECT_CONF_FOLDER));
        assert!(created.is_dir());
    }
}
