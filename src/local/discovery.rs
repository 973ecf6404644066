//! User and project path discovery.

use std::env;
use std::path::{Path, PathBuf};

use super::{LocalSettings, PROJECT_CONF_FOLDER, PROJECT_DIR_ENV, USER_CONF_SUBPATH, USER_DIR_ENV};

/// Append the user configuration directory, if it exists.
///
/// `KRAUT_USER_DIR` replaces the platform default
/// (`<config dir>/kraut`, e.g. `~/.config/kraut`).
pub fn discover_user_paths(settings: &mut LocalSettings) {
    let user_dir = match env::var_os(USER_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => dirs::config_dir().map(|dir| dir.join(USER_CONF_SUBPATH)),
    };
    match user_dir {
        Some(dir) if dir.is_dir() => {
            log::debug!("User configuration at {}", dir.display());
            settings.config_paths.push(dir);
        }
        Some(dir) => log::debug!("No user configuration at {}", dir.display()),
        None => log::debug!("No user configuration directory on this platform"),
    }
}

/// Locate the project root and register its configuration folder.
///
/// `KRAUT_PROJECT_DIR` names the root directly; otherwise the tree is
/// searched upward from `exec_path`.
pub fn discover_project_paths(settings: &mut LocalSettings) {
    let root = match env::var_os(PROJECT_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => find_project_root(&settings.exec_path),
    };
    match root {
        Some(root) => set_project_root(settings, root),
        None => {
            log::debug!(
                "No {} folder above {}",
                PROJECT_CONF_FOLDER,
                settings.exec_path.display()
            );
            settings.project_exists = false;
        }
    }
}

/// The nearest ancestor of `start` (itself included) holding a `.kraut` folder.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONF_FOLDER).is_dir())
        .map(Path::to_path_buf)
}

/// Record `root` as the project root.
///
/// The project only counts as existing when its `.kraut` folder does; that
/// folder becomes the highest-priority configuration path.
pub fn set_project_root(settings: &mut LocalSettings, root: PathBuf) {
    let conf = root.join(PROJECT_CONF_FOLDER);
    settings.project_exists = conf.is_dir();
    if settings.project_exists {
        log::debug!("Project configuration at {}", conf.display());
        settings.config_paths.push(conf);
    } else {
        log::debug!("Project root {} has no {} folder", root.display(), PROJECT_CONF_FOLDER);
    }
    settings.project_root = Some(root);
}
