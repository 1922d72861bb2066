//! Where the table finds its sources, and how long it waits for a burst of
//! directory events to settle.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DATABASE_ENV: &str = "CINNAMON_KEYBINDINGS_DB";
pub const SPICES_CONFIG_ENV: &str = "CINNAMON_SPICES_CONFIG_DIR";

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpicePaths {
    /// `~/.cinnamon/configs`
    pub legacy_config_root: PathBuf,
    /// `~/.config/cinnamon/spices`; wins over the legacy root.
    pub config_root: PathBuf,
    /// Searched in order for `<kind>s/<uuid>/metadata.json`.
    pub install_roots: Vec<PathBuf>,
}

impl SpicePaths {
    pub fn from_home(home: &Path, config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            legacy_config_root: home.join(".cinnamon").join("configs"),
            config_root: config_dir.join("cinnamon").join("spices"),
            install_roots: vec![
                data_dir.join("cinnamon"),
                PathBuf::from("/usr/share/cinnamon"),
            ],
        }
    }

    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            legacy_config_root: dir.join("legacy-configs"),
            config_root: dir.join("spices"),
            install_roots: vec![dir.join("installed")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub spice_paths: SpicePaths,
    pub debounce: Duration,
    pub database: PathBuf,
}

impl TableConfig {
    pub fn from_env() -> Self {
        let home = dirs_next::home_dir().unwrap_or_else(std::env::temp_dir);
        let config_dir = dirs_next::config_dir().unwrap_or_else(|| home.join(".config"));
        let data_dir = dirs_next::data_dir().unwrap_or_else(|| home.join(".local").join("share"));

        let mut spice_paths = SpicePaths::from_home(&home, &config_dir, &data_dir);
        if let Some(dir) = std::env::var_os(SPICES_CONFIG_ENV).filter(|v| !v.is_empty()) {
            spice_paths.config_root = PathBuf::from(dir);
        }
        let database = std::env::var_os(DATABASE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("cinnamon-keybindings").join("settings.db"));

        Self {
            spice_paths,
            debounce: DEFAULT_DEBOUNCE,
            database,
        }
    }

    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            spice_paths: SpicePaths::rooted_at(dir),
            debounce: DEFAULT_DEBOUNCE,
            database: dir.join("settings.db"),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_layout_matches_cinnamon() {
        let paths = SpicePaths::from_home(
            Path::new("/home/u"),
            Path::new("/home/u/.config"),
            Path::new("/home/u/.local/share"),
        );
        assert_eq!(paths.legacy_config_root, PathBuf::from("/home/u/.cinnamon/configs"));
        assert_eq!(paths.config_root, PathBuf::from("/home/u/.config/cinnamon/spices"));
        assert_eq!(paths.install_roots[0], PathBuf::from("/home/u/.local/share/cinnamon"));
    }

    #[test]
    fn rooted_config_stays_under_its_dir() {
        let dir = Path::new("/tmp/keybindings-test");
        let config = TableConfig::rooted_at(dir).with_debounce(Duration::ZERO);
        assert!(config.database.starts_with(dir));
        assert!(config.spice_paths.config_root.starts_with(dir));
        assert!(config.spice_paths.legacy_config_root.starts_with(dir));
        assert_eq!(config.debounce, Duration::ZERO);
    }
}
