use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "habit-tracker";
pub const DB_FILE_NAME: &str = "habits.sqlite";
pub const LOG_FILE_NAME: &str = "habits.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join("logs"),
        }
    }

    /// Command-line overrides win; otherwise the platform data directory is used.
    pub fn resolve(data_dir: Option<PathBuf>, db_path: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let mut config = Self::for_data_dir(&data_dir);
        if let Some(db_path) = db_path {
            config.db_path = db_path;
        }
        config
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join(APP_DIR_NAME);
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(APP_DIR_NAME))
        .unwrap_or_else(|_| PathBuf::from(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_drives_every_path() {
        let config = AppConfig::resolve(Some(PathBuf::from("/tmp/habits-data")), None);
        assert_eq!(config.db_path, PathBuf::from("/tmp/habits-data/habits.sqlite"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/habits-data/logs"));
    }

    #[test]
    fn explicit_db_path_overrides_the_default() {
        let config = AppConfig::resolve(Some(PathBuf::from("/tmp/habits-data")), Some(PathBuf::from("/srv/other.db")));
        assert_eq!(config.db_path, PathBuf::from("/srv/other.db"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/habits-data"));
    }

    #[test]
    fn default_data_dir_is_named_after_the_app() {
        let config = AppConfig::resolve(None, None);
        assert!(config.data_dir.ends_with(APP_DIR_NAME));
    }
}
