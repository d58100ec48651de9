use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::storage::{DEFAULT_KEY, FileSlot};

/// Where the todo slot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub dir: PathBuf,
    pub key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            key: DEFAULT_KEY.to_owned(),
        }
    }
}

impl Config {
    /// Falls back to the current directory and the `todos` key.
    pub fn new(dir: Option<PathBuf>, key: Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(dir) = dir {
            cfg.dir = dir;
        }
        if let Some(key) = key {
            let key = key.trim();
            if key.is_empty() || key.contains(['/', '\\']) {
                bail!("invalid slot key `{key}`");
            }
            cfg.key = key.to_owned();
        }
        Ok(cfg)
    }

    pub fn slot(&self) -> FileSlot {
        FileSlot::new(&self.dir, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_todos_in_cwd() {
        let cfg = Config::new(None, None).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.slot().path(), PathBuf::from("./todos.json"));
    }

    #[test]
    fn rejects_path_like_keys() {
        assert!(Config::new(None, Some("../x".into())).is_err());
        assert!(Config::new(None, Some("  ".into())).is_err());
        let cfg = Config::new(Some("/tmp/t".into()), Some("work".into())).unwrap();
        assert_eq!(cfg.slot().path(), PathBuf::from("/tmp/t/work.json"));
    }
}
