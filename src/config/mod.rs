use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    /// Defaults, then `loader.rc`, then `WINSYNC_*` environment variables.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path();
        let mut cfg = Self {
            inner: default_map(),
            config_path,
        };

        if cfg.config_path.exists() {
            let path = cfg.config_path.clone();
            cfg.overlay_file(&path)?;
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                cfg.inner.insert(k, v);
            }
        }

        Ok(cfg)
    }

    /// Builds a config from the defaults plus `pairs`, without touching the
    /// filesystem or the environment.
    #[cfg(test)]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut inner = default_map();
        for (k, v) in pairs {
            inner.insert(k.to_string(), v.to_string());
        }
        Self {
            inner,
            config_path: PathBuf::new(),
        }
    }

    fn overlay_file(&mut self, path: &Path) -> Result<()> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
            if let Some((k, v)) = parse_line(&line) {
                self.inner.insert(k.to_string(), v.to_string());
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Directory name looked up under each `site-packages`.
    pub fn package(&self) -> String {
        self.get("WINSYNC_PACKAGE").unwrap_or_else(|| "winsync".into())
    }

    pub fn module(&self) -> String {
        self.get("WINSYNC_MODULE").unwrap_or_else(|| "winsync.run".into())
    }

    pub fn python_exe(&self) -> String {
        self.get("WINSYNC_PYTHON_EXE").unwrap_or_else(|| "python.exe".into())
    }

    pub fn python_home(&self) -> Option<PathBuf> {
        self.get_path("WINSYNC_PYTHON_HOME")
    }

    pub fn new_console(&self) -> bool {
        self.get_bool("WINSYNC_NEW_CONSOLE")
    }

    pub fn log_level(&self) -> String {
        self.get("WINSYNC_LOG_LEVEL").unwrap_or_else(|| "warn".into())
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.get_path("WINSYNC_LOG_FILE")
    }
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    Some((k.trim(), v.trim()))
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "WINSYNC_PACKAGE",
        "WINSYNC_MODULE",
        "WINSYNC_PYTHON_EXE",
        "WINSYNC_PYTHON_HOME",
        "WINSYNC_NEW_CONSOLE",
        "WINSYNC_LOG_LEVEL",
        "WINSYNC_LOG_FILE",
    ];

    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(env::temp_dir);
    base.join("winsync").join("loader.rc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("WINSYNC_PACKAGE".into(), "winsync".into());
    m.insert("WINSYNC_MODULE".into(), "winsync.run".into());
    m.insert("WINSYNC_PYTHON_EXE".into(), "python.exe".into());
    m.insert("WINSYNC_NEW_CONSOLE".into(), "true".into());
    m.insert("WINSYNC_LOG_LEVEL".into(), "warn".into());
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_winsync_layout() {
        let cfg = Config::from_pairs([]);
        assert_eq!(cfg.package(), "winsync");
        assert_eq!(cfg.module(), "winsync.run");
        assert_eq!(cfg.python_exe(), "python.exe");
        assert!(cfg.new_console());
        assert!(cfg.python_home().is_none());
        assert!(cfg.log_file().is_none());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = Config::from_pairs([("WINSYNC_MODULE", ""), ("WINSYNC_PYTHON_HOME", "")]);
        assert_eq!(cfg.module(), "winsync.run");
        assert!(cfg.python_home().is_none());
    }

    #[test]
    fn rc_file_overrides_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "# loader settings")?;
        writeln!(file)?;
        writeln!(file, "WINSYNC_MODULE = winsync.gui")?;
        writeln!(file, "WINSYNC_NEW_CONSOLE=false")?;
        writeln!(file, "not a pair")?;

        let mut cfg = Config::from_pairs([]);
        cfg.overlay_file(file.path())?;
        assert_eq!(cfg.module(), "winsync.gui");
        assert!(!cfg.new_console());
        Ok(())
    }

    #[test]
    fn only_known_keys_come_from_the_environment() {
        assert!(is_config_key("WINSYNC_PYTHON_HOME"));
        assert!(!is_config_key("WINSYNC_SOMETHING_ELSE"));
        assert!(!is_config_key("PATH"));
    }
}
