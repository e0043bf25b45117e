use serde::Deserialize;
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use ustr::Ustr;

const CONFIG_FILE_NAME: &str = "mouse.toml";

/// Search for mouse.toml starting from the current directory and moving up the directory tree
pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    let current_dir = env::current_dir().map_err(|e| ConfigError::io(Path::new("."), e))?;

    let start_dir = current_dir
        .canonicalize()
        .map_err(|e| ConfigError::io(&current_dir, e))?;

    let mut current = start_dir.as_path();

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Ok(candidate);
        }

        current = match current.parent() {
            Some(parent) => parent,
            None => return Err(ConfigError::NotFound),
        };
    }
}

/// Which rules a proof may cite, and how assumptions are discharged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseConfig {
    disabled: Vec<String>,
    aliases: BTreeMap<String, String>,
    excluded_middle: bool,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            aliases: BTreeMap::new(),
            excluded_middle: true,
        }
    }
}

impl MouseConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let file: MouseConfigFile =
            toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
        Ok(file.into())
    }

    /// Parses config text that did not come from a file.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let file: MouseConfigFile =
            toml::from_str(contents).map_err(|e| ConfigError::parse(Path::new("<inline>"), e))?;
        Ok(file.into())
    }

    /// Citation names removed from both the rewrite catalog and the inference table.
    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.disabled.iter().map(String::as_str)
    }

    /// Extra citation names, each mapped to the existing name it stands for.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, target)| (alias.as_str(), target.as_str()))
    }

    pub fn excluded_middle(&self) -> bool {
        self.excluded_middle
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MouseConfigFile {
    #[serde(default)]
    rules: RulesConfig,
    #[serde(default)]
    axioms: AxiomsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesConfig {
    #[serde(default)]
    disabled: Vec<String>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AxiomsConfig {
    #[serde(default = "default_true")]
    excluded_middle: bool,
}

impl Default for AxiomsConfig {
    fn default() -> Self {
        Self {
            excluded_middle: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl From<MouseConfigFile> for MouseConfig {
    fn from(file: MouseConfigFile) -> Self {
        Self {
            disabled: file.rules.disabled,
            aliases: file.rules.aliases,
            excluded_middle: file.axioms.excluded_middle,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no mouse.toml found in this directory or any parent")]
    NotFound,
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("alias `{alias}` points at unknown rule `{target}`")]
    UnknownAlias { alias: Ustr, target: Ustr },
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, source: toml::de::Error) -> Self {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = MouseConfig::parse("").unwrap();
        assert_eq!(config, MouseConfig::default());
        assert!(config.excluded_middle());
    }

    #[test]
    fn parses_every_section() {
        let config = MouseConfig::parse(
            r#"
            [rules]
            disabled = ["dist", "efq"]

            [rules.aliases]
            commute = "comm"
            mp = "apply"

            [axioms]
            excluded_middle = false
            "#,
        )
        .unwrap();

        assert_eq!(config.disabled().collect::<Vec<_>>(), ["dist", "efq"]);
        assert_eq!(
            config.aliases().collect::<Vec<_>>(),
            [("commute", "comm"), ("mp", "apply")]
        );
        assert!(!config.excluded_middle());
    }

    #[test]
    fn loads_config_from_disk() {
        let dir = env::temp_dir().join(format!("mouse-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, "[rules]\ndisabled = [\"efq\"]\n").unwrap();

        let config = MouseConfig::from_file(&path).unwrap();
        assert_eq!(config.disabled().collect::<Vec<_>>(), ["efq"]);
        assert!(config.excluded_middle());

        fs::write(&path, "[axioms]\nexcluded_middle = \"no\"\n").unwrap();
        assert!(matches!(
            MouseConfig::from_file(&path),
            Err(ConfigError::Parse { path: p, .. }) if p == path
        ));

        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(
            MouseConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            MouseConfig::parse("[rules]\nenabled = []\n"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
