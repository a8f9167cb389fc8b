#![forbid(unsafe_code)]

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::TodosError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "tasks.json".to_owned(),
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub prompt: String,
    pub show_after_command: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_owned(),
            show_after_command: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), TodosError> {
        if self.store.path.trim().is_empty() {
            return Err(TodosError::Config(
                "store.path must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/todos/config.toml`, or the platform config dir on Windows
/// when that file does not exist.
pub fn config_file() -> anyhow::Result<PathBuf> {
    let base = BaseDirs::new().context("failed to determine home directory")?;
    let unix = base
        .home_dir()
        .join(".config")
        .join("todos")
        .join("config.toml");
    if cfg!(windows) && !unix.exists() {
        let proj = ProjectDirs::from("com", "todos", "todos")
            .context("failed to determine platform config directory")?;
        return Ok(proj.config_dir().join("config.toml"));
    }
    Ok(unix)
}

/// Expands `$VAR`/`${VAR}` and a leading `~/`, then resolves relative
/// paths against the cwd.
pub fn expand_path(input: &str) -> anyhow::Result<PathBuf> {
    let expanded = expand_env_vars(input);
    let p = match expanded.strip_prefix("~/") {
        Some(rest) => BaseDirs::new()
            .context("failed to determine home directory")?
            .home_dir()
            .join(rest),
        None => PathBuf::from(&expanded),
    };
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join(p))
}

fn expand_env_vars(input: &str) -> String {
    // Unknown vars are left untouched.
    let Ok(re) = regex::Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?") else {
        return input.to_owned();
    };
    re.replace_all(input, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_owned())
    })
    .into_owned()
}

pub fn load() -> anyhow::Result<Config> {
    load_at_path(&config_file()?)
}

pub fn load_at_path(path: &Path) -> anyhow::Result<Config> {
    let doc = read_document(path)?;
    let cfg: Config = toml::from_str(&doc.to_string())
        .with_context(|| format!("failed to deserialize TOML in {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn list_resolved_toml() -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(&load()?)?)
}

pub fn get_value_string(key: &str) -> anyhow::Result<String> {
    get_value_string_at_path(&config_file()?, key)
}

pub fn set_value_string(key: &str, value: &str) -> anyhow::Result<()> {
    set_value_string_at_path(&config_file()?, key, value)
}

pub fn get_value_string_at_path(path: &Path, key: &str) -> anyhow::Result<String> {
    let key: ConfigKey = key.parse()?;
    Ok(key.value_in(&load_at_path(path)?))
}

/// Sets one key, keeping the rest of the file's formatting. The edited
/// document must still validate before it is written.
pub fn set_value_string_at_path(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let key: ConfigKey = key.parse()?;
    let item = key.parse_value(value)?;

    let mut doc = read_document(path)?;
    let (table, field) = key.table_and_field();
    let section = doc
        .entry(table)
        .or_insert(toml_edit::table())
        .as_table_mut()
        .ok_or_else(|| TodosError::Config(format!("cannot set {key}: '{table}' is not a table")))?;
    section.insert(field, item);

    let raw = doc.to_string();
    let cfg: Config = toml::from_str(&raw)
        .with_context(|| format!("config update produced invalid TOML for {}", path.display()))?;
    cfg.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, raw.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<toml_edit::DocumentMut> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(toml_edit::DocumentMut::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    raw.parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse TOML in {}", path.display()))
}

/// A settable config key, named `<table>.<field>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    StorePath,
    StorePretty,
    UiPrompt,
    UiShowAfterCommand,
}

impl ConfigKey {
    pub const ALL: [Self; 4] = [
        Self::StorePath,
        Self::StorePretty,
        Self::UiPrompt,
        Self::UiShowAfterCommand,
    ];

    #[must_use]
    pub fn table_and_field(self) -> (&'static str, &'static str) {
        match self {
            Self::StorePath => ("store", "path"),
            Self::StorePretty => ("store", "pretty"),
            Self::UiPrompt => ("ui", "prompt"),
            Self::UiShowAfterCommand => ("ui", "show_after_command"),
        }
    }

    #[must_use]
    pub fn value_in(self, cfg: &Config) -> String {
        match self {
            Self::StorePath => cfg.store.path.clone(),
            Self::StorePretty => cfg.store.pretty.to_string(),
            Self::UiPrompt => cfg.ui.prompt.clone(),
            Self::UiShowAfterCommand => cfg.ui.show_after_command.to_string(),
        }
    }

    fn parse_value(self, raw: &str) -> Result<toml_edit::Item, TodosError> {
        match self {
            Self::StorePath | Self::UiPrompt => Ok(toml_edit::value(raw)),
            Self::StorePretty | Self::UiShowAfterCommand => match raw.trim() {
                "true" => Ok(toml_edit::value(true)),
                "false" => Ok(toml_edit::value(false)),
                other => Err(TodosError::InvalidConfigValue {
                    key: self.to_string(),
                    msg: format!("expected true|false, got '{other}'"),
                }),
            },
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (table, field) = self.table_and_field();
        write!(f, "{table}.{field}")
    }
}

impl FromStr for ConfigKey {
    type Err = TodosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.to_string() == s)
            .ok_or_else(|| TodosError::InvalidConfigKey(s.to_owned()))
    }
}
