//! Named database profiles.
//!
//! Profiles are loaded from TOML, one table per profile, in document order:
//!
//! ```toml
//! default = "main"        # optional
//!
//! [main]
//! driver = "sqlite"
//! database = "app.db"
//!
//! [reports]
//! driver = "sqlite"
//! database = ":memory:"
//! ```
//!
//! The default profile is the one named by a top-level `default = "name"`
//! key, else a profile literally named `default`, else the first declared.
//! `${VAR}` references in string fields are expanded from the environment.

use crate::error::{OrmError, OrmResult};
use serde::Deserialize;
use std::path::Path;

/// Connection settings for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Driver kind; the first `/`-separated segment selects the registered
    /// driver (`"sqlite"`, `"pdo/mysql"` → `pdo`).
    pub driver: String,
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            host: String::new(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
        }
    }
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Lowercased first segment of `driver`, used for registry lookup.
    pub fn driver_kind(&self) -> String {
        self.driver
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    fn expand_env(&mut self) -> OrmResult<()> {
        for field in [
            &mut self.driver,
            &mut self.host,
            &mut self.user,
            &mut self.password,
            &mut self.database,
        ] {
            *field = expand_env_vars(field)?;
        }
        Ok(())
    }
}

/// An ordered set of named profiles with a designated default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseProfiles {
    profiles: Vec<(String, DatabaseConfig)>,
    default: Option<String>,
}

impl DatabaseProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a profile.
    pub fn with_profile(mut self, name: impl Into<String>, config: DatabaseConfig) -> Self {
        self.insert(name, config);
        self
    }

    /// Name the default profile explicitly.
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, config: DatabaseConfig) {
        let name = name.into();
        match self.profiles.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = config,
            None => self.profiles.push((name, config)),
        }
    }

    /// Parse profiles from TOML text.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let table: toml::Table = toml::from_str(raw)?;
        let mut profiles = Self::new();
        for (name, value) in table {
            match value {
                toml::Value::String(target) if name == "default" => {
                    profiles.default = Some(target);
                }
                toml::Value::Table(_) => {
                    let mut config: DatabaseConfig = value.try_into()?;
                    config.expand_env()?;
                    profiles.insert(name, config);
                }
                other => {
                    return Err(OrmError::Config(format!(
                        "profile `{name}` must be a table, got {}",
                        other.type_str()
                    )));
                }
            }
        }
        profiles.validate()?;
        Ok(profiles)
    }

    /// Read and parse a TOML profile file.
    pub fn load(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> OrmResult<()> {
        if let Some(name) = &self.default {
            if self.get(name).is_none() {
                return Err(OrmError::Config(format!(
                    "default profile `{name}` is not declared"
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DatabaseConfig> {
        self.profiles
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Name of the default profile.
    pub fn default_name(&self) -> Option<&str> {
        if let Some(name) = &self.default {
            return Some(name);
        }
        if self.get("default").is_some() {
            return Some("default");
        }
        self.profiles.first().map(|(n, _)| n.as_str())
    }

    /// Resolve a profile name, mapping `"default"` to the designated default.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<(&'a str, &'a DatabaseConfig)> {
        if let Some(config) = self.get(name) {
            return Some((name, config));
        }
        if name == "default" {
            let target = self.default_name()?;
            return self.get(target).map(|c| (target, c));
        }
        None
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn expand_env_vars(input: &str) -> OrmResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(OrmError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(OrmError::Config("invalid env var reference: ${}".into()));
            }

            let v = std::env::var(&key).map_err(|_| {
                OrmError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
