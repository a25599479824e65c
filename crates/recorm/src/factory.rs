//! Profile-driven database construction.
//!
//! A [`DatabaseFactory`] maps profile names to [`Database`] handles. Each
//! handle is opened on first request through the driver registered for the
//! profile's driver kind, then cached for later lookups.

use crate::config::{DatabaseConfig, DatabaseProfiles};
use crate::connection::Connection;
use crate::database::Database;
use crate::error::{OrmError, OrmResult};
use crate::monitor::QueryHook;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Opens a connection for a profile.
pub type DriverFn = fn(&DatabaseConfig) -> OrmResult<Box<dyn Connection>>;

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &DatabaseConfig) -> OrmResult<Box<dyn Connection>> {
    Ok(Box::new(crate::sqlite::SqliteConnection::from_config(config)?))
}

/// Lazily opened, cached databases keyed by profile name.
pub struct DatabaseFactory {
    profiles: DatabaseProfiles,
    drivers: HashMap<String, DriverFn>,
    hooks: Vec<Rc<dyn QueryHook>>,
    instances: HashMap<String, Database>,
}

impl DatabaseFactory {
    /// Create a factory with the built-in drivers registered.
    pub fn new(profiles: DatabaseProfiles) -> Self {
        let mut factory = Self {
            profiles,
            drivers: HashMap::new(),
            hooks: Vec::new(),
            instances: HashMap::new(),
        };
        #[cfg(feature = "sqlite")]
        factory.register_driver("sqlite", open_sqlite);
        factory
    }

    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        Ok(Self::new(DatabaseProfiles::from_toml_str(raw)?))
    }

    pub fn load(path: impl AsRef<Path>) -> OrmResult<Self> {
        Ok(Self::new(DatabaseProfiles::load(path)?))
    }

    /// Register (or replace) the driver for a driver kind.
    pub fn register_driver(&mut self, kind: &str, driver: DriverFn) -> &mut Self {
        self.drivers.insert(kind.to_ascii_lowercase(), driver);
        self
    }

    /// Attach a hook to every database opened from now on.
    pub fn with_hook(mut self, hook: Rc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn profiles(&self) -> &DatabaseProfiles {
        &self.profiles
    }

    /// The database for a profile, opening it on first use.
    ///
    /// `"default"` resolves to the designated default profile. An undeclared
    /// profile yields `Ok(None)`; a profile whose driver kind is not
    /// registered fails with [`OrmError::DriverNotFound`].
    pub fn get(&mut self, name: &str) -> OrmResult<Option<&mut Database>> {
        let Some((resolved, config)) = self.profiles.resolve(name) else {
            return Ok(None);
        };
        let resolved = resolved.to_string();
        if !self.instances.contains_key(&resolved) {
            let db = open(&self.drivers, &self.hooks, config)?;
            tracing::debug!(
                target: "recorm.db",
                profile = %resolved,
                driver = %config.driver,
                "opened database"
            );
            self.instances.insert(resolved.clone(), db);
        }
        Ok(self.instances.get_mut(&resolved))
    }

    /// The database for the default profile.
    pub fn default_database(&mut self) -> OrmResult<Option<&mut Database>> {
        self.get("default")
    }

    /// Open a fresh, uncached database for a profile.
    pub fn connect(&self, name: &str) -> OrmResult<Option<Database>> {
        match self.profiles.resolve(name) {
            Some((_, config)) => open(&self.drivers, &self.hooks, config).map(Some),
            None => Ok(None),
        }
    }

    /// Drop a cached database so the next `get` reopens it.
    pub fn close(&mut self, name: &str) -> bool {
        let resolved = match self.profiles.resolve(name) {
            Some((resolved, _)) => resolved.to_string(),
            None => return false,
        };
        self.instances.remove(&resolved).is_some()
    }
}

fn open(
    drivers: &HashMap<String, DriverFn>,
    hooks: &[Rc<dyn QueryHook>],
    config: &DatabaseConfig,
) -> OrmResult<Database> {
    let kind = config.driver_kind();
    let driver = drivers
        .get(&kind)
        .ok_or_else(|| OrmError::DriverNotFound(config.driver.clone()))?;
    let mut db = Database::from_boxed(driver(config)?);
    for hook in hooks {
        db.add_hook(hook.clone());
    }
    Ok(db)
}
