use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::error::RosterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Mongodb,
    Memory,
}

impl DatabaseType {
    fn parse(value: &str) -> Result<Self, RosterError> {
        match value.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(DatabaseType::Mongodb),
            "memory" => Ok(DatabaseType::Memory),
            other => Err(RosterError::Config(format!("unsupported DATABASE_TYPE '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_type: DatabaseType,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub players_collection: String,
    pub bulk_upload_max_rows: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_type: DatabaseType::Mongodb,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "player_roster".to_string(),
            players_collection: "players".to_string(),
            bulk_upload_max_rows: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file named by `PLAYER_ROSTER_CONFIG`, then
    /// individual environment variables.
    pub fn load() -> Result<Self, RosterError> {
        let mut config = match env::var("PLAYER_ROSTER_CONFIG") {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        info!(
            "Configuration loaded - database: {:?}, collection: {}",
            config.database_type, config.players_collection
        );
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        debug!("Reading configuration file {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RosterError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, RosterError> {
        serde_yaml::from_str(raw).map_err(|e| RosterError::Config(e.to_string()))
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), RosterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("DATABASE_TYPE") {
            self.database_type = DatabaseType::parse(&value)?;
        }
        if let Some(value) = lookup("MONGODB_URI") {
            self.mongodb_uri = value;
        }
        if let Some(value) = lookup("MONGODB_DATABASE") {
            self.mongodb_database = value;
        }
        if let Some(value) = lookup("PLAYERS_COLLECTION") {
            self.players_collection = value;
        }
        if let Some(value) = lookup("BULK_UPLOAD_MAX_ROWS") {
            let max_rows = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|rows| *rows > 0)
                .ok_or_else(|| {
                    RosterError::Config(format!(
                        "BULK_UPLOAD_MAX_ROWS must be a positive integer, got '{}'",
                        value
                    ))
                })?;
            self.bulk_upload_max_rows = Some(max_rows);
        }
        Ok(())
    }
}
