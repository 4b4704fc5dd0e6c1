//! # Connection Profile Storage
//!
//! Named Cosmos DB connection profiles, persisted in a local SQLite database.
//!
//! A profile bundles everything needed to reach one Cosmos DB account:
//! the account endpoint, the OAuth2 token service URL, and the
//! client-credentials grant parameters. Profiles are keyed by name; the name
//! is the primary key of the `connections` table.
//!
//! [`ProfileStore`] wraps the async `sqlx` pool behind synchronous methods
//! using its own single-threaded Tokio runtime, so UI code can call it
//! directly: every operation is durable by the time it returns.
//!
//! Client secrets are stored in plaintext in the local database file; the
//! file lives under the per-user data directory. See DESIGN.md for the
//! trade-off discussion.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use url::Url;

/// Default OAuth2 resource URI for Cosmos DB
pub const DEFAULT_RESOURCE: &str = "https://cosmos.azure.com";

/// Default OAuth2 grant type
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";

/// Errors from the profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed profile fields (empty name, unparseable endpoint, ...)
    #[error("{0}")]
    Validation(String),

    /// Insert-only save collided with an existing profile name
    #[error("a connection named '{0}' already exists")]
    DuplicateName(String),

    /// SQLite failure
    #[error("profile storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("profile storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Save semantics for [`ProfileStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Fail with [`StoreError::DuplicateName`] if the name already exists
    Insert,
    /// Insert or replace the profile with the same name
    Upsert,
}

/// Connection settings for one Cosmos DB account.
///
/// `client_secret` is sensitive: never log it and never include it in
/// notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Unique profile name, chosen by the user
    pub name: String,
    /// Cosmos DB account endpoint, e.g. `https://my-account.documents.azure.com:443/`
    pub cosmos_endpoint: String,
    /// OAuth2 token service URL, e.g. `https://login.microsoftonline.com/<tenant-id>`
    pub service_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// OAuth2 resource URI the token is requested for
    pub resource: String,
    pub grant_type: String,
}

impl ConnectionProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cosmos_endpoint: String::new(),
            service_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            resource: DEFAULT_RESOURCE.to_string(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
        }
    }

    /// Check that all required fields are present and URLs parse.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation(
                "connection name must not be empty".to_string(),
            ));
        }
        for (field, value) in [
            ("Cosmos endpoint", &self.cosmos_endpoint),
            ("service URL", &self.service_url),
            ("client ID", &self.client_id),
            ("client secret", &self.client_secret),
            ("resource", &self.resource),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        for (field, value) in [
            ("Cosmos endpoint", &self.cosmos_endpoint),
            ("service URL", &self.service_url),
        ] {
            Url::parse(value).map_err(|e| {
                StoreError::Validation(format!("{} is not a valid URL: {}", field, e))
            })?;
        }
        Ok(())
    }
}

/// Local store of connection profiles, keyed by unique name.
pub struct ProfileStore {
    runtime: tokio::runtime::Runtime,
    pool: SqlitePool,
}

impl ProfileStore {
    /// Location of the profile database under the per-user data directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "", "canopus")
            .map(|dirs| dirs.data_dir().join("connections.db"))
    }

    /// Open (creating if missing) the profile database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(StoreError::Storage)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = runtime.block_on(async {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
        })?;

        runtime.block_on(migrate(&pool))?;
        info!("Profile store opened at {:?}", path);

        Ok(Self { runtime, pool })
    }

    /// Persist a profile. Durable by the time this returns.
    pub fn save(&self, profile: &ConnectionProfile, mode: SaveMode) -> Result<(), StoreError> {
        profile.validate()?;

        let sql = match mode {
            SaveMode::Insert => {
                r#"
                INSERT INTO connections
                    (name, cosmos_endpoint, service_url, client_id, client_secret,
                     resource, grant_type, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#
            }
            SaveMode::Upsert => {
                r#"
                INSERT INTO connections
                    (name, cosmos_endpoint, service_url, client_id, client_secret,
                     resource, grant_type, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(name) DO UPDATE SET
                    cosmos_endpoint = excluded.cosmos_endpoint,
                    service_url = excluded.service_url,
                    client_id = excluded.client_id,
                    client_secret = excluded.client_secret,
                    resource = excluded.resource,
                    grant_type = excluded.grant_type
                "#
            }
        };

        let result = self.runtime.block_on(
            sqlx::query(sql)
                .bind(&profile.name)
                .bind(&profile.cosmos_endpoint)
                .bind(&profile.service_url)
                .bind(&profile.client_id)
                .bind(&profile.client_secret)
                .bind(&profile.resource)
                .bind(&profile.grant_type)
                .bind(chrono::Utc::now().timestamp())
                .execute(&self.pool),
        );

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateName(profile.name.clone()))
            }
            Err(e) => Err(StoreError::Storage(e)),
        }
    }

    /// Fetch one profile by name.
    pub fn get(&self, name: &str) -> Result<Option<ConnectionProfile>, StoreError> {
        let row = self.runtime.block_on(
            sqlx::query(
                r#"
                SELECT name, cosmos_endpoint, service_url, client_id, client_secret,
                       resource, grant_type
                FROM connections
                WHERE name = ?
                "#,
            )
            .bind(name)
            .fetch_optional(&self.pool),
        )?;

        Ok(row.map(|row| profile_from_row(&row)))
    }

    /// All profiles, ordered by name.
    pub fn list(&self) -> Result<Vec<ConnectionProfile>, StoreError> {
        let rows = self.runtime.block_on(
            sqlx::query(
                r#"
                SELECT name, cosmos_endpoint, service_url, client_id, client_secret,
                       resource, grant_type
                FROM connections
                ORDER BY name
                "#,
            )
            .fetch_all(&self.pool),
        )?;

        Ok(rows.iter().map(profile_from_row).collect())
    }

    /// Remove a profile. Removing an absent name is a no-op.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.runtime.block_on(
            sqlx::query("DELETE FROM connections WHERE name = ?")
                .bind(name)
                .execute(&self.pool),
        )?;
        Ok(())
    }
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> ConnectionProfile {
    ConnectionProfile {
        name: row.get("name"),
        cosmos_endpoint: row.get("cosmos_endpoint"),
        service_url: row.get("service_url"),
        client_id: row.get("client_id"),
        client_secret: row.get("client_secret"),
        resource: row.get("resource"),
        grant_type: row.get("grant_type"),
    }
}

async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS connections (
            name            TEXT PRIMARY KEY,
            cosmos_endpoint TEXT NOT NULL,
            service_url     TEXT NOT NULL,
            client_id       TEXT NOT NULL,
            client_secret   TEXT NOT NULL,
            resource        TEXT NOT NULL,
            grant_type      TEXT NOT NULL DEFAULT 'client_credentials',
            created_at      INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile(name: &str) -> ConnectionProfile {
        ConnectionProfile {
            name: name.to_string(),
            cosmos_endpoint: "https://dev.documents.azure.com:443/".to_string(),
            service_url: "https://login.microsoftonline.com/tenant".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
        }
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = ConnectionProfile::new("Dev");
        assert_eq!(profile.name, "Dev");
        assert_eq!(profile.resource, DEFAULT_RESOURCE);
        assert_eq!(profile.grant_type, DEFAULT_GRANT_TYPE);
    }

    #[test]
    fn test_validate_accepts_complete_profile() {
        assert!(valid_profile("Dev").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut profile = valid_profile("Dev");
        profile.client_secret = "  ".to_string();
        assert!(matches!(
            profile.validate(),
            Err(StoreError::Validation(_))
        ));

        let mut profile = valid_profile("Dev");
        profile.name = String::new();
        assert!(matches!(
            profile.validate(),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut profile = valid_profile("Dev");
        profile.cosmos_endpoint = "not a url".to_string();
        match profile.validate() {
            Err(StoreError::Validation(msg)) => assert!(msg.contains("Cosmos endpoint")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
