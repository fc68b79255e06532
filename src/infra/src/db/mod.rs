// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection};
use tokio::sync::OnceCell;

use crate::errors::{DbError, Error, Result};

pub static ORM_CLIENT: OnceCell<DatabaseConnection> = OnceCell::const_new();

/// Connect per DATABASE_URL; an empty URL selects an SQLite file under
/// the data dir.
pub async fn connect_to_orm() -> DatabaseConnection {
    let cfg = config::get_config();
    let url = if cfg.database.url.is_empty() {
        std::fs::create_dir_all(&cfg.common.data_dir)
            .unwrap_or_else(|e| panic!("create data dir {} error: {e}", cfg.common.data_dir));
        format!("sqlite://{}pagewatch.db?mode=rwc", cfg.common.data_dir)
    } else {
        cfg.database.url.clone()
    };
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(cfg.database.max_connections)
        .sqlx_logging(false);
    Database::connect(opts)
        .await
        .expect("database connection failed")
}

pub async fn init() -> Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    log::info!(
        "[DB] connected, backend: {:?}",
        client.get_database_backend()
    );
    Ok(())
}

/// Index definition applied after table creation
pub struct IndexStatement<'a> {
    pub idx_name: &'a str,
    pub table: &'a str,
    pub unique: bool,
    pub fields: &'a [&'a str],
    /// Optional partial-index predicate; skipped on backends without
    /// partial index support (MySQL)
    pub predicate: Option<&'a str>,
}

impl<'a> IndexStatement<'a> {
    pub fn new(idx_name: &'a str, table: &'a str, unique: bool, fields: &'a [&'a str]) -> Self {
        Self {
            idx_name,
            table,
            unique,
            fields,
            predicate: None,
        }
    }

    pub fn partial(
        idx_name: &'a str,
        table: &'a str,
        unique: bool,
        fields: &'a [&'a str],
        predicate: &'a str,
    ) -> Self {
        Self {
            idx_name,
            table,
            unique,
            fields,
            predicate: Some(predicate),
        }
    }
}

pub async fn create_index(index: IndexStatement<'_>) -> Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let backend = client.get_database_backend();
    if index.predicate.is_some() && backend == DatabaseBackend::MySql {
        log::warn!(
            "[DB] backend does not support partial indexes, skipping {}",
            index.idx_name
        );
        return Ok(());
    }
    let unique = if index.unique { "UNIQUE " } else { "" };
    let mut sql = format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
        unique,
        index.idx_name,
        index.table,
        index.fields.join(", ")
    );
    if let Some(predicate) = index.predicate {
        sql = format!("{sql} WHERE {predicate}");
    }
    client
        .execute_unprepared(&sql)
        .await
        .map_err(|e| Error::DbError(DbError::SeaORMError(e.to_string())))?;
    Ok(())
}

/// True when the database rejected a write for violating a unique
/// constraint. Used by the incident dedup path to fold concurrent
/// inserts of one fingerprint into a single row.
pub fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string().to_lowercase();
    msg.contains("unique constraint") || msg.contains("duplicate key") || msg.contains("1062")
}
