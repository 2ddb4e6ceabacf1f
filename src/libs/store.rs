use std::time::Duration;

use sqlx::AnyPool;
use sqlx::any::{AnyPoolOptions, AnyQueryResult};
use sqlx::{Row, query};
use tracing::{debug, info};

use crate::libs::config::StoreConfig;
use crate::libs::error::{MigrationError, Result};
use crate::libs::schema::{
    ColumnDefault, ColumnSchema, ColumnType, Dialect, TableSchema, drop_table_sql,
};

/// Why the database itself refused a table-level DDL statement.
#[derive(Debug, PartialEq, Eq)]
enum Refusal {
    AlreadyExists,
    Missing,
}

fn refusal(dialect: Dialect, code: Option<&str>, message: &str) -> Option<Refusal> {
    match dialect {
        Dialect::Postgres => match code {
            Some("42P07") => Some(Refusal::AlreadyExists),
            Some("42P01") => Some(Refusal::Missing),
            _ => None,
        },
        // SQLite reports both as the generic SQLITE_ERROR code.
        Dialect::Sqlite => {
            if message.contains("already exists") {
                Some(Refusal::AlreadyExists)
            } else if message.contains("no such table") {
                Some(Refusal::Missing)
            } else {
                None
            }
        }
    }
}

/// Live relational database whose structure migrations change.
pub struct SchemaStore {
    pub config: StoreConfig,
    dialect: Dialect,
    pool: Option<AnyPool>,
}

impl SchemaStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let dialect = Dialect::from_url(&config.database_url)?;
        Ok(Self {
            config,
            dialect,
            pool: None,
        })
    }

    pub async fn connect(&mut self) -> Result<()> {
        self.config.validate()?;
        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.acquire_timeout_secs));
        if self.config.is_in_memory() {
            // Every SQLite in-memory connection is its own database.
            options = options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options.connect(&self.config.database_url).await?;
        info!(dialect = ?self.dialect, "connected to schema store");
        self.pool = Some(pool);
        Ok(())
    }

    fn pool(&self) -> Result<&AnyPool> {
        self.pool.as_ref().ok_or(MigrationError::NotConnected)
    }

    pub async fn table_exists(&self, name: &str) -> Result<bool> {
        let sql = match self.dialect {
            Dialect::Postgres => {
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1"
            }
            Dialect::Sqlite => "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = $1",
        };
        let row = query(sql).bind(name).fetch_one(self.pool()?).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count > 0)
    }

    /// Creates `table`, refusing if a table of that name is already present.
    pub async fn create_table(&self, table: &TableSchema) -> Result<()> {
        if self.table_exists(&table.name).await? {
            return Err(MigrationError::SchemaConflict(table.name.clone()));
        }
        let sql = table.create_sql(self.dialect);
        debug!(%sql, "creating table");
        self.execute_ddl(&sql, &table.name).await
    }

    pub async fn drop_table(&self, name: &str) -> Result<()> {
        if !self.table_exists(name).await? {
            return Err(MigrationError::NotFound(name.to_string()));
        }
        let sql = drop_table_sql(name);
        debug!(%sql, "dropping table");
        self.execute_ddl(&sql, name).await
    }

    /// Runs DDL against `table`. A refusal by the database itself maps to the
    /// same errors as the catalog check (same-name views, concurrent runners).
    async fn execute_ddl(&self, sql: &str, table: &str) -> Result<()> {
        match query(sql).execute(self.pool()?).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) => {
                let refused = refusal(self.dialect, db.code().as_deref(), db.message());
                match refused {
                    Some(Refusal::AlreadyExists) => {
                        Err(MigrationError::SchemaConflict(table.to_string()))
                    }
                    Some(Refusal::Missing) => Err(MigrationError::NotFound(table.to_string())),
                    None => Err(MigrationError::Database(sqlx::Error::Database(db))),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reads a table's columns back from the catalog, in ordinal order.
    /// Returns `None` when the table does not exist.
    pub async fn describe_table(&self, name: &str) -> Result<Option<TableSchema>> {
        let sql = match self.dialect {
            Dialect::Postgres => {
                "SELECT c.column_name::text AS column_name, \
                        c.data_type::text AS data_type, \
                        (c.is_nullable::text = 'NO') AS not_null, \
                        c.column_default::text AS default_expr, \
                        EXISTS ( \
                            SELECT 1 FROM information_schema.table_constraints tc \
                            JOIN information_schema.key_column_usage k \
                              ON tc.constraint_name = k.constraint_name \
                             AND tc.table_schema = k.table_schema \
                            WHERE tc.constraint_type = 'PRIMARY KEY' \
                              AND tc.table_schema = c.table_schema \
                              AND tc.table_name = c.table_name \
                              AND k.column_name = c.column_name \
                        ) AS is_primary \
                 FROM information_schema.columns c \
                 WHERE c.table_schema = current_schema() AND c.table_name = $1 \
                 ORDER BY c.ordinal_position"
            }
            Dialect::Sqlite => {
                "SELECT name AS column_name, type AS data_type, \
                        \"notnull\" AS not_null, pk AS is_primary, \
                        dflt_value AS default_expr \
                 FROM pragma_table_info($1) ORDER BY cid"
            }
        };

        let rows = query(sql).bind(name).fetch_all(self.pool()?).await?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut columns = Vec::with_capacity(rows.len());
        for r in rows {
            let data_type: String = r.try_get("data_type")?;
            let default_expr: Option<String> = r.try_get("default_expr")?;
            let (not_null, primary) = match self.dialect {
                Dialect::Postgres => (
                    r.try_get::<bool, _>("not_null")?,
                    r.try_get::<bool, _>("is_primary")?,
                ),
                Dialect::Sqlite => (
                    r.try_get::<i64, _>("not_null")? != 0,
                    r.try_get::<i64, _>("is_primary")? != 0,
                ),
            };
            columns.push(ColumnSchema {
                name: r.try_get("column_name")?,
                column_type: ColumnType::from_sql_type(&data_type)?,
                primary,
                // SQLite lets non-integer primary keys hold NULL; treat them as required.
                not_null: not_null || primary,
                default: default_expr.as_deref().and_then(ColumnDefault::from_sql_expr),
            });
        }

        Ok(Some(TableSchema {
            name: name.to_string(),
            columns,
        }))
    }

    // -------- Execute raw SQL --------
    pub async fn raw(&self, sql: &str) -> Result<AnyQueryResult> {
        Ok(query(sql).execute(self.pool()?).await?)
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
