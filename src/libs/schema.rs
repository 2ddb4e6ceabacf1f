// schema.rs
use serde::Serialize;

use crate::libs::error::MigrationError;

/// SQL flavour a schema store speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Picks the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Result<Self, MigrationError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Dialect::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Dialect::Sqlite)
        } else {
            Err(MigrationError::UnsupportedBackend(url.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Uuid,
    String,
    Timestamp,
}

impl ColumnType {
    pub fn sql_type(&self, dialect: Dialect) -> &'static str {
        // SQLite keeps declared type names verbatim, so both dialects share them.
        match (self, dialect) {
            (ColumnType::Uuid, _) => "UUID",
            (ColumnType::String, _) => "VARCHAR",
            (ColumnType::Timestamp, _) => "TIMESTAMP",
        }
    }

    /// Parses a type name as reported by a catalog: either the declared
    /// name or PostgreSQL's `information_schema` spelling.
    pub fn from_sql_type(raw: &str) -> Result<Self, MigrationError> {
        let lowered = raw.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "uuid" => Ok(ColumnType::Uuid),
            "varchar" | "character varying" | "text" => Ok(ColumnType::String),
            t if t.starts_with("varchar(") || t.starts_with("character varying(") => {
                Ok(ColumnType::String)
            }
            t if t.starts_with("timestamp") => Ok(ColumnType::Timestamp),
            _ => Err(MigrationError::UnknownColumnType(raw.to_string())),
        }
    }
}

/// Value the database fills in when an insert omits the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnDefault {
    RandomUuid,
}

// SQLite has no uuid function; build a v4-shaped string from randomblob.
const SQLITE_RANDOM_UUID: &str = "(lower(hex(randomblob(4)) || '-' || hex(randomblob(2)) || '-4' || \
substr(hex(randomblob(2)), 2) || '-' || substr('89ab', abs(random()) % 4 + 1, 1) || \
substr(hex(randomblob(2)), 2) || '-' || hex(randomblob(6))))";

impl ColumnDefault {
    pub fn sql_expr(&self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (ColumnDefault::RandomUuid, Dialect::Postgres) => "gen_random_uuid()",
            (ColumnDefault::RandomUuid, Dialect::Sqlite) => SQLITE_RANDOM_UUID,
        }
    }

    /// Recognizes a default expression as reported by a catalog.
    pub fn from_sql_expr(raw: &str) -> Option<Self> {
        if raw.contains("gen_random_uuid") || raw.contains("randomblob") {
            Some(ColumnDefault::RandomUuid)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
    pub primary: bool,
    pub not_null: bool,
    pub default: Option<ColumnDefault>,
}

impl ColumnSchema {
    fn definition(&self, dialect: Dialect) -> String {
        let mut col_def = format!("{} {}", self.name, self.column_type.sql_type(dialect));
        if let Some(default) = &self.default {
            col_def.push_str(" DEFAULT ");
            col_def.push_str(default.sql_expr(dialect));
        }
        if self.primary {
            col_def.push_str(" PRIMARY KEY");
        } else if self.not_null {
            col_def.push_str(" NOT NULL");
        }
        col_def
    }
}

/// Ordered description of a table, built up the way a migration declares it.
///
/// ```
/// use accounts_migrations::{ColumnType, TableSchema};
///
/// let table = TableSchema::new("accounts")
///     .primary_key("id", ColumnType::Uuid)
///     .column("name", ColumnType::String)
///     .timestamps();
/// assert_eq!(table.columns.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn primary_key(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(ColumnSchema {
            name: name.to_string(),
            column_type,
            primary: true,
            not_null: true,
            default: None,
        });
        self
    }

    /// UUID primary key the database generates when an insert leaves it out.
    pub fn generated_uuid_primary_key(mut self, name: &str) -> Self {
        self.columns.push(ColumnSchema {
            name: name.to_string(),
            column_type: ColumnType::Uuid,
            primary: true,
            not_null: true,
            default: Some(ColumnDefault::RandomUuid),
        });
        self
    }

    /// Adds a nullable column.
    pub fn column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(ColumnSchema {
            name: name.to_string(),
            column_type,
            primary: false,
            not_null: false,
            default: None,
        });
        self
    }

    pub fn required(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(ColumnSchema {
            name: name.to_string(),
            column_type,
            primary: false,
            not_null: true,
            default: None,
        });
        self
    }

    /// Appends `created_at` and `updated_at`, both non-null timestamps.
    pub fn timestamps(self) -> Self {
        self.required("created_at", ColumnType::Timestamp)
            .required("updated_at", ColumnType::Timestamp)
    }

    pub fn column_named(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn create_sql(&self, dialect: Dialect) -> String {
        let mut sql = format!("CREATE TABLE {} (", self.name);
        let cols: Vec<String> = self.columns.iter().map(|c| c.definition(dialect)).collect();
        sql.push_str(&cols.join(", "));
        sql.push(')');
        sql
    }

    pub fn drop_sql(&self) -> String {
        drop_table_sql(&self.name)
    }
}

pub(crate) fn drop_table_sql(name: &str) -> String {
    format!("DROP TABLE {}", name)
}
