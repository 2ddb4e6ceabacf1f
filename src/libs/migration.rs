use async_trait::async_trait;
use tracing::info;

use crate::libs::error::Result;
use crate::libs::schema::TableSchema;
use crate::libs::store::SchemaStore;

/// A single versioned schema change.
///
/// `version` is a timestamp-derived identifier; an external runner orders
/// migrations by it and records it once the change is applied.
#[async_trait]
pub trait Migration: Send + Sync {
    fn version(&self) -> &'static str;

    fn name(&self) -> &'static str;

    async fn up(&self, store: &SchemaStore) -> Result<()>;

    async fn down(&self, store: &SchemaStore) -> Result<()>;
}

/// Creates one table. Reverting drops it again.
#[derive(Debug, Clone)]
pub struct CreateTable {
    version: &'static str,
    name: &'static str,
    table: TableSchema,
}

impl CreateTable {
    pub fn new(version: &'static str, name: &'static str, table: TableSchema) -> Self {
        Self {
            version,
            name,
            table,
        }
    }

    pub fn table(&self) -> &TableSchema {
        &self.table
    }
}

#[async_trait]
impl Migration for CreateTable {
    fn version(&self) -> &'static str {
        self.version
    }

    fn name(&self) -> &'static str {
        self.name
    }

    async fn up(&self, store: &SchemaStore) -> Result<()> {
        store.create_table(&self.table).await?;
        info!(version = self.version, table = %self.table.name, "applied {}", self.name);
        Ok(())
    }

    async fn down(&self, store: &SchemaStore) -> Result<()> {
        store.drop_table(&self.table.name).await?;
        info!(version = self.version, table = %self.table.name, "reverted {}", self.name);
        Ok(())
    }
}
