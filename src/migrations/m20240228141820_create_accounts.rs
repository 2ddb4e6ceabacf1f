use crate::libs::{ColumnType, CreateTable, TableSchema};

pub const VERSION: &str = "20240228141820";

pub const NAME: &str = "create_accounts";

pub fn migration() -> CreateTable {
    CreateTable::new(
        VERSION,
        NAME,
        TableSchema::new("accounts")
            .primary_key("id", ColumnType::Uuid)
            .column("name", ColumnType::String)
            .timestamps(),
    )
}
