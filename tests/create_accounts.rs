use accounts_migrations::migrations::{self, m20240228141820_create_accounts as create_accounts};
use accounts_migrations::{
    ColumnType, Migration, MigrationError, SchemaStore, StoreConfig, TableSchema,
};

async fn memory_store() -> SchemaStore {
    let mut store = SchemaStore::new(StoreConfig::new("sqlite::memory:")).unwrap();
    store.connect().await.unwrap();
    store
}

#[tokio::test]
async fn apply_creates_accounts_table() {
    let store = memory_store().await;
    let migration = create_accounts::migration();

    migration.up(&store).await.unwrap();

    assert!(store.table_exists("accounts").await.unwrap());
    let table = store.describe_table("accounts").await.unwrap().unwrap();
    let described: Vec<(&str, ColumnType, bool, bool)> = table
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.column_type, c.primary, c.not_null))
        .collect();
    assert_eq!(
        described,
        vec![
            ("id", ColumnType::Uuid, true, true),
            ("name", ColumnType::String, false, false),
            ("created_at", ColumnType::Timestamp, false, true),
            ("updated_at", ColumnType::Timestamp, false, true),
        ]
    );
    assert_eq!(&table, migration.table());
}

#[tokio::test]
async fn applying_twice_conflicts() {
    let store = memory_store().await;
    let migration = create_accounts::migration();

    migration.up(&store).await.unwrap();
    let err = migration.up(&store).await.unwrap_err();

    assert!(matches!(err, MigrationError::SchemaConflict(ref t) if t == "accounts"));
}

#[tokio::test]
async fn revert_drops_accounts_table() {
    let store = memory_store().await;
    let migration = create_accounts::migration();

    migration.up(&store).await.unwrap();
    migration.down(&store).await.unwrap();

    assert!(!store.table_exists("accounts").await.unwrap());
    assert!(store.describe_table("accounts").await.unwrap().is_none());
}

#[tokio::test]
async fn revert_without_apply_is_not_found() {
    let store = memory_store().await;

    let err = create_accounts::migration().down(&store).await.unwrap_err();

    assert!(matches!(err, MigrationError::NotFound(ref t) if t == "accounts"));
}

#[tokio::test]
async fn reapply_after_revert_reproduces_schema() {
    let store = memory_store().await;
    let migration = create_accounts::migration();

    migration.up(&store).await.unwrap();
    let first = store.describe_table("accounts").await.unwrap();
    migration.down(&store).await.unwrap();
    migration.up(&store).await.unwrap();
    let second = store.describe_table("accounts").await.unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn timestamps_reject_nulls() {
    let store = memory_store().await;
    create_accounts::migration().up(&store).await.unwrap();

    let id = uuid::Uuid::new_v4();
    store
        .raw(&format!(
            "INSERT INTO accounts (id, name, created_at, updated_at) \
             VALUES ('{id}', NULL, '2024-02-28 14:18:20', '2024-02-28 14:18:20')"
        ))
        .await
        .unwrap();
    let err = store
        .raw(&format!(
            "INSERT INTO accounts (id, name, created_at, updated_at) \
             VALUES ('{}', 'Ada', NULL, NULL)",
            uuid::Uuid::new_v4()
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::Database(_)));
}

#[tokio::test]
async fn registry_applies_in_version_order() {
    let store = memory_store().await;

    for migration in migrations::all() {
        migration.up(&store).await.unwrap();
    }

    assert!(store.table_exists("accounts").await.unwrap());
}

#[tokio::test]
async fn operations_before_connect_fail() {
    let store = SchemaStore::new(StoreConfig::new("sqlite::memory:")).unwrap();

    let err = store.table_exists("accounts").await.unwrap_err();

    assert!(matches!(err, MigrationError::NotConnected));
}

#[tokio::test]
async fn unreachable_store_is_connectivity_failure() {
    let mut config = StoreConfig::new("postgres://nobody@127.0.0.1:1/none");
    config.max_connections = 1;
    config.acquire_timeout_secs = 2;
    let mut store = SchemaStore::new(config).unwrap();

    let err = store.connect().await.unwrap_err();

    assert!(matches!(err, MigrationError::ConnectivityFailure(_)), "{err:?}");
}

#[tokio::test]
async fn same_name_view_conflicts() {
    let store = memory_store().await;
    store.raw("CREATE VIEW accounts AS SELECT 1 AS x").await.unwrap();

    let err = create_accounts::migration().up(&store).await.unwrap_err();

    assert!(matches!(err, MigrationError::SchemaConflict(ref t) if t == "accounts"), "{err:?}");
}

#[tokio::test]
async fn zero_pool_size_is_rejected_before_connecting() {
    let mut config = StoreConfig::new("sqlite::memory:");
    config.max_connections = 0;
    let mut store = SchemaStore::new(config).unwrap();

    let err = store.connect().await.unwrap_err();

    assert!(matches!(err, MigrationError::InvalidConfig(_)), "{err:?}");
}

#[tokio::test]
async fn generated_uuid_key_fills_missing_ids() {
    let store = memory_store().await;
    let table = TableSchema::new("tokens")
        .generated_uuid_primary_key("id")
        .column("label", ColumnType::String);

    store.create_table(&table).await.unwrap();
    store.raw("INSERT INTO tokens (label) VALUES ('a')").await.unwrap();
    store.raw("INSERT INTO tokens (label) VALUES ('b')").await.unwrap();

    assert_eq!(store.describe_table("tokens").await.unwrap(), Some(table));
    let rows = store.raw("DELETE FROM tokens WHERE length(id) = 36").await.unwrap();
    assert_eq!(rows.rows_affected(), 2);
}
