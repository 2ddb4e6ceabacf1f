use accounts_migrations::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StoreConfig::from_env()?.unwrap_or_else(|| StoreConfig::new("sqlite::memory:"));
    let mut store = SchemaStore::new(config)?;
    store.connect().await?;

    let revert = std::env::args().nth(1).as_deref() == Some("down");
    if revert {
        for migration in migrations::all().into_iter().rev() {
            migration.down(&store).await?;
        }
    } else {
        for migration in migrations::all() {
            migration.up(&store).await?;
        }
    }

    if let Some(accounts) = store.describe_table("accounts").await? {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
    }

    store.close().await;
    Ok(())
}
