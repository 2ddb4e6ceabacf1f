pub mod m20240228141820_create_accounts;

use crate::libs::Migration;

/// Every migration this crate ships, oldest first.
pub fn all() -> Vec<Box<dyn Migration>> {
    let mut migrations: Vec<Box<dyn Migration>> =
        vec![Box::new(m20240228141820_create_accounts::migration())];
    migrations.sort_by_key(|m| m.version());
    migrations
}
