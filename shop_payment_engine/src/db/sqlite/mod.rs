pub mod db;

pub mod carts;
pub mod orders;
pub mod products;

use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub use db::SqliteDatabase;

const SQLITE_DB_URL: &str = "sqlite://data/spg.db";

pub fn db_url() -> String {
    let result = env::var("SPG_DATABASE_URL").unwrap_or_else(|_| {
        info!("SPG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
