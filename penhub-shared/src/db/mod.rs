/// Database layer for PenHub
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with bounded setup
/// - `migrations`: embedded schema migrations
/// - `store`: the `Store` trait every service talks to
/// - `postgres`: `Store` over a `PgPool`
/// - `memory`: in-process `Store` for tests and demos
/// - `deadline`: per-request deadlines around store calls
///
/// # Example
///
/// ```no_run
/// use penhub_shared::db::{
///     pool::{create_pool, DatabaseConfig},
///     postgres::PgStore,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let store = PgStore::new(create_pool(config).await?);
///     Ok(())
/// }
/// ```

pub mod deadline;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;
