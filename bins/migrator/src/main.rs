//! Database migration runner for Polyroll.
//!
//! Usage:
//!   migrator up      - Apply the schema
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-apply
//!
//! Reads `DATABASE_URL` from the environment or `.env`.

use polyroll_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI sets up its own tracing
    cli::run_cli(Migrator).await;
}
