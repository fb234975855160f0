//! Schema CLI for the todo database.
//!
//! `DATABASE_URL=... cargo run -p migration -- up` (also `down`, `status`, `fresh`).

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
