use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use notes_api::adapters::HttpServer;
use notes_api::config::Config;
use notes_api::service::NoteService;
use notes_api::storage::postgres::{self, PgNoteStore};
use notes_api::storage::schema;
use notes_api::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    telemetry::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "notes API could not start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    let pool = postgres::connect(&config.database)
        .await
        .context("could not connect to the database")?;
    schema::ensure_schema(&pool)
        .await
        .context("could not prepare the notes table")?;

    let notes = NoteService::new(Arc::new(PgNoteStore::new(pool)));
    let server = HttpServer::new(notes, &config.server).await?;
    server.run().await
}
