use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hearth_server::{
    database::Database,
    recipes::{self, repository::SqliteRecipeRepository, service::RecipeService},
    server, telemetry, Args,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = args.load_config()?;
    let _guard = telemetry::init_tracing(&config.log)?;

    // connect to the database
    let db = Database::connect(&config.database.path, recipes::MIGRATIONS)
        .await
        .context("Connecting to database")?;
    let service = RecipeService::new(Arc::new(SqliteRecipeRepository::new(db)));

    let app = server::with_common_layers(recipes::routes::router(service));
    server::serve(app, &config.server).await
}
