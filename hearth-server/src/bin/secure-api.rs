use anyhow::{Context, Result};
use clap::Parser;
use hearth_server::{
    database::Database,
    identity::{self, routes::AuthState, store::UserStore, token::TokenService},
    server, telemetry, Args,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = args.load_config()?;
    let _guard = telemetry::init_tracing(&config.log)?;

    let tokens = TokenService::new(&config.jwt()?).context("Building token service")?;
    let db = Database::connect(&config.database.path, identity::MIGRATIONS)
        .await
        .context("Connecting to database")?;
    let state = AuthState {
        users: UserStore::new(db),
        tokens,
        policy: config.password.clone(),
    };

    let app = server::with_common_layers(identity::routes::router(state));
    server::serve(app, &config.server).await
}
