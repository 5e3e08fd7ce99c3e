use anyhow::Result;
use clap::Parser;
use hearth::basic_models::{LoginDto, RegisterDto};
use hearth_client::api::{ApiError, HearthClient};

/// Log in to the secure API and call its protected endpoint
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// URL of the server to check
    #[arg(long, env = "HEARTH_SECURE_API", default_value = "http://127.0.0.1:5001")]
    server: String,
    #[arg(long, env = "HEARTH_EMAIL")]
    email: String,
    #[arg(long, env = "HEARTH_PASSWORD", hide_env_values = true)]
    password: String,
    /// Register the account first
    #[arg(long)]
    register: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    if dotenvy::dotenv().is_err() {
        eprintln!("Warning: Failed to load .env file");
    }
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let client = HearthClient::new(&args.server);

    println!("Testing authentication with {}...", args.server);

    if args.register {
        match client
            .register(&RegisterDto {
                email: args.email.clone(),
                password: args.password.clone(),
            })
            .await
        {
            Ok(()) => println!("Registered {}", args.email),
            // Usually "already taken"; the login below tells us if it matters
            Err(ApiError::Status { body, .. }) => println!("Registration refused: {body}"),
            Err(e) => return Err(e.into()),
        }
    }

    let login = match client
        .login(&LoginDto {
            email: args.email,
            password: args.password,
        })
        .await
    {
        Ok(login) => login,
        Err(ApiError::Status { status, body }) => {
            println!("Status: {status}");
            println!("\nAuthentication failed!");
            println!("{body}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("\nError connecting to server!");
            if args.server.starts_with("https://localhost")
                || args.server.starts_with("https://127.0.0.1")
            {
                eprintln!("\nHint: Local dev servers typically use HTTP, not HTTPS.");
            }
            return Err(e.into());
        }
    };

    let probe = client.with_token(login.token).test_secure().await?;
    println!("\nAuthentication successful!");
    println!("{}", serde_json::to_string_pretty(&probe)?);
    Ok(())
}
