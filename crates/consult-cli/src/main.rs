//! Consult CLI - operator tools
//!
//! Usage:
//!   consult hash-password <password>
//!   consult create-admin --email <email> --password <password> [--full-name <name>]
//!
//! Database settings come from the same environment variables as the server.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use consult_api::auth::{hash_password, HashingService};
use consult_core::{AppConfig, NewUser, Role, User, UserUpdate};

/// Shortest password the API accepts
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser)]
#[command(name = "consult")]
#[command(about = "Consult back-office operator tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an Argon2id digest for a password
    HashPassword {
        password: String,
    },
    /// Create an admin account, or promote the existing account with this email
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CONSULT_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consult_store=info,warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::HashPassword { password } => {
            check_password(&password)?;
            println!("{}", hash_password(&password)?);
        }
        Commands::CreateAdmin {
            email,
            password,
            full_name,
        } => create_admin(email.trim(), &password, full_name).await?,
    }

    Ok(())
}

fn check_password(password: &str) -> anyhow::Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be {MIN_PASSWORD_LEN} or more characters");
    }
    Ok(())
}

/// Update that makes `user` an admin, or `None` when nothing would change
fn promotion(user: &User, full_name: Option<String>) -> Option<UserUpdate> {
    if user.is_admin() && full_name.is_none() {
        return None;
    }
    Some(UserUpdate {
        role: Some(Role::Admin),
        full_name,
    })
}

async fn create_admin(email: &str, password: &str, full_name: Option<String>) -> anyhow::Result<()> {
    check_password(password)?;

    let config = AppConfig::from_env()?;
    if config.database.is_memory() {
        bail!("DATABASE_URL points at the in-memory store; nothing would be persisted");
    }
    let store = consult_store::connect(&config.database)
        .await
        .context("failed to open store")?;

    if let Some(user) = store.find_user_by_email(email).await? {
        let Some(update) = promotion(&user, full_name) else {
            println!("{email} is already an admin");
            return Ok(());
        };
        store
            .update_user(&user.id, update)
            .await?
            .context("user disappeared during promotion")?;
        tracing::info!(user_id = %user.id, "Promoted existing user to admin");
        println!("Promoted {email} to admin (existing password kept)");
        return Ok(());
    }

    let password_hash = HashingService::default().hash(password).await?;
    let user = store
        .create_user(NewUser {
            full_name,
            email: email.to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, "Created admin user");
    println!("Created admin {email} ({})", user.id);
    Ok(())
}
