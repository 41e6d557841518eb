//! Fashion Store CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fs-cli migrate
//!
//! # Insert sample categories and the default admin account
//! fs-cli seed
//!
//! # Create an admin account
//! fs-cli admin create -e owner@example.com -p 'long-password'
//!
//! # Reset (or create) the admin account to known credentials
//! fs-cli admin reset
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed an empty database
//! - `admin create` - Create admin accounts
//! - `admin reset` - Force an account to admin with a new password

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "Fashion Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed sample categories and a default admin account
    Seed,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Username; defaults to the local part of the email
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Reset an account to admin with the given credentials, creating it if missing
    Reset {
        #[arg(short, long, default_value = "admin")]
        username: String,

        #[arg(short, long, default_value = "admin@example.com")]
        email: String,

        #[arg(short, long, default_value = "admin123")]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                username,
            } => {
                commands::admin::create_user(&email, &password, username.as_deref()).await?;
            }
            AdminAction::Reset {
                username,
                email,
                password,
            } => {
                commands::admin::reset_user(&username, &email, &password).await?;
            }
        },
    }
    Ok(())
}
