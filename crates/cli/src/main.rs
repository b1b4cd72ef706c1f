//! Foodgram CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! foodgram migrate
//!
//! # Load the ingredient catalog and the tag set
//! foodgram import ingredients data/ingredients.json
//! foodgram import tags data/tags.json
//!
//! # Delete a user together with their recipes and images
//! foodgram users delete 42
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `import` - Load catalog data from JSON files
//! - `users delete` - Remove a user and everything they own

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(author, version, about = "Foodgram CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import catalog data
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum ImportTarget {
    /// Import ingredients from a JSON array of `{name, measurement_unit}`
    Ingredients {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Import tags from a JSON array of `{name, color, slug}`
    Tags {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Delete a user, their recipes, collections, follows and tokens
    Delete {
        /// User id
        id: i32,
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
        Commands::Import { target } => match target {
            ImportTarget::Ingredients { file } => {
                commands::import::ingredients(&file).await?;
            }
            ImportTarget::Tags { file } => commands::import::tags(&file).await?,
        },
        Commands::Users { action } => match action {
            UserAction::Delete { id } => commands::users::delete(id).await?,
        },
    }
    Ok(())
}
