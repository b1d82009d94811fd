//! UCPL CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply site and session store migrations
//! ucpl-cli migrate
//!
//! # Set status on inquiries stored without one
//! ucpl-cli fix-status
//!
//! # Compare gallery files with gallery records
//! ucpl-cli gallery reconcile
//!
//! # ...and remove files no record points at
//! ucpl-cli gallery reconcile --delete-orphan-files
//! ```
//!
//! # Environment Variables
//!
//! - `UCPL_DATABASE_URL` or `DATABASE_URL` - `PostgreSQL` connection string (required)
//! - `GALLERY_DIR` - Gallery upload directory (default: public/assets/gallery)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "ucpl-cli")]
#[command(author, version, about = "UCPL library website CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (site tables and session store)
    Migrate,
    /// Set status to `new` on inquiries stored without one
    FixStatus,
    /// Gallery maintenance
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
}

#[derive(Subcommand)]
enum GalleryAction {
    /// Report gallery files without records and records without files
    Reconcile {
        /// Remove files that no gallery record points at
        #[arg(long)]
        delete_orphan_files: bool,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ucpl_cli=info,ucpl_site=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::FixStatus => commands::inquiries::fix_status().await?,
        Commands::Gallery { action } => match action {
            GalleryAction::Reconcile {
                delete_orphan_files,
            } => commands::gallery::reconcile(delete_orphan_files).await?,
        },
    }
    Ok(())
}
