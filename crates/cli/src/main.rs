//! StudentBnB CLI - sign in, manage your profile and publish listings.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password is read from stdin when --password is omitted)
//! sbnb auth login -e sam@uni.edu
//!
//! # Write a draft template, edit it, then publish it with photos
//! sbnb listing new draft.yaml
//! sbnb listing submit draft.yaml --photo kitchen.jpg --photo bedroom.jpg
//!
//! # Edit an existing listing
//! sbnb listing submit draft.yaml --id 42
//!
//! # Finish a submission that stopped partway
//! sbnb listing resume draft.yaml --photo kitchen.jpg --photo bedroom.jpg
//!
//! # Browse
//! sbnb listing browse --page 0 --size 20
//! sbnb listing search --city Buffalo --max-rent 1200
//! ```
//!
//! # Commands
//!
//! - `auth` - register, login, google, logout, whoami, refresh
//! - `profile` - show, update
//! - `listing` - new, submit, resume, show, mine, browse, search, delete, delete-photo, vocab

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "sbnb")]
#[command(author, version, about = "StudentBnB command-line client")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign out and inspect the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Create, edit and browse listings
    Listing {
        #[command(subcommand)]
        action: ListingAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        /// Account role (`student`, `landlord`)
        #[arg(short, long, default_value = "student")]
        role: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in with a Google ID-token credential
    Google {
        credential: String,
    },
    /// Forget the local session
    Logout,
    /// Show the current session
    Whoami,
    /// Exchange the refresh token for a new access token
    Refresh,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Update profile fields; omitted fields are left unchanged
    Update(commands::profile::ProfileArgs),
}

#[derive(Subcommand)]
enum ListingAction {
    /// Write a draft template to edit
    New { path: PathBuf },
    /// Validate and publish a draft
    Submit {
        path: PathBuf,
        /// Photo to upload (repeatable; the first becomes primary)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        /// Update this listing instead of creating one
        #[arg(long)]
        id: Option<i64>,
    },
    /// Finish a submission that stopped partway, skipping completed steps
    Resume {
        path: PathBuf,
        /// Photos to upload if that step has not completed yet
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
    /// Show one listing with its preferences
    Show { id: i64 },
    /// List your own listings
    Mine,
    /// Browse active listings
    Browse {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = studentbnb_client::DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    /// Search active listings
    Search(commands::listing::SearchArgs),
    /// Delete one of your listings
    Delete { id: i64 },
    /// Delete a photo from one of your listings
    DeletePhoto { photo_id: i64 },
    /// Show the amenity and preference vocabularies
    Vocab,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studentbnb=info,sbnb=info"));
    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env()?;
    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Register {
                email,
                role,
                password,
            } => commands::auth::register(&ctx, email, &role, password).await?,
            AuthAction::Login { email, password } => {
                commands::auth::login(&ctx, &email, password).await?;
            }
            AuthAction::Google { credential } => commands::auth::google(&ctx, credential).await?,
            AuthAction::Logout => commands::auth::logout(&ctx)?,
            AuthAction::Whoami => commands::auth::whoami(&ctx),
            AuthAction::Refresh => commands::auth::refresh(&ctx).await?,
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&ctx).await?,
            ProfileAction::Update(args) => commands::profile::update(&ctx, args).await?,
        },
        Commands::Listing { action } => match action {
            ListingAction::New { path } => commands::listing::new_template(&path)?,
            ListingAction::Submit { path, photos, id } => {
                commands::listing::submit(&ctx, &path, &photos, id).await?;
            }
            ListingAction::Resume { path, photos } => {
                commands::listing::resume(&ctx, &path, &photos).await?;
            }
            ListingAction::Show { id } => commands::listing::show(&ctx, id).await?,
            ListingAction::Mine => commands::listing::mine(&ctx).await?,
            ListingAction::Browse { page, size } => {
                commands::listing::browse(&ctx, page, size).await?;
            }
            ListingAction::Search(args) => commands::listing::search(&ctx, args).await?,
            ListingAction::Delete { id } => commands::listing::delete(&ctx, id).await?,
            ListingAction::DeletePhoto { photo_id } => {
                commands::listing::delete_photo(&ctx, photo_id).await?;
            }
            ListingAction::Vocab => commands::listing::vocab(&ctx).await,
        },
    }
    Ok(())
}
