use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

mod app;
mod ui;

use app::App;
use roster::catalog::{FetchOutcome, HttpCatalogClient};
use roster::config::Config;
use roster::coordinator::ListCoordinator;
use roster::favorites::{FavoritesDb, FavoritesError, PersistentFavorites};

/// Get the config directory path (~/.config/roster/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("roster");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    about = "Browse, search and favorite characters from a paginated catalog API"
)]
struct Args {
    /// Config file (default: ~/.config/roster/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the catalog API base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Delete all saved favorites and exit
    #[arg(long)]
    reset_favorites: bool,

    /// Print saved favorites and exit
    #[arg(long)]
    list_favorites: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(base_url) = args.base_url {
        config.api_base_url = base_url;
    }

    let db_path = config
        .favorites_db
        .clone()
        .unwrap_or_else(|| config_dir.join("favorites.db"));
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in favorites database path"))?;
    let db = match FavoritesDb::open(db_path_str).await {
        Ok(db) => db,
        Err(FavoritesError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of roster appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open favorites database: {}", e));
        }
    };

    if args.reset_favorites {
        let removed = db.clear().await.context("Failed to reset favorites")?;
        println!("Removed {} favorites.", removed);
        return Ok(());
    }

    if args.list_favorites {
        let favorites = db.load_all().await.context("Failed to load favorites")?;
        if favorites.is_empty() {
            println!("No favorites saved.");
        }
        for character in favorites {
            println!("{:>6}  {}  ({})", character.id, character.name, character.species);
        }
        return Ok(());
    }

    let client = HttpCatalogClient::new(
        &config.api_base_url,
        config.request_timeout(),
        config.max_retries,
    )
    .context("Invalid catalog base URL")?;

    let favorites = Arc::new(
        PersistentFavorites::load(db)
            .await
            .context("Failed to load favorites")?,
    );

    let (event_tx, event_rx) = mpsc::channel::<FetchOutcome>(32);
    let mut list = ListCoordinator::new(
        Arc::new(client),
        favorites.clone(),
        config.list_settings(),
        event_tx,
    );
    list.start();

    let mut app = App::new(list);
    let result = ui::run(&mut app, event_rx).await;

    // Tear the coordinator down before draining writes.
    drop(app);
    favorites.flush().await;

    result?;
    println!("Goodbye!");
    Ok(())
}
