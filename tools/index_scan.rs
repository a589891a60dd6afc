mod config;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use config::{config_path_from_env, load_or_create_config, resolve_music_root};
use library::{CancellationToken, MediaLibrary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut json = false;
    let mut positional = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            positional.push(arg);
        }
    }

    let config_path = config_path_from_env();
    let (config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let music_root = positional
        .into_iter()
        .next()
        .map(PathBuf::from)
        .or_else(|| env::var("MUSIC_ROOT").ok().map(PathBuf::from))
        .or_else(|| resolve_music_root(&config_path, &config.music_root))
        .ok_or("MUSIC_ROOT not set and no path argument")?;

    let options = config.indexer_options(&config_path);
    info!("Using metadata cache {:?}", options.cache_path);
    let library = Arc::new(MediaLibrary::new(music_root, options));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; stopping after the current file");
                cancel.cancel();
            }
        });
    }

    let worker = {
        let library = Arc::clone(&library);
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            library.load_with_cancel(|progress| info!("Indexing {}%", progress), &cancel)
        })
    };
    let stats = worker.await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "Indexed: {} songs, {} albums, {} artists, {} genres ({} files, {} from cache)",
            stats.library.songs,
            stats.library.albums,
            stats.library.artists,
            stats.library.genres,
            stats.discovered,
            stats.reused
        );
    }

    Ok(())
}
