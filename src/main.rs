//! Smart trolley dashboard binary
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release              # live terminal dashboard
//! cargo run --release -- --once    # print the current bill and exit
//! ```
//!
//! Configuration is read from the environment (or `.env`), see `Config`.

use {
    std::{
        env,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
    },
    trolley::{
        catalog::Catalog,
        config::{Config, StoreBackend},
        store, ui, Aggregator,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Logs go to stderr so they stay out of the dashboard's alternate screen
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_default_env()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    };
    builder.target(env_logger::Target::Stderr).init();

    let once = env::args().any(|arg| arg == "--once");

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::reference(),
    };
    let store = store::open(&config.store)?;

    log::info!("🚀 Starting smart trolley dashboard...");
    log::info!("📊 Configuration:");
    log::info!("   Store: {}", store.describe());
    if let StoreBackend::Firebase(firebase) = &config.store {
        log::info!(
            "   Auth token: {}",
            if firebase.auth_token.is_some() { "set" } else { "none" }
        );
    }
    log::info!(
        "   Catalog: {} items ({})",
        catalog.tags().len(),
        config
            .catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );
    log::info!("   Refresh interval: {}s", config.refresh_interval.as_secs());

    let aggregator = Aggregator::new(store, Arc::new(catalog));

    if once {
        let (summary, _) = aggregator.fetch_and_summarize().await?;
        print!("{}", ui::render_plain(&summary, aggregator.catalog()));
        return Ok(());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, shutting down");
            cancel_on_signal.store(true, Ordering::Relaxed);
        }
    });

    ui::run_ui(&aggregator, config.refresh_interval, cancel).await?;
    log::info!("✅ Dashboard exited");
    Ok(())
}
