use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use shelf_core::Catalog;
use tracing::info;

fn init_tracing() {
    let env = std::env::var("SHELF_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let catalog = match std::env::var("SHELF_FIXTURES") {
        Ok(path) => {
            info!(path = %path, "loading fixtures");
            Catalog::load(Path::new(&path))?
        }
        Err(_) => Catalog::bundled()?,
    };
    if let Err(e) = shelf_gui::run_native(catalog) {
        eprintln!("GUI error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
