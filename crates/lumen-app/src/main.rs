//! Lumen desktop entry point.
//!
//! Loads the shell config, opens the data directory, and runs the
//! line-driven shell over a headless engine. Type addresses or search
//! terms; `:help` lists commands, `:quit` (or end of input) saves and exits.

mod app_state;
mod engine;
mod repl;
mod tabs;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use app_state::ShellContext;
use engine::HeadlessEngine;
use lumen_store::PersistenceStore;
use lumen_types::config::{CONFIG_FILE_NAME, ShellConfig, default_data_dir};

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Lumen browser shell")]
struct Args {
    /// Address to open in the first tab (defaults to the home page).
    #[arg(long)]
    url: Option<String>,

    /// Directory holding settings, bookmarks and history (overrides config).
    #[arg(long, env = "LUMEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Shell config file (default: <data dir>/lumen.toml).
    #[arg(long, env = "LUMEN_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(|| {
        args.data_dir
            .clone()
            .unwrap_or_else(default_data_dir)
            .join(CONFIG_FILE_NAME)
    });
    let config = ShellConfig::load(&config_path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.resolved_data_dir());
    log::info!(
        "Starting Lumen (data: {}, {} save workers)",
        data_dir.display(),
        config.persistence_workers
    );

    let store = PersistenceStore::open(&data_dir, config.persistence_workers)
        .with_context(|| format!("opening data directory {}", data_dir.display()))?;
    let mut ctx = ShellContext::new(store, HeadlessEngine::new());
    log::debug!(
        "Home page {}, searching with {}",
        ctx.settings().home_page,
        ctx.settings().search_engine
    );
    ctx.open_tab(args.url.as_deref());

    let stdin = std::io::stdin();
    repl::run(&mut ctx, stdin.lock(), std::io::stdout())?;

    ctx.shutdown()?;
    log::info!("Goodbye");
    Ok(())
}
