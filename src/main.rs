// fileref-check/src/main.rs

use anyhow::Result;
use clap::Parser;

use fileref_check::{cli::{self, Args}, settings};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let user = settings::user_settings_path();
    let code = cli::run(&args, user.as_deref(), std::env::var("HOME").ok(), &mut std::io::stdout().lock())?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
