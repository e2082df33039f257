// fileref-check/src/cli.rs

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::{fs, io::Write, path::{Path, PathBuf}};
use tracing::debug;

use crate::{settings::{self, Settings}, Report};

/// Exit status for `--strict` when the resolved document is not clean.
pub const EXIT_UNCLEAN: i32 = 2;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format { Text, Json }

#[derive(Parser, Debug)]
#[command(name = "fileref-check", version, about = "Resolve {file:...} references in a JSON config and check the result")]
pub struct Args {
    /// JSON document to check (default: ~/.config/opencode/opencode.json)
    document: Option<PathBuf>,
    /// Extra settings file layered over the user settings
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Directory substituted for `~` in referenced paths
    #[arg(long)]
    home: Option<String>,
    /// Deepest nesting level that still gets substituted (clamped to 32)
    #[arg(long)]
    max_depth: Option<usize>,
    /// Characters of context shown around a parse error
    #[arg(long)]
    context_radius: Option<usize>,
    /// Validate the resolved document against this JSON Schema
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Also output the resolved document; with `--format json` it becomes the `resolved_text` field
    #[arg(long)]
    print_resolved: bool,
    /// Exit with status 2 unless the resolved document is clean
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn as_layer(&self) -> Settings {
        Settings {
            document: self.document.clone(),
            home: self.home.clone(),
            max_depth: self.max_depth,
            context_radius: self.context_radius,
            schema: self.schema.clone(),
        }
    }
}

/// Run one check and write the report to `out`. Returns the process exit status.
pub fn run<W: Write>(args: &Args, user_settings: Option<&Path>, env_home: Option<String>, out: &mut W) -> Result<i32> {
    let mut cfg = Settings::load_layers(user_settings, args.settings.as_deref())?;
    settings::merge(&mut cfg, &args.as_layer());
    debug!(?cfg, "effective settings");

    let home = cfg.home_dir(env_home);
    let schema = match &cfg.schema {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            Some(serde_json::from_str::<Value>(&text).with_context(|| format!("parse schema {}", path.display()))?)
        }
        None => None,
    };

    let report = Report::load(&cfg.document_path(&home), &cfg.resolver(&home), cfg.context_radius(), schema.as_ref())?;
    match args.format {
        Format::Text => {
            write!(out, "{report}")?;
            if args.print_resolved { writeln!(out, "{}", report.resolved_text)?; }
        }
        Format::Json => {
            let mut v = serde_json::to_value(&report)?;
            if args.print_resolved { v["resolved_text"] = Value::String(report.resolved_text.clone()); }
            writeln!(out, "{}", serde_json::to_string_pretty(&v)?)?;
        }
    }

    Ok(if args.strict && !report.is_clean() { EXIT_UNCLEAN } else { 0 })
}
