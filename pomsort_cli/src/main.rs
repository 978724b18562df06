mod cli;
mod error_fmt;
mod run;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::WrapErr;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    color_eyre::install().ok();
    let args = Cli::parse();
    JSON_MODE.set(args.json).ok();

    match try_main(&args) {
        Ok(()) => {}
        Err(err) => {
            if args.json {
                eprintln!("{}", error_fmt::json_error(&err));
            } else {
                eprintln!("error: {err:#}");
                eprintln!("{}", error_fmt::humanize(&err));
            }
            std::process::exit(1);
        }
    }
}

fn try_main(args: &Cli) -> eyre::Result<()> {
    let cfg = load_config(&args.config)?;
    init_tracing(args, &cfg.logging)?;

    match args.cmd {
        Commands::Run {
            max_maneuver_ms,
            print_runtime,
        } => run::run_plan(&cfg, max_maneuver_ms, print_runtime),
        Commands::Plan => {
            run::print_plan(&cfg);
            Ok(())
        }
        Commands::SelfCheck => run::self_check(&cfg),
    }
}

/// Read and validate the TOML config. A missing file at the default path
/// falls back to the built-in calibration table.
fn load_config(path: &Path) -> eyre::Result<pomsort_config::Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(pomsort_config::Config::default());
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg = pomsort_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("config parse error: {e}"))
        .wrap_err_with(|| format!("parsing config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("validating config {}", path.display()))?;
    Ok(cfg)
}

fn init_tracing(args: &Cli, logging: &pomsort_config::Logging) -> eyre::Result<()> {
    let level = logging.level.as_deref().unwrap_or(&args.log_level);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>> = Vec::new();
    if args.json {
        layers.push(fmt::layer().json().flatten_event(true).boxed());
    } else {
        layers.push(fmt::layer().with_target(false).boxed());
    }

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path.file_name().unwrap_or_else(|| "pomsort.log".as_ref());
        let rotation = match logging.rotation.as_deref() {
            Some("daily") => Rotation::DAILY,
            Some("hourly") => Rotation::HOURLY,
            _ => Rotation::NEVER,
        };
        let appender = RollingFileAppender::new(rotation, dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        FILE_GUARD.set(guard).ok();
        layers.push(fmt::layer().json().with_writer(writer).with_ansi(false).boxed());
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
    Ok(())
}
