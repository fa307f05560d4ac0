//! Asgard command-line launcher
//!
//! # Usage
//!
//! ```bash
//! asgard root ~/scripts
//! asgard list --query render
//! asgard run "Render Queue"
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use asgard::config::{self, Config};
use asgard::error::{AsgardError, ResultExt};
use asgard::host::{
    CommandRunner, DirectoryChooser, JsonPreferenceStore, PromptDirectoryChooser, Settings,
};
use asgard::scripts::favorite_threshold;
use asgard::{Percentile, RegistryView, ScriptRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show more log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List scripts, favorites first
    List {
        /// Only show scripts whose name contains this text (any case)
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Launch a script by name
    Run { name: String },
    /// Set the scripts folder; prompts when PATH is omitted
    Root { path: Option<PathBuf> },
    /// Set the marker shown in front of favorites
    Marker { marker: String },
    /// Show click counts and the current favorite threshold
    Stats,
    /// Forget every recorded click
    Reset,
}

fn main() {
    let cli = Cli::parse();
    let _guard = asgard::logging::init(stderr_level(cli.verbose));
    if cli.verbose > 0 {
        eprintln!("Log file: {}", asgard::logging::log_path().display());
    }

    if let Err(e) = run(cli) {
        match e.downcast_ref::<AsgardError>() {
            Some(domain) => eprintln!("Error: {}", domain.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn stderr_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config();
    let percentile = config.percentile();
    let mut prefs = JsonPreferenceStore::open(config.preferences_path());
    let mut registry = ScriptRegistry::from_config(&config);

    let Some(command) = cli.command else {
        let settings = Settings::load(&prefs);
        if let Some(root) = &settings.root_directory {
            println!("Scripts folder: {}", root.display());
        }
        return list(&mut registry, &settings, percentile, None);
    };

    match command {
        Commands::List { query } => {
            let settings = Settings::load(&prefs);
            list(&mut registry, &settings, percentile, query.as_deref())
        }
        Commands::Run { name } => {
            let settings = Settings::load(&prefs);
            launch(&mut registry, &config, &settings, percentile, &name)
        }
        Commands::Root { path } => {
            let chosen = match path {
                Some(p) => Some(p),
                None => PromptDirectoryChooser::new(io::stdin().lock(), io::stderr())
                    .choose_directory(),
            };
            let Some(root) = chosen else {
                println!("Scripts folder unchanged");
                return Ok(());
            };
            if !root.is_dir() {
                return Err(AsgardError::NotFound { path: root }.into());
            }
            let root = root
                .canonicalize()
                .with_context(|| format!("Failed to resolve {}", root.display()))?;

            Settings::set_root_directory(&mut prefs, &root)?;
            println!("Scripts folder set to {}", root.display());
            list(&mut registry, &Settings::load(&prefs), percentile, None)
        }
        Commands::Marker { marker } => {
            Settings::set_favorite_marker(&mut prefs, &marker)?;
            println!("Favorite marker set to '{}'", marker);
            Ok(())
        }
        Commands::Stats => stats(&mut registry, &Settings::load(&prefs), percentile),
        Commands::Reset => {
            registry.reset_clicks()?;
            println!("Click data cleared");
            Ok(())
        }
    }
}

fn list(
    registry: &mut ScriptRegistry,
    settings: &Settings,
    percentile: Percentile,
    query: Option<&str>,
) -> Result<()> {
    if settings.root_directory.is_none() {
        println!("No scripts folder set. Run `asgard root <PATH>` first.");
        return Ok(());
    }
    registry.refresh_from_settings(settings, percentile)?;

    let view = registry.apply_filter(query);
    if view.is_empty() {
        println!("No scripts found");
        return Ok(());
    }
    print_view(&view, &settings.favorite_marker);
    Ok(())
}

fn print_view(view: &RegistryView, marker: &str) {
    let pad = " ".repeat(marker.chars().count());
    for script in &view.favorites {
        println!("{} {}", marker, script.name);
    }
    for script in &view.standard {
        println!("{} {}", pad, script.name);
    }
}

fn launch(
    registry: &mut ScriptRegistry,
    config: &Config,
    settings: &Settings,
    percentile: Percentile,
    name: &str,
) -> Result<()> {
    registry.refresh_from_settings(settings, percentile)?;
    let script = registry
        .find(name)
        .with_context(|| format!("No script named '{}'", name))?;

    let mut runner = CommandRunner::new(config.runner.clone());
    let outcome = registry.launch(&script, &mut runner)?;
    if let Some(e) = outcome.tracking_error {
        eprintln!("Warning: usage was not saved: {}", e.user_message());
    }
    Ok(())
}

fn stats(registry: &mut ScriptRegistry, settings: &Settings, percentile: Percentile) -> Result<()> {
    let favorites = registry
        .refresh_from_settings(settings, percentile)
        .warn_on_err()
        .filter(|_| settings.root_directory.is_some())
        .map(|view| view.favorites.len());
    let clicks = registry.load_clicks()?;

    let mut rows: Vec<(&str, u64)> = clicks.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (name, count) in &rows {
        println!("{:>6}  {}", count, name);
    }

    match favorite_threshold(clicks, percentile) {
        Some(t) => println!(
            "Threshold: {} clicks (top {:.0}% of {} tracked)",
            t,
            percentile.value() * 100.0,
            rows.len()
        ),
        None => println!("No clicks recorded yet"),
    }
    if let Some(n) = favorites {
        println!("Favorites: {}", n);
    }
    Ok(())
}
