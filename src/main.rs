//! cimgui-probe - Native Library Diagnostics
//!
//! Resolves the configured cimgui library the same way an application would
//! at startup, and reports what was bound.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cimgui_interop::config::{InteropConfig, PlatformChoice};
use cimgui_interop::dispatch::{Dispatcher, DispatcherBuilder, LayoutCheck, Platform};
use cimgui_interop::imgui::{self, ImGuiApi, ImGuiFunctions};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cimgui-probe")]
#[command(version)]
#[command(about = "Resolve and verify the native cimgui library", long_about = None)]
struct Cli {
    /// Config file (default: nearest cimgui.toml, else built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the library name
    #[arg(short, long, global = true)]
    library: Option<String>,

    /// Override the platform (auto, dynamic, embedded)
    #[arg(short, long, global = true, value_parser = parse_platform)]
    platform: Option<PlatformChoice>,

    /// Extra library search path (repeatable)
    #[arg(short = 'L', long = "search-path", global = true)]
    search_paths: Vec<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the library, bind every export and run the layout check
    Probe {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the address of every bound export
    Symbols,

    /// Print the effective configuration
    Config,
}

fn parse_platform(value: &str) -> Result<PlatformChoice, String> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Ok(PlatformChoice::Auto),
        "dynamic" => Ok(PlatformChoice::Dynamic),
        "embedded" => Ok(PlatformChoice::Embedded),
        other => Err(format!("unknown platform '{}' (expected auto, dynamic or embedded)", other)),
    }
}

#[derive(Serialize)]
struct ProbeReport {
    library: String,
    platform: Platform,
    version: String,
    symbols: usize,
    layout: LayoutCheck,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Probe { json } => cmd_probe(&config, json),
        Commands::Symbols => cmd_symbols(&config),
        Commands::Config => cmd_config(&config),
    }
}

fn load_config(cli: &Cli) -> Result<InteropConfig> {
    let mut config = match &cli.config {
        Some(path) => InteropConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => InteropConfig::load_from_cwd().context("Failed to load cimgui.toml")?,
    };

    if let Some(library) = &cli.library {
        config.library.name = library.clone();
    }
    if let Some(platform) = cli.platform {
        config.library.platform = platform;
    }
    // Command-line paths are searched first
    let mut search_paths = cli.search_paths.clone();
    search_paths.append(&mut config.library.search_paths);
    config.library.search_paths = search_paths;

    Ok(config)
}

fn build_dispatcher(config: &InteropConfig) -> Result<Dispatcher> {
    DispatcherBuilder::from_config(config)
        .require(ImGuiFunctions::SYMBOLS)
        .layouts(imgui::declared_layouts())
        .build()
        .with_context(|| {
            format!(
                "Failed to bind '{}' on the {} platform",
                config.library.name,
                config.platform()
            )
        })
}

fn cmd_probe(config: &InteropConfig, json: bool) -> Result<()> {
    let dispatcher = build_dispatcher(config)?;
    let api = ImGuiApi::load(&dispatcher).context("Failed to bind the ImGui function table")?;

    let report = ProbeReport {
        library: dispatcher.library_name().to_string(),
        platform: dispatcher.platform(),
        version: api.version(),
        symbols: dispatcher.symbols().len(),
        layout: dispatcher.layout_check(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Library:  {}", report.library);
    println!("Platform: {}", report.platform);
    println!("Version:  {}", report.version);
    println!("Symbols:  {} bound", report.symbols);
    match report.layout {
        LayoutCheck::Verified(checked) => println!("Layout:   {} structs verified", checked),
        LayoutCheck::Skipped => println!("Layout:   not checked (no size query export)"),
    }
    Ok(())
}

fn cmd_symbols(config: &InteropConfig) -> Result<()> {
    let dispatcher = build_dispatcher(config)?;
    for (name, address) in dispatcher.symbols().entries() {
        println!("{:<24} {}", name, address);
    }
    Ok(())
}

fn cmd_config(config: &InteropConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    print!("{}", text);
    println!("# resolved platform: {}", config.platform());
    Ok(())
}
