use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::EnableMouseCapture,
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use folio::event_source::TerminalEventSource;
use folio::main_app::{App, run_app_with_event_source};
use folio::panic_handler::{initialize_panic_handler, restore_terminal};
use folio::pdf::MupdfLoader;
use folio::settings;

/// A terminal PDF viewer with search highlighting
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// PDF file to open
    path: Option<PathBuf>,

    /// Write the log here instead of the config directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Read settings from this YAML file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level '{value}'"))
}

fn init_logging(args: &Args) -> Result<()> {
    let path = args.log_file.clone().unwrap_or_else(settings::default_log_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
    }

    WriteLogger::init(
        args.log_level,
        Config::default(),
        File::create(&path).with_context(|| format!("creating log file {}", path.display()))?,
    )?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("Starting folio");

    settings::load_settings(args.config.as_deref());
    let config = settings::viewer_config();
    let loader = Arc::new(MupdfLoader::new(config.highlight_style));

    let mut app = App::new(loader, config);
    if let Some(path) = &args.path {
        app.open_document(&path.to_string_lossy());
    }

    initialize_panic_handler();

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_with_event_source(&mut terminal, &mut app, &mut TerminalEventSource);

    drop(terminal);
    restore_terminal();

    if let Err(err) = res {
        error!("Application error: {err:?}");
        eprintln!("{err:?}");
    }

    info!("Shutting down folio");
    Ok(())
}
