use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wayfarer_core::{AppMode, Config};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const LOG_ENV: &str = "WAYFARER_LOG";
const LOG_FILE: &str = "wayfarer.log";

#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(version, about = "Walk a pixel realm of portfolio stops and consult the AI oracle")]
struct Cli {
    /// Skip the mode screen: adventure or standard
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<AppMode>,

    /// Start in day theme
    #[arg(long)]
    day: bool,

    /// Gemini model to ask
    #[arg(long)]
    model: Option<String>,

    /// Write the effective config to disk and exit
    #[arg(long)]
    write_config: bool,
}

fn parse_mode(s: &str) -> Result<AppMode, String> {
    AppMode::from_str(s).ok_or_else(|| format!("unknown mode '{}' (adventure or standard)", s))
}

/// Logs go to a file so they never tear the alternate screen.
fn init_tracing() -> Result<()> {
    let dir = Config::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(mode) = cli.mode {
        config.default_mode = Some(mode);
    }
    if cli.day {
        config.night = false;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    if cli.write_config {
        let path = config.save()?;
        println!("{}", path.display());
        return Ok(());
    }

    init_tracing()?;
    info!(model = %config.model, key = ?config.key_source(), "starting wayfarer");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(&config);
    let mut events = EventHandler::new();
    app.replies = Some(events.sender());

    let result = async {
        loop {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            let Some(event) = events.next().await else { break };
            handler::handle_event(&mut app, event);

            if app.should_quit {
                break;
            }
        }
        anyhow::Ok(())
    }
    .await;

    app.shutdown();
    tui::restore()?;
    result
}
