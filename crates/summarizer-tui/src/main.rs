use std::fs::OpenOptions;
use std::io::Read;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use summarizer_core::form::TextInput;
use summarizer_core::{Config, FormParts, HttpSummaryClient, InteractionController, SummaryLength};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, Settings};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "summarize")]
#[command(about = "Summarize text with a remote summarization service")]
struct Cli {
    /// Summarize endpoint URL (overrides SUMMARIZE_URL and the config file)
    #[arg(short, long)]
    url: Option<String>,
    /// Summary length: short, medium or long
    #[arg(short, long, value_parser = parse_length)]
    length: Option<SummaryLength>,
    /// Read text from stdin, print the result and exit
    #[arg(short, long)]
    print: bool,
}

fn parse_length(s: &str) -> Result<SummaryLength, String> {
    SummaryLength::from_str(s).ok_or_else(|| format!("expected short, medium or long, got '{}'", s))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The terminal owns stderr while the TUI runs, so logs go to a file.
fn init_file_logging() -> Result<()> {
    let path = Config::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(cli: &Cli, config: &Config) -> Result<Settings> {
    Ok(Settings {
        summarize_url: config.resolve_url(cli.url.as_deref()),
        length: config.resolve_length(cli.length),
        client: HttpSummaryClient::with_timeout(config.timeout())?,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let settings = resolve_settings(&cli, &config)?;

    if cli.print {
        init_stderr_logging();
        return print_once(settings).await;
    }

    if let Err(err) = init_file_logging() {
        eprintln!("Logging disabled: {}", err);
    }
    info!(url = %settings.summarize_url, "starting summarizer");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let year = chrono::Local::now().year();
    let mut app = App::new(settings, year);
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result.map(|_| ExitCode::SUCCESS)
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

/// One submission through the same controller the TUI uses.
async fn print_once(settings: Settings) -> Result<ExitCode> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let mut parts = FormParts::complete(Some(settings.summarize_url), settings.length);
    parts.input = Some(TextInput::with_value(&text));

    let Some(controller) = InteractionController::bind(parts, Arc::new(settings.client))
    else {
        anyhow::bail!("summarizer form could not be bound");
    };
    let outcome = controller.submit().await;
    info!(?outcome, "submission finished");

    let state = controller.form().lock();
    match state.output.message() {
        Some(message) if message.is_error() => {
            eprintln!("{}", message.text());
            Ok(ExitCode::FAILURE)
        }
        Some(message) => {
            println!("{}", message.text());
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}
