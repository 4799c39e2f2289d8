use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use repo_guide_core::{Config, HttpBackend};
use tracing::{info, warn};

mod app;
mod handler;
mod headless;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "repo-guide", version)]
#[command(about = "Stream AI explanations of a GitHub repository and ask questions about it")]
struct Cli {
    /// Base URL of the analysis service
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log file for the interactive UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream explanations for a repository to stdout
    Analyze {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,
        /// Follow-up question to ask once the analysis completes (repeatable)
        #[arg(long = "ask")]
        questions: Vec<String>,
    },
    /// Ask a question about the most recently analyzed repository
    Ask {
        /// Your question
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let server_url = config.resolve_server_url(cli.server.as_deref());
    let backend = HttpBackend::new(&server_url);

    match cli.command {
        Some(Commands::Analyze { url, questions }) => {
            logging::init_stderr();
            if let Err(err) = Config::save_last_repo_url(&url) {
                warn!(error = %err, "could not remember repository url");
            }
            let mut out = std::io::stdout().lock();
            let ok = headless::analyze(&backend, &url, &questions, &mut out).await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { question }) => {
            logging::init_stderr();
            if !headless::ask(&backend, &question, &mut std::io::stdout().lock()).await? {
                std::process::exit(1);
            }
        }
        None => {
            let log_path = match cli.log_file {
                Some(path) => path,
                None => logging::default_log_path()?,
            };
            logging::init_file(&log_path)?;
            info!(server = %server_url, "starting interactive session");
            let mut app = App::new(server_url, config.last_repo_url);
            app.config_path = Config::config_path().ok();
            run_tui(app, backend).await?;
        }
    }

    Ok(())
}

async fn run_tui(mut app: App, backend: HttpBackend) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let tx = events.sender();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event, &backend, &tx)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
