use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use imagechat::app_state::App;
use imagechat::chat::{ChatContainer, TurnOutcome};
use imagechat::constants;
use imagechat::events::{handle_key_event, handle_mouse_event};
use imagechat::input::InputWidget;
use imagechat::ui::draw_ui;
use imagechat::{AnalysisClient, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Analysis endpoint that receives the prompt and image.
    #[arg(long, global = true, env = "IMAGECHAT_ENDPOINT", default_value = constants::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "IMAGECHAT_TIMEOUT_SECS", default_value_t = constants::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Log file used by the interactive chat.
    #[arg(long, global = true, env = "IMAGECHAT_LOG_FILE", default_value = constants::DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Open the interactive chat in the terminal.
    Chat,
    /// Send a single prompt (and optional image) and print the reply.
    Ask {
        /// Question or instruction for the analysis service.
        #[arg(default_value = "")]
        prompt: String,
        /// Image file to attach.
        #[arg(long, short)]
        image: Option<PathBuf>,
    },
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(constants::DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (IMAGECHAT_ENDPOINT and friends)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::new(&cli.endpoint, cli.timeout_secs, cli.log_file.clone())
        .context("Invalid configuration")?;

    match cli.command {
        Commands::Chat => run_chat(config).await,
        Commands::Ask { prompt, image } => {
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(env_filter())
                .init();
            run_ask(config, prompt, image).await
        }
    }
}

async fn run_ask(config: Config, prompt: String, image: Option<PathBuf>) -> Result<()> {
    info!(endpoint = %config.endpoint, "Running one-shot analysis");
    let client = AnalysisClient::from_config(&config).context("Failed to create analysis client")?;

    let mut input = InputWidget::new();
    input.set_text(&prompt);
    if let Some(path) = image {
        input
            .select_image(&path)
            .await
            .with_context(|| format!("Cannot attach {}", path.display()))?;
    }
    let Some(submission) = input.submit() else {
        bail!("Nothing to send: provide a prompt or an image");
    };

    let mut chat = ChatContainer::new();
    let outcome = chat
        .send_message(&client, &submission.text, submission.image)
        .await
        .context("Turn was not started")?;

    let reply = chat
        .messages()
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();

    match outcome {
        TurnOutcome::Resolved => {
            println!("{}", reply);
            Ok(())
        }
        TurnOutcome::Failed | TurnOutcome::Stale => {
            eprintln!("{}", reply);
            bail!(constants::NOTICE_REQUEST_FAILED)
        }
    }
}

fn init_file_logging(log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .context("Log file path has no file name")?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(env_filter())
        .init();
    Ok(guard)
}

async fn run_chat(config: Config) -> Result<()> {
    let _guard = init_file_logging(&config.log_file)?;
    info!(endpoint = %config.endpoint, "Starting image chat TUI");

    let client = AnalysisClient::from_config(&config).context("Failed to create analysis client")?;
    let mut app = App::new(client);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Chat loop exited with error");
    }
    info!("Image chat TUI stopped");
    res
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Apply finished requests and previews
        app.process_events();
        app.on_tick();

        terminal.draw(|f| draw_ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(app, key).await? {
                        return Ok(());
                    }
                }
                Event::Paste(data) => app.paste(&data).await,
                Event::Mouse(mouse) => {
                    handle_mouse_event(app, mouse.kind)?;
                }
                _ => {}
            }
        }
    }
}
