//! `hint-cli`: ask the hint bot about the definition at a position in a
//! file on disk.
//!
//! ```bash
//! hint-cli --file hw03.py --line 12 --email me@berkeley.edu --key "$FE_KEY"
//! ```

use std::{
    io::{BufRead, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use colored::Colorize;
use function_locator::{Position, SnapshotEditor};
use hint_client::{
    ClientConfig, ClientError, DEFAULT_SERVER, ErrorNotice, FeedbackPrompt, HelpClient, HelpRoute,
    InProgressFlag, JsonFileHistoryStore, Orchestrator, ProgressIndicator, SessionContext,
};
use hint_protocol::Feedback;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hint-cli")]
#[command(about = "Ask for a Socratic hint about the function under the cursor", long_about = None)]
#[command(version)]
struct Cli {
    /// Source file; its name must contain `hw<N>`
    #[arg(long)]
    file: PathBuf,

    /// Cursor line (1-based)
    #[arg(long)]
    line: usize,

    /// Cursor column (1-based)
    #[arg(long, default_value_t = 1)]
    column: usize,

    /// Specific question for the tutor
    #[arg(long)]
    query: Option<String>,

    /// Student email sent as identity
    #[arg(long, env = "HINT_BOT_EMAIL")]
    email: String,

    /// Allow the exchange to be used for research
    #[arg(long)]
    consent: bool,

    /// Backend base URL
    #[arg(long, env = "HINT_BOT_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Shared key expected by the backend
    #[arg(long, env = "FE_KEY")]
    key: String,

    /// History file for this workspace
    #[arg(long, default_value = ".61a-bot/history.json")]
    state: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// Terminal stand-ins for the editor's notification widgets.
struct Terminal;

impl ProgressIndicator for Terminal {
    fn start(&self, title: &str) {
        eprintln!("{}", title.dimmed());
    }

    fn finish(&self) {}
}

#[async_trait]
impl FeedbackPrompt for Terminal {
    async fn ask(&self, output: &str) -> Option<Feedback> {
        println!("\n{}\n", output.bold());
        print!("{} ", "Was this helpful? [y/N]".cyan());
        std::io::stdout().flush().ok()?;

        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await
        .ok()?
        .ok()?;

        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Feedback::Helpful),
            "n" | "no" => Some(Feedback::NotHelpful),
            _ => None,
        }
    }
}

impl ErrorNotice for Terminal {
    fn show(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let text = tokio::fs::read_to_string(&cli.file)
        .await
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let cursor = Position::new(cli.line.saturating_sub(1), cli.column.saturating_sub(1));
    let editor = SnapshotEditor::new(cli.file.to_string_lossy(), text, cursor);

    let client = HelpClient::new(
        ClientConfig::new(cli.server, cli.key)
            .with_route(HelpRoute::Cli)
            .with_timeout(Duration::from_secs(cli.timeout_secs)),
    );
    let terminal = Arc::new(Terminal);
    let session = SessionContext {
        identity: cli.email,
        consent: cli.consent,
        in_progress: InProgressFlag::default(),
        history: Arc::new(JsonFileHistoryStore::new(cli.state)),
        client,
        progress: terminal.clone(),
        feedback: terminal.clone(),
        errors: terminal,
    };

    match Orchestrator::default()
        .get_help(&session, &editor, cli.query)
        .await
    {
        Ok(outcome) if outcome.response.request_id.is_empty() => {
            anyhow::bail!("no hint issued")
        }
        Ok(_) => Ok(()),
        Err(ClientError::UnresolvableUnit { .. }) => std::process::exit(2),
        Err(e) => Err(e.into()),
    }
}
