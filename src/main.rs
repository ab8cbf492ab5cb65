use clap::{Parser, ValueEnum};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use health_assistant_client::{
    backend::{BackendClient, QueryBackend},
    config::{Config, LogFormat},
    orchestrator::QueryOrchestrator,
    render::{render_to_string, RenderOptions, Renderer, EXAMPLE_QUERIES},
};

/// Terminal client for the explainable health assistant.
#[derive(Parser, Debug)]
#[command(name = "health-assistant", version, about)]
struct Cli {
    /// Symptom description to submit. Starts an interactive session when omitted.
    query: Vec<String>,

    /// Backend base URL (overrides HEALTH_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in milliseconds (no timeout by default)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Show reasoning and supporting evidence
    #[arg(long)]
    explain: bool,

    /// Output format for one-shot queries
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level filter (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Print example queries and exit
    #[arg(long)]
    examples: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &cli);

    // Initialize logging
    init_logging(&config);

    if cli.examples {
        print_examples();
        return Ok(());
    }

    let client = match BackendClient::new(&config.backend, config.request.clone()) {
        Ok(c) => {
            info!(url = %c.query_url(), "Backend client initialized");
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize backend client");
            return Err(e.into());
        }
    };

    let mut orchestrator = QueryOrchestrator::new(client);
    let renderer = Renderer::new(RenderOptions {
        show_explanation: cli.explain,
    });

    if cli.query.is_empty() {
        run_interactive(&mut orchestrator, renderer).await
    } else {
        run_once(&mut orchestrator, &renderer, &cli.query.join(" "), cli.format).await
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.backend.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request.timeout_ms = Some(timeout_ms).filter(|ms| *ms > 0);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

async fn run_once<B: QueryBackend>(
    orchestrator: &mut QueryOrchestrator<B>,
    renderer: &Renderer,
    text: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let outcome = orchestrator.submit(text).await;
    info!(?outcome, "Query finished");

    let output = match format {
        OutputFormat::Text => render_to_string(renderer, orchestrator.snapshot()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(orchestrator.snapshot())?;
            format!("{}\n", json)
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

async fn run_interactive<B: QueryBackend>(
    orchestrator: &mut QueryOrchestrator<B>,
    mut renderer: Renderer,
) -> anyhow::Result<()> {
    println!("Describe your symptoms. Commands: :explain, :examples, :history, :quit");
    println!("AI responses can be inaccurate. Always consult a doctor for serious concerns.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":exit" => break,
            ":explain" => {
                let show = !renderer.options().show_explanation;
                renderer.set_show_explanation(show);
                println!("Reasoning and evidence {}.", if show { "shown" } else { "hidden" });
            }
            ":examples" => print_examples(),
            ":history" => print!("{}", render_to_string(&renderer, orchestrator.snapshot())),
            _ => ask(orchestrator, &renderer, &line).await?,
        }
        prompt()?;
    }

    info!(
        session_id = %orchestrator.store().session_id(),
        messages = orchestrator.snapshot().len(),
        "Session ended"
    );
    Ok(())
}

/// Run one query through the split lifecycle so the thinking indicator is
/// visible while the backend works.
async fn ask<B: QueryBackend>(
    orchestrator: &mut QueryOrchestrator<B>,
    renderer: &Renderer,
    text: &str,
) -> anyhow::Result<()> {
    let pending = match orchestrator.begin(text) {
        Ok(pending) => pending,
        Err(_) => return Ok(()),
    };

    let mut stdout = std::io::stdout();
    if let Some(message) = orchestrator.store().get(pending.pending_id()) {
        renderer.render_message(&mut stdout, message)?;
        stdout.flush()?;
    }

    let outcome = orchestrator.backend().query(pending.text()).await;
    let pending_id = pending.pending_id();
    orchestrator.settle(pending, outcome);

    if let Some(message) = orchestrator.store().get(pending_id) {
        renderer.render_message(&mut stdout, message)?;
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\n> ")?;
    stdout.flush()
}

fn print_examples() {
    println!("Try asking:");
    for example in EXAMPLE_QUERIES {
        println!("  {}", example);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
