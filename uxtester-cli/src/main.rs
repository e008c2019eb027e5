//! Command-line UX critiques of screenshots via Gemini.

#![allow(clippy::print_stdout, clippy::print_stderr, reason = "CLI tool writes results and progress")]

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uxtester_core::logger::init_logger;
use uxtester_core::{load_config, ReqwestTransport, RequestOrchestrator, SessionStore};
use uxtester_types::{ClassifiedError, FallbackNotice, ProgressEvent};

mod images;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "UXTESTER_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model to prefer (see `uxtester models`)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Critique one screenshot, or compare two or three
    Analyze {
        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,
        /// Persona to role-play while testing
        #[arg(long)]
        persona: Option<String>,
        /// Situation the user is in
        #[arg(long)]
        situation: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a user persona from a keyword
    Persona { keyword: String },
    /// List candidate models in fallback order
    Models,
    /// Check connectivity and find a working model
    Check,
}

/// Surface a classified error with its safe message and code.
fn user_error(error: ClassifiedError) -> anyhow::Error {
    anyhow!("{} [{}]", error.user_message(), error.code())
}

fn print_progress(event: &ProgressEvent) {
    eprintln!("[{:>3}%] {}", event.percent, event.message);
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling...");
            token.cancel();
        }
    });
}

async fn connect(cli: &Cli, cancel: &CancellationToken) -> Result<RequestOrchestrator> {
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let transport = ReqwestTransport::new().context("building HTTP client")?;
    let session = Arc::new(SessionStore::in_memory(Duration::from_secs(config.session_idle_secs)));
    let mut orchestrator = RequestOrchestrator::new(config, Arc::new(transport), session);
    orchestrator.set_fallback_sink(|notice: &FallbackNotice| eprintln!("Note: {}", notice.reason));

    if let Some(model) = &cli.model {
        orchestrator.set_selected_model(model).map_err(user_error)?;
    }
    let api_key =
        cli.api_key.as_deref().context("no API key (pass --api-key or set UXTESTER_API_KEY)")?;
    let model = orchestrator.authenticate(api_key, cancel).await.map_err(user_error)?;
    info!("Using model {}", model);
    Ok(orchestrator)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger("warn").context("setting default subscriber failed")?;
    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match &cli.command {
        Commands::Analyze { images, persona, situation, json } => {
            let parts = images::load_images(images.as_slice())?;
            let mut orchestrator = connect(&cli, &cancel).await?;
            let request =
                orchestrator.critique_request(parts, persona.as_deref(), situation.as_deref());
            let mut sink = print_progress;
            let result =
                orchestrator.run(request, &mut sink, &cancel).await.map_err(user_error)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.content);
            }
        },
        Commands::Persona { keyword } => {
            let mut orchestrator = connect(&cli, &cancel).await?;
            let mut sink = print_progress;
            let persona = orchestrator
                .generate_persona(keyword, &mut sink, &cancel)
                .await
                .map_err(user_error)?;
            println!("{persona}");
        },
        Commands::Models => {
            for model in uxtester_core::GEMINI_MODELS {
                println!(
                    "{:<18} {:<18} speed={:<6} cost={:<6} {}",
                    model.id,
                    model.display_name,
                    format!("{:?}", model.speed).to_lowercase(),
                    format!("{:?}", model.cost).to_lowercase(),
                    model.description
                );
            }
        },
        Commands::Check => {
            let mut orchestrator = connect(&cli, &cancel).await?;
            let quality = orchestrator.network_quality(&cancel).await.map_err(user_error)?;
            println!("{}", serde_json::to_string_pretty(&quality)?);
            println!("{}", serde_json::to_string_pretty(&orchestrator.status())?);
            orchestrator.logout();
        },
    }

    Ok(())
}
