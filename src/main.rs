use std::fs::File;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use math_agent::core::agent::{Agent, AgentSettings};
use math_agent::core::config::{self, CliOverrides};
use math_agent::core::tools::default_registry;
use math_agent::inference::OpenRouterProvider;
use math_agent::{repl, web};

#[derive(Parser)]
#[command(
    name = "math-agent",
    about = "Math tutoring assistant for secondary school exam preparation"
)]
struct Args {
    /// Log level for math-agent.log (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: LevelFilter,

    /// Model to use (overrides MATH_AGENT_MODEL and the config file)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Ask questions at an interactive prompt (default)
    Repl,
    /// Serve the browser chat UI
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8501
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - stdout belongs to the REPL
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("math-agent.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    if let Err(e) = run(args).await {
        error!("Fatal: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let command = args.command.unwrap_or(Command::Repl);
    let cli = CliOverrides {
        model: args.model,
        bind: match &command {
            Command::Serve { bind } => bind.clone(),
            Command::Repl => None,
        },
    };

    let file_config = config::load_config()?;
    let resolved = config::resolve(&file_config, &cli);
    let api_key = resolved.api_key()?.to_string();

    info!(
        "Math Agent starting: model={}, base_url={}",
        resolved.model_name, resolved.openrouter_base_url
    );

    let provider = Arc::new(OpenRouterProvider::new(
        api_key,
        Some(resolved.openrouter_base_url.clone()),
    ));
    let registry = Arc::new(default_registry()?);
    info!("Catalog ready: {} operations", registry.len());
    let agent = Agent::new(provider, registry, AgentSettings::from(&resolved));

    match command {
        Command::Repl => repl::run(&agent).await?,
        Command::Serve { .. } => web::serve(agent, &resolved.web_bind).await?,
    }
    Ok(())
}
