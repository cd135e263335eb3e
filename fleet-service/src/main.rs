//! botfleet service
//!
//! - HTTP API over the orchestrator (default `serve` command)
//! - Startup schedules from a JSON file
//! - One-shot CLI: `run`, `history`, `bots`

use anyhow::{Context, Result};
use clap::Parser;
use fleet_bots::builtin_registry;
use fleet_http::{create_router, FleetState, HttpServer};
use fleet_orchestrator::{Orchestrator, OrchestratorConfig};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod startup;

#[derive(Parser, Debug)]
#[command(name = "botfleet")]
#[command(about = "Bot orchestrator: command dispatch, execution ledger and cron schedules")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Bind address (host:port)
    #[arg(short, long, env = "FLEET_BIND", default_value = fleet_http::server::DEFAULT_BIND)]
    bind: String,

    /// SQLite ledger URL (e.g. sqlite:///var/lib/botfleet/ledger.db); in-memory when absent
    #[arg(long, env = "FLEET_DATABASE_URL")]
    database: Option<String>,

    /// JSON file with schedules to register at startup
    #[arg(long)]
    schedules: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Disable CORS
    #[arg(long)]
    no_cors: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API and schedules (default)
    Serve,
    /// Execute one bot command and print the envelope
    Run {
        bot: String,
        command: String,
        /// Command params as a JSON document
        params: Option<String>,
    },
    /// Print the most recent ledger records
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// List the built-in bots and their commands
    Bots,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("fleet_service=info".parse()?)
        .add_directive("fleet_orchestrator=info".parse()?)
        .add_directive("fleet_http=info".parse()?)
        .add_directive("tower_http=debug".parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from $FLEET_ENV_FILE, /etc/botfleet/environment or .env
    let env_file = fleet_core::config::load_environment();

    let args = Args::parse();
    init_tracing(args.json)?;
    if let Some(path) = env_file {
        info!("Loaded environment from {}", path);
    }

    let ledger = startup::open_ledger(args.database.as_deref()).await?;
    let config = OrchestratorConfig::from_env().context("invalid orchestrator configuration")?;
    let orchestrator = Arc::new(Orchestrator::new(builtin_registry(), ledger, config).await?);

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(orchestrator, args.bind, args.schedules, !args.no_cors).await,
        Commands::Run {
            bot,
            command,
            params,
        } => {
            let params: Value = match params {
                Some(text) => serde_json::from_str(&text).context("params must be valid JSON")?,
                None => Value::Null,
            };
            let envelope = orchestrator.execute(&bot, &command, params).await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            if !envelope.success {
                anyhow::bail!("{}.{} failed", bot, command);
            }
            Ok(())
        }
        Commands::History { limit } => {
            let history = orchestrator.history(limit).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
            Ok(())
        }
        Commands::Bots => {
            println!("{}", serde_json::to_string_pretty(&orchestrator.bots())?);
            Ok(())
        }
    }
}

async fn serve(
    orchestrator: Arc<Orchestrator>,
    bind: String,
    schedules: Option<PathBuf>,
    cors: bool,
) -> Result<()> {
    info!("Starting botfleet service...");

    if let Some(path) = schedules {
        startup::install_schedules(&orchestrator, &path)?;
    }

    let server = HttpServer::builder()
        .bind(bind)
        .cors(cors)
        .router(create_router(FleetState::new(orchestrator.clone())))
        .build()?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let served = server.serve_with_shutdown(shutdown).await;
    orchestrator.shutdown().await;
    served?;

    info!("botfleet service stopped");
    Ok(())
}
