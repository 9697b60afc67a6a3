use std::path::PathBuf;
use clap::{Parser, Subcommand};
use conn_context::config::watcher::{apply_updates, ConfigWatcher};
use conn_context::config::{load_config, ConfigError};
use conn_context::context::{reason, ConnectionId, ConnectionState, ServiceType};
use conn_context::observability::logging::init_logging;
use conn_context::{ContextRegistry, ProvisioningConfig};

#[derive(Parser)]
#[command(name = "ctxctl")]
#[command(about = "Inspect and exercise per-service connection contexts", long_about = None)]
struct Cli {
    /// Provisioning file (TOML).
    #[arg(short, long, default_value = "ctxctl.toml")]
    config: PathBuf,

    /// Override the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the provisioning file
    Validate,
    /// Provision every context and print its snapshot
    Show,
    /// Walk the candidate queue of one context
    Simulate {
        service_type: String,
        /// Number of leading candidates that fail permanently.
        #[arg(long, default_value_t = 0)]
        fail: usize,
    },
    /// Provision, then apply file changes until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("{}: invalid provisioning", cli.config.display());
            for e in errors {
                eprintln!("  - {}", e);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_logging(&level);

    match cli.command {
        Commands::Validate => {
            println!(
                "{}: OK ({} contexts, {} candidates)",
                cli.config.display(),
                config.contexts.len(),
                config.candidates.len()
            );
        }
        Commands::Show => {
            let registry = ContextRegistry::new(config);
            registry.provision();
            println!("{}", serde_json::to_string_pretty(&registry.snapshots()?)?);
        }
        Commands::Simulate { service_type, fail } => {
            simulate(config, ServiceType::from(service_type), fail)?;
        }
        Commands::Watch => {
            watch(config, cli.config).await?;
        }
    }

    Ok(())
}

fn simulate(
    config: ProvisioningConfig,
    service_type: ServiceType,
    fail: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ContextRegistry::new(config);
    registry.provision();

    let snapshot = registry.with_context(&service_type, |ctx| {
        ctx.set_enabled(true);
        ctx.set_reason(reason::DATA_ENABLED);
        if !ctx.is_ready() {
            tracing::info!(service_type = %service_type, "Context not ready, nothing to do");
            return ctx.snapshot();
        }

        let mut failed = 0;
        while let Some(candidate) = ctx.peek_next_candidate().cloned() {
            tracing::info!(service_type = %service_type, apn = %candidate.apn, "Trying candidate");
            ctx.set_active_candidate(Some(candidate));
            ctx.set_state(ConnectionState::Connecting);

            if failed < fail {
                failed += 1;
                ctx.decrement_failure_budget();
                ctx.dequeue_candidate();
                ctx.set_reason(reason::CANDIDATE_FAILED);
                if ctx.candidates_exhausted() {
                    ctx.set_state(ConnectionState::Failed);
                    break;
                }
                ctx.set_state(ConnectionState::Retrying);
                continue;
            }

            ctx.set_active_connection(Some(ConnectionId::new()));
            ctx.set_state(ConnectionState::Connected);
            break;
        }
        ctx.snapshot()
    })?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn watch(config: ProvisioningConfig, path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ContextRegistry::new(config);
    let added = registry.provision();
    tracing::info!(contexts = added.len(), "Contexts provisioned");

    let (watcher, updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;

    tokio::select! {
        applied = apply_updates(&registry, updates) => {
            tracing::info!(applied, "Provisioning watcher stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, exiting");
        }
    }

    Ok(())
}
