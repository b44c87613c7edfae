use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stepdeck::api::{create_router, AppState};
use stepdeck::config::Config;
use stepdeck::registry::Registry;

#[derive(Parser)]
#[command(name = "stepdeck")]
#[command(about = "Copy-paste step catalog for workflow automation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the catalog API server
    Server {
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory holding registry.json and step sources
        #[arg(long)]
        root: Option<String>,
    },
    /// Inspect catalog steps
    Steps {
        #[command(subcommand)]
        action: StepActions,
    },
    /// Catalog maintenance and checks
    Registry {
        #[command(subcommand)]
        action: RegistryActions,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
enum StepActions {
    /// List all steps with category and integrations
    List,
    /// Show full detail for one step
    Show {
        /// Step name, e.g. send-slack-message
        name: String,
    },
}

#[derive(Subcommand)]
enum RegistryActions {
    /// Verify the manifest parses and every step source file exists
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "stepdeck=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { port, root } => cmd_server(port, root.as_deref()).await?,
        Commands::Steps { action } => match action {
            StepActions::List => cmd_steps_list()?,
            StepActions::Show { name } => cmd_steps_show(&name)?,
        },
        Commands::Registry { action } => match action {
            RegistryActions::Check => cmd_registry_check()?,
        },
        Commands::Completions { shell } => cmd_completions(shell)?,
    }

    Ok(())
}

fn load_registry(root: Option<&str>) -> anyhow::Result<Registry> {
    let config = Config::load();
    let root = root
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| config.catalog_root());
    Ok(Registry::load(root)?)
}

async fn cmd_server(port: Option<u16>, root: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load();
    let port = port.unwrap_or(config.server.port);
    let registry = load_registry(root)?;

    tracing::info!(
        steps = registry.manifest().items.len(),
        root = %registry.root().display(),
        "loaded step catalog"
    );

    let state = AppState {
        registry: Arc::new(registry),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("stepdeck API listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn cmd_steps_list() -> anyhow::Result<()> {
    let registry = load_registry(None)?;
    for step in registry.steps() {
        println!(
            "{:<32} {:<14} [{}]",
            step.name,
            step.category.as_str(),
            step.integrations.join(", ")
        );
    }
    Ok(())
}

fn cmd_steps_show(name: &str) -> anyhow::Result<()> {
    let registry = load_registry(None)?;
    match registry.detail(name) {
        Some(detail) => {
            println!("{}", serde_json::to_string_pretty(&detail)?);
            Ok(())
        }
        None => anyhow::bail!("Step not found: {}", name),
    }
}

fn cmd_registry_check() -> anyhow::Result<()> {
    let registry = load_registry(None)?;
    let mut missing = 0;
    for step in &registry.manifest().items {
        for file in &step.files {
            let path = registry.root().join(&file.path);
            if !path.exists() {
                eprintln!("{}: missing file {}", step.name, file.path);
                missing += 1;
            }
        }
    }
    if missing > 0 {
        anyhow::bail!("{} missing step source file(s)", missing);
    }
    println!(
        "ok: {} steps, all source files present",
        registry.manifest().items.len()
    );
    Ok(())
}

fn cmd_completions(shell: CompletionShell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
    };
    generate(shell, &mut cmd, "stepdeck", &mut std::io::stdout());
    Ok(())
}
