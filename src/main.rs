use anyhow::{Context, Result};
use tdl::cli::{Args, ConfigDiscovery, ConsoleUi, ExecutionMode, InteractiveConfig, TdlConfig};
use tdl::{Interpreter, Storage, TaskListManager};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mode = args.mode();

    // Initialize logging on stderr so stdout only carries the conversation
    let verbose = matches!(&mode, ExecutionMode::Interactive(config) if config.verbose);
    let default_filter = if verbose { "tdl=debug" } else { "tdl=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match mode {
        ExecutionMode::Interactive(config) => run_interactive_mode(config).await,
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            Ok(())
        }
    }
}

async fn run_interactive_mode(config: InteractiveConfig) -> Result<()> {
    let tdl_config = match &config.config_override {
        Some(path) => {
            info!("Loading configuration override from: {:?}", path);
            TdlConfig::from_toml_file(path)?
        }
        None => ConfigDiscovery::discover_config()?,
    };

    let workspace = std::env::current_dir().context("Failed to determine working directory")?;
    let data_file = config
        .data_file
        .clone()
        .unwrap_or_else(|| tdl_config.data_file_path(&workspace));

    // Reload saved tasks before any input is accepted
    let storage = Storage::new(data_file, tdl_config.storage_config());
    info!("Using save file: {}", storage.path().display());
    let mut manager = TaskListManager::new();
    manager.extend(storage.load().await);

    println!("tdl is running in the folder: {}", workspace.display());

    let mut console = ConsoleUi::stdout();
    if tdl_config.show_banner && !config.no_banner {
        console.welcome().context("Failed to write to stdout")?;
    }

    let mut interpreter = Interpreter::new(manager, console).with_storage(storage);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    interpreter.run(stdin).await?;

    info!("Session ended with {} tasks", interpreter.manager().len());
    Ok(())
}
