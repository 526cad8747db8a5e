use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "larkbridge")]
#[command(about = "Feishu/Lark event-callback bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Connect to the event push service and serve the registered handlers.
    Run {
        /// Dotenv file to load credentials from (default: ./.env when present)
        #[arg(long, value_name = "PATH")]
        env_file: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("larkbridge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run { env_file }) => {
            if let Err(e) = run_bridge(env_file).await {
                log::error!("bridge failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

/// Load credentials, bind the default handlers, and block on the event loop.
/// Returning at all means the connection is gone.
async fn run_bridge(env_file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let config = match env_file {
        Some(path) => lib::config::AppConfig::from_env_file(&path)?,
        None => lib::config::AppConfig::from_env()?,
    };
    let dispatcher = lib::handlers::default_dispatcher();
    log::info!("starting event bridge");
    let client = lib::ws::WsClient::new(&config, dispatcher);
    client.start().await
}
