use clap::{Parser, Subcommand};
use sfmcp_salesforce::{SalesforceClient, SalesforceConfig, load_env_file};
use sfmcp_server::{Dispatcher, McpServer, shutdown_signal};
use sfmcp_tools::ToolRegistry;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod logging;

use logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "sfmcp", version)]
#[command(about = "Salesforce MCP server - SOQL, Tooling API, describe and metadata over stdio")]
struct Cli {
    /// Load environment variables from this file (default: ./.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `sfmcp_server=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log record format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Serve MCP on stdin/stdout (default)
    Serve,
    /// Print the tool catalog as JSON and exit
    Tools,
}

/// How long a pending stdin read may hold up process exit after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Loaded before logging so RUST_LOG may come from the file
    let env_file = load_env_file(cli.env_file.as_deref());

    logging::init(cli.log_level.as_deref(), cli.log_format);

    match env_file {
        Ok(Some(path)) => info!(path = %path.display(), "Loaded environment file"),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to load environment file");
            return ExitCode::FAILURE;
        }
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Tools => print_tools(),
        Commands::Serve => {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(error = %e, "Failed to start async runtime");
                    return ExitCode::FAILURE;
                }
            };

            let code = runtime.block_on(serve());
            // stdin is read on a blocking thread that never sees the signal
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            code
        }
    }
}

fn print_tools() -> ExitCode {
    match serde_json::to_string_pretty(&ToolRegistry::standard().list()) {
        Ok(catalog) => {
            println!("{catalog}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize tool catalog");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> ExitCode {
    let config = match SalesforceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        login_url = %config.login_url,
        api_version = %config.api_version,
        request_timeout_secs = config.request_timeout.as_secs(),
        session_policy = ?config.session_policy,
        username = %config.credentials.username(),
        "Configuration loaded"
    );

    let client = match SalesforceClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Salesforce client");
            return ExitCode::FAILURE;
        }
    };

    let policy = client.session_policy();
    let dispatcher = Dispatcher::new(ToolRegistry::standard(), Arc::new(client), policy);
    let server = McpServer::new(dispatcher);

    tokio::select! {
        result = server.serve_stdio() => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "MCP server stopped with an error");
                ExitCode::FAILURE
            }
        },
        () = shutdown_signal() => {
            info!("MCP server stopped");
            ExitCode::SUCCESS
        }
    }
}
