//! Tempus MCP server — entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use tempus_mcp::config::resolve_bind_addr;
use tempus_mcp::protocol::Dispatcher;
use tempus_mcp::session::SessionRegistry;
use tempus_mcp::tools;
use tempus_mcp::transport::HttpTransport;

#[derive(Parser)]
#[command(
    name = "tempus-mcp",
    about = "MCP time server — current time and timezone conversion over streamable HTTP",
    version
)]
struct Cli {
    /// Listen address (host:port).
    #[arg(long)]
    addr: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server over HTTP (default).
    Serve {
        /// Listen address (host:port).
        #[arg(long)]
        addr: Option<String>,

        /// Log level (trace, debug, info, warn, error).
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Print server capabilities and registered tools as JSON.
    Info,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        addr: None,
        log_level: None,
    }) {
        Commands::Serve { addr, log_level: _ } => {
            let effective_addr = addr.or(cli.addr);
            let bind_addr = resolve_bind_addr(effective_addr.as_deref());

            // Duplicate tool names are fatal here, at startup, never at
            // request time.
            let tool_registry = Arc::new(tools::default_registry()?);
            let sessions = Arc::new(SessionRegistry::new());
            let dispatcher = Arc::new(Dispatcher::new(sessions, tool_registry));

            tracing::info!("Tempus MCP time server");
            let transport = HttpTransport::new(dispatcher);
            transport.run(&bind_addr).await?;
        }

        Commands::Info => {
            let capabilities = tempus_mcp::types::InitializeResult::default_result();
            let tool_registry = tools::default_registry()?;
            let tool_list = tool_registry.list();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tool_list.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tool_list.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tempus-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
