//! Binary entry point for the wmcp-explorer MCP server.

use clap::Parser;
use rmcp::ServiceExt;
use wmcp_explorer::{ExplorerServer, config::ExplorerConfig, dispatch::Dispatcher};

/// Walrus MCP File Explorer — read-only, sandboxed exploration tools.
#[derive(Parser)]
#[command(name = "wmcp-explorer", version, about)]
struct Cli {
    /// Allowed directories. Defaults to the documents directory, the home
    /// directory and the current working directory.
    allowed_dirs: Vec<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }
    let cli = Cli::parse();
    let config = ExplorerConfig::new(cli.allowed_dirs);
    let dispatcher = Dispatcher::new(&config);
    let roots = dispatcher.sandbox().roots();
    if roots.is_empty() {
        return Err("none of the allowed directories could be resolved".into());
    }
    tracing::info!(?roots, "starting file explorer");

    let server = ExplorerServer::new(dispatcher);
    let transport = rmcp::transport::stdio();
    server.serve(transport).await?.waiting().await?;
    Ok(())
}
