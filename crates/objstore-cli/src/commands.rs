use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use objstore_core::LatticeObjectStore;
use objstore_kvs::InMemoryKvs;
use objstore_server::{ObjstoreServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Config => {
            println!("{}", render_config(&config, cli.format)?);
            Ok(())
        }
    }
}

/// Load the config file if one was given, otherwise use the defaults.
pub fn resolve_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let kvs = InMemoryKvs::new();
    let store = LatticeObjectStore::new(kvs.client(), config.kvs.clone());
    println!(
        "{} objstore serving on {} (node {}, in-memory KVS)",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.kvs.node_id
    );

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(async move {
        let server = ObjstoreServer::new(config, Arc::new(store));
        server.serve(shutdown_signal()).await
    })?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

pub fn render_config(config: &ServerConfig, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Text => {
            let kvs = &config.kvs;
            let timeout = match kvs.correlator.request_timeout_ms {
                0 => "disabled".to_string(),
                ms => format!("{ms}ms"),
            };
            let lines = [
                format!("{} {}", "bind_addr:".bold(), config.bind_addr.to_string().cyan()),
                format!("{} {}", "request_timeout:".bold(), timeout),
                format!(
                    "{} {}",
                    "unavailable_retries:".bold(),
                    kvs.correlator.unavailable_retries
                ),
                format!(
                    "{} {}",
                    "on_id_mismatch:".bold(),
                    format!("{:?}", kvs.correlator.on_id_mismatch).to_lowercase().yellow()
                ),
                format!("{} {}", "node_id:".bold(), kvs.node_id),
            ];
            Ok(lines.join("\n"))
        }
    }
}
