//! kaspad client CLI
//!
//! Entry point for the `kaspad-client` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use kaspad_client::protocol::RpcTransaction;
use kaspad_client::{
    ClientConfig, ClientError, ClientResult, ConfigError, EndpointOverrides, KaspadClient,
    MempoolFilter, Subscription,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kaspad-client")]
#[command(about = "Query and watch a kaspad node over RPC", version)]
struct Cli {
    /// Path to config file (default: ~/.config/kaspad-client/client.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Node host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Node RPC port (overrides config)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Connect over TLS (overrides config)
    #[arg(long, global = true)]
    tls: bool,

    /// Connection timeout in seconds (overrides config)
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node info
    Info,

    /// Show the network the node runs on
    Network,

    /// Show block DAG info
    DagInfo,

    /// Show the virtual selected parent blue score
    BlueScore,

    /// Show the fee estimate
    FeeEstimate,

    /// Show balances of addresses
    Balances {
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Show unspent outputs of addresses
    Utxos {
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Query the mempool (all entries, one transaction, or by address)
    Mempool {
        /// Look up a single transaction
        #[arg(long, conflicts_with = "address")]
        tx_id: Option<String>,

        /// Entries touching this address (repeatable)
        #[arg(long)]
        address: Vec<String>,

        /// Leave the orphan pool out
        #[arg(long)]
        exclude_orphans: bool,

        /// Leave the transaction pool out
        #[arg(long)]
        no_filter_transaction_pool: bool,
    },

    /// Show a block by hash
    Block {
        hash: String,

        /// Include the block's transactions
        #[arg(long)]
        transactions: bool,
    },

    /// Submit a transaction read from a JSON file
    Submit {
        file: PathBuf,

        /// Accept the transaction even if it is an orphan
        #[arg(long, conflicts_with = "replace")]
        allow_orphan: bool,

        /// Replace a conflicting mempool transaction
        #[arg(long)]
        replace: bool,
    },

    /// Print notifications until interrupted
    Watch {
        #[arg(value_enum)]
        kind: WatchKind,

        /// Address to watch (utxos only, repeatable)
        #[arg(long)]
        address: Vec<String>,

        /// Include accepted transaction ids (chain only)
        #[arg(long)]
        accepted_transaction_ids: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WatchKind {
    Blocks,
    Utxos,
    Chain,
    BlueScore,
    DaaScore,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kaspad_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = EndpointOverrides {
        host: cli.host,
        port: cli.port,
        tls: cli.tls.then_some(true),
        connect_timeout_seconds: cli.connect_timeout,
    };
    let config = ClientConfig::resolve(cli.config.as_deref(), &overrides)?;
    tracing::debug!(
        host = %config.endpoint.host,
        port = config.endpoint.port,
        tls = config.endpoint.tls,
        "resolved endpoint"
    );

    let client = KaspadClient::connect(&config.endpoint);

    match cli.command {
        Commands::Info => print_json(&client.get_info().await?),
        Commands::Network => print_json(&json!({ "network": client.get_current_network().await? })),
        Commands::DagInfo => print_json(&client.get_block_dag_info().await?),
        Commands::BlueScore => print_json(&json!({
            "blueScore": client.get_virtual_selected_parent_blue_score().await?
        })),
        Commands::FeeEstimate => print_json(&client.get_fee_estimate().await?),
        Commands::Balances { addresses } => {
            print_json(&client.get_balances_by_addresses(addresses).await?)
        }
        Commands::Utxos { addresses } => {
            print_json(&client.get_utxos_by_addresses(addresses).await?)
        }
        Commands::Mempool {
            tx_id,
            address,
            exclude_orphans,
            no_filter_transaction_pool,
        } => {
            let filter = MempoolFilter {
                include_orphan_pool: !exclude_orphans,
                filter_transaction_pool: !no_filter_transaction_pool,
            };
            match tx_id {
                Some(tx_id) => print_json(&client.get_mempool_entry_filtered(tx_id, filter).await?),
                None if !address.is_empty() => print_json(
                    &client
                        .get_mempool_entries_by_addresses_filtered(address, filter)
                        .await?,
                ),
                None => print_json(&client.get_mempool_entries_filtered(filter).await?),
            }
        }
        Commands::Block { hash, transactions } => {
            print_json(&client.get_block_by_hash(hash, transactions).await?)
        }
        Commands::Submit {
            file,
            allow_orphan,
            replace,
        } => {
            let content = std::fs::read_to_string(&file)?;
            let transaction: RpcTransaction = serde_json::from_str(&content)?;
            if replace {
                let (transaction_id, replaced) =
                    client.submit_transaction_replacement(transaction).await?;
                print_json(&json!({
                    "transactionId": transaction_id,
                    "replacedTransaction": replaced,
                }))
            } else {
                let transaction_id = client.submit_transaction(transaction, allow_orphan).await?;
                print_json(&json!({ "transactionId": transaction_id }))
            }
        }
        Commands::Watch {
            kind,
            address,
            accepted_transaction_ids,
        } => watch(&client, kind, address, accepted_transaction_ids).await,
    }
}

async fn watch(
    client: &KaspadClient,
    kind: WatchKind,
    addresses: Vec<String>,
    accepted_transaction_ids: bool,
) -> Result<(), CliError> {
    match kind {
        WatchKind::Blocks => print_events(client.notify_block_added().await?).await,
        WatchKind::Chain => {
            let subscription = client
                .notify_virtual_selected_parent_chain_changed(accepted_transaction_ids)
                .await?;
            print_events(subscription).await
        }
        WatchKind::BlueScore => {
            print_events(client.notify_virtual_selected_parent_blue_score_changed().await?).await
        }
        WatchKind::DaaScore => print_events(client.notify_virtual_daa_score_changed().await?).await,
        WatchKind::Utxos => {
            if addresses.is_empty() {
                return Err(CliError::Usage(
                    "watch utxos needs at least one --address".to_string(),
                ));
            }
            let subscription = client.notify_utxos_changed(addresses.clone()).await?;
            let watched = print_events(subscription).await;
            let stopped = client.stop_notifying_utxos_changed(addresses).await;
            finish_watch(watched, stopped)
        }
    }
}

/// Combine the outcome of a watch with its stop call.
///
/// The watch error wins; a stop failure after a failed watch is only logged.
fn finish_watch(watched: Result<(), CliError>, stopped: ClientResult<()>) -> Result<(), CliError> {
    match (watched, stopped) {
        (Err(e), Err(stop_error)) => {
            tracing::warn!(error = %stop_error, "failed to stop utxo notifications");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), stopped) => Ok(stopped?),
    }
}

/// Print events until the node ends the stream or the user interrupts
async fn print_events<T: Serialize>(mut subscription: Subscription<T>) -> Result<(), CliError> {
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            event = subscription.next() => match event {
                Some(event) => print_json(&event?)?,
                None => break,
            },
            result = &mut interrupted => {
                result?;
                tracing::info!(kind = subscription.kind(), "interrupted");
                subscription.cancel();
                break;
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaspad_client::protocol::RpcError;

    fn remote(message: &str) -> ClientError {
        ClientError::Remote(RpcError::new(message))
    }

    #[test]
    fn test_finish_watch_keeps_watch_error_over_stop_error() {
        let watched = Err(CliError::Client(remote("stream failed")));

        let err = finish_watch(watched, Err(remote("stop failed"))).unwrap_err();
        assert!(err.to_string().contains("stream failed"));
    }

    #[test]
    fn test_finish_watch_reports_stop_error_after_clean_watch() {
        let err = finish_watch(Ok(()), Err(remote("stop failed"))).unwrap_err();
        assert!(err.to_string().contains("stop failed"));
    }

    #[test]
    fn test_finish_watch_succeeds_when_both_succeed() {
        assert!(finish_watch(Ok(()), Ok(())).is_ok());
    }
}
