mod cli;
mod config;
mod error;
mod genesis;
mod logging;
mod rpc;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lisk_chain::AcceptAll;
use lisk_network::{NoPeerRequester, Transport};
use lisk_pool::{Broadcaster, TransactionPool, DEFAULT_BROADCAST_INTERVAL, DEFAULT_RELEASE_LIMIT};
use lisk_primitives::Block;
use lisk_processor::{Processor, ProcessorError};
use lisk_store::RocksDbStore;

use cli::{Cli, Command, StartArgs};
use config::Config;
use error::{ConfigError, NodeError};

/// Recently-included transaction ids the pool keeps around so a late
/// `getTransactions` poll can still surface a just-applied transaction.
const POOL_RECENTLY_INCLUDED_CAP: usize = 256;
const GET_TRANSACTIONS_MERGED_LIMIT: usize = 100;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(NodeError::Config(e)) => {
            eprintln!("configuration error: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("fatal error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<(), NodeError> {
    let Command::Start(args) = cli.command;
    start(&args).await
}

async fn start(args: &StartArgs) -> Result<(), NodeError> {
    let config = Config::load(args)?;
    logging::init(&config.log_level);
    tracing::info!(network_identifier = %config.network_identifier, data_dir = ?config.data_dir, "starting node");

    std::fs::create_dir_all(&config.data_dir).map_err(|e| ConfigError::DataDir(config.data_dir.clone(), e))?;
    // Leaked deliberately: this store and the processor built on it live for
    // the rest of the process, and the bus action handlers registered below
    // need a `'static` borrow to hand to the bus's `Box<dyn Fn + 'static>`.
    let kv: &'static RocksDbStore = Box::leak(Box::new(RocksDbStore::open(&config.data_dir)?));

    let bus = lisk_bus::Bus::new();
    let pool = Arc::new(TransactionPool::new(POOL_RECENTLY_INCLUDED_CAP));
    let processor =
        Arc::new(Processor::new(kv, bus.clone(), pool.clone(), config.confirmation_depth, Box::new(AcceptAll), Box::new(AcceptAll))?);
    processor.register_module(lisk_dpos::build())?;

    bootstrap_genesis(&processor, args).await?;
    rpc::register(bus.clone(), kv, processor.clone(), pool.clone())?;

    let broadcaster = Arc::new(Broadcaster::new(DEFAULT_RELEASE_LIMIT, DEFAULT_BROADCAST_INTERVAL));
    let _transport = Transport::new(&processor, pool.clone(), broadcaster.clone(), bus.clone(), Box::new(NoPeerRequester), GET_TRANSACTIONS_MERGED_LIMIT);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let broadcaster_task = tokio::spawn(broadcaster.clone().run(pool.clone(), bus.clone(), shutdown_rx));

    tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
    processor.stop();
    let _ = shutdown_tx.send(true);
    let _ = broadcaster_task.await;
    Ok(())
}

async fn bootstrap_genesis(processor: &Processor<'_>, args: &StartArgs) -> Result<(), NodeError> {
    match &args.genesis {
        Some(path) => {
            let genesis: Block = genesis::load(path)?;
            processor.init(&genesis).await?;
            Ok(())
        }
        None => {
            if processor.chain().is_initialized() {
                Ok(())
            } else {
                Err(NodeError::Config(ConfigError::NoGenesis))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_error_maps_to_fatal_not_config() {
        let err = NodeError::Processor(ProcessorError::NotFound);
        assert!(matches!(err, NodeError::Processor(_)));
    }
}
