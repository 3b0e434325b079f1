//! Fee-claim address lookup
//!
//! Resolves the smart-wallet address behind every open FNFT of the Liquid
//! Driver Revest wrapper with one paginated multicall, the read half of a
//! fee-claim run. FNFT IDs can be passed on the command line; without them,
//! the deposit and withdraw logs are scanned for FNFTs that are still locked.
//!
//! ```bash
//! RPC_URL=https://rpc.ftm.tools cargo run --example claim_addresses -- 17 18 19
//! ```

use std::collections::HashSet;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, U256},
    providers::{DynProvider, Provider},
    rpc::types::Filter,
    sol,
    sol_types::SolEvent,
};
use anyhow::{Context, Result};
use revest_multicall::{
    config::Networks,
    interface::ContractInterface,
    rpc::{connect, ProviderCaller},
    CallOptions, Multicall, DEFAULT_PAGE_SIZE,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_RPC_URL: &str = "https://rpc.ftm.tools";
const LQDR_REVEST: Address = address!("b80f5a586bc247d993e6dbacd8add211ec6b0ca5");
// first block with wrapper activity
const LQDR_REVEST_START_BLOCK: u64 = 32_894_036;

sol! {
    event DepositERC20OutputReceiver(address indexed mintTo, address indexed token, uint256 amountTokens, uint256 indexed fnftId, bytes extraData);
    event WithdrawERC20OutputReceiver(address indexed caller, address indexed token, uint256 amountTokens, uint256 indexed fnftId, bytes extraData);
}

/// FNFTs that were deposited and never withdrawn, in deposit order
async fn open_fnfts(provider: &DynProvider) -> Result<Vec<U256>> {
    let filter = Filter::new()
        .address(LQDR_REVEST)
        .from_block(LQDR_REVEST_START_BLOCK);

    let withdrawn = provider
        .get_logs(&filter.clone().event_signature(WithdrawERC20OutputReceiver::SIGNATURE_HASH))
        .await?
        .iter()
        .map(|log| Ok(log.log_decode::<WithdrawERC20OutputReceiver>()?.inner.data.fnftId))
        .collect::<Result<HashSet<_>>>()?;

    let deposits = provider
        .get_logs(&filter.event_signature(DepositERC20OutputReceiver::SIGNATURE_HASH))
        .await?;
    let mut open = Vec::with_capacity(deposits.len());
    for log in &deposits {
        let fnft_id = log.log_decode::<DepositERC20OutputReceiver>()?.inner.data.fnftId;
        if !withdrawn.contains(&fnft_id) {
            open.push(fnft_id);
        }
    }
    println!(
        "\t{} deposits, {} withdrawn, {} open",
        deposits.len(),
        withdrawn.len(),
        open.len()
    );
    Ok(open)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rpc_url = std::env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
    let requested = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<U256>()
                .with_context(|| format!("invalid FNFT id `{arg}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    println!("\t-----------------------------------------");
    println!("\tResolving FNFT wallets via {}", rpc_url);

    let provider = connect(&rpc_url).await?;
    let networks = Networks::default();
    let (chain_id, network) = networks.resolve(&provider).await?;
    println!("\tNetwork: {} (chain {})", network.name, chain_id);

    let fnft_ids = if requested.is_empty() {
        open_fnfts(&provider).await?
    } else {
        requested
    };

    let multicall = Multicall::new(ProviderCaller::new(provider), network.multicall);
    let lqdr = ContractInterface::parse([
        "function getAddressForFNFT(uint256 fnftId) view returns (address smartWallAdd)",
    ])?;
    let calls = fnft_ids
        .iter()
        .map(|id| {
            lqdr.call(
                LQDR_REVEST,
                "getAddressForFNFT",
                vec![DynSolValue::Uint(*id, 256)],
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let output = multicall
        .aggregate_with_blocks(&calls, DEFAULT_PAGE_SIZE, &CallOptions::default())
        .await?;

    for (id, result) in fnft_ids.iter().zip(&output.results) {
        match result.get("smartWallAdd") {
            Some(DynSolValue::Address(wallet)) => println!("FNFT {id:>6} -> {wallet}"),
            other => println!("FNFT {id:>6} -> unexpected {other:?}"),
        }
    }
    println!(
        "\t{} results over {} pages (blocks {:?})",
        output.results.len(),
        output.block_numbers.len(),
        output.block_numbers
    );
    Ok(())
}
