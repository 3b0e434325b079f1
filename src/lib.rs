//! # Revest Multicall
//!
//! Batched, order-preserving read-only contract calls over JSON-RPC.
//!
//! ## Core Features
//!
//! - **Paginated Aggregation**
//!   - Calls split into contiguous pages of a bounded size
//!   - One on-chain `aggregate` round trip per page
//!   - Pages dispatched concurrently, optionally capped
//!
//! - **Ordered, Typed Results**
//!   - Result `i` always belongs to call `i`
//!   - Per-call decoding of heterogeneous return types
//!   - Outputs addressable by declared name
//!
//! - **All-or-Nothing Errors**
//!   - Encode, transport and decode failures fail the whole batch
//!   - No partial results, no hidden retries
//!
//! ## Features
//!
//! - `rustls-tls`: Uses rustls as the TLS implementation instead of native-tls (OpenSSL).
//!
//!   Usage example:
//!   ```toml
//!   [dependencies]
//!   revest-multicall = { version = "0.3", default-features = false, features = ["rustls-tls"] }
//!   ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use revest_multicall::{
//!     config::Networks,
//!     interface::ContractInterface,
//!     rpc::{connect, ProviderCaller},
//!     CallOptions, Multicall,
//! };
//! use alloy::{dyn_abi::DynSolValue, primitives::{address, U256}};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = connect("https://rpc.ftm.tools").await?;
//! let networks = Networks::default();
//! let (_, network) = networks.resolve(&provider).await?;
//! let multicall = Multicall::new(ProviderCaller::new(provider.clone()), network.multicall);
//!
//! let lqdr_revest = ContractInterface::parse([
//!     "function getAddressForFNFT(uint256 fnftId) view returns (address smartWallAdd)",
//! ])?;
//! let target = address!("b80f5a586bc247d993e6dbacd8add211ec6b0ca5");
//! let calls = (1..=1200u64)
//!     .map(|id| {
//!         let fnft_id = DynSolValue::Uint(U256::from(id), 256);
//!         lqdr_revest.call(target, "getAddressForFNFT", vec![fnft_id])
//!     })
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! // three round trips: 500 + 500 + 200
//! let wallets = multicall.aggregate(&calls, 500, &CallOptions::default()).await?;
//! for wallet in &wallets {
//!     println!("{:?}", wallet.get("smartWallAdd"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `multicall`: The paginated aggregator
//! - `types`: Call descriptors, options and results
//! - `traits`: RPC and ABI codec capabilities
//! - `codec`: Default ABI codec
//! - `rpc`: Alloy provider backed RPC capability
//! - `interface`: Human-readable ABI fragment sets
//! - `config`: Chain ID keyed network addresses
//! - `errors`: Error types and handling
//! - `utils`: Helper functions and utilities

pub mod types;
pub mod errors;
pub mod traits;
pub mod codec;
pub mod rpc;
pub mod interface;
pub mod config;
pub mod multicall;
pub mod utils;

// Re-export only the essential types and functions
pub use multicall::Multicall;
pub use types::{BatchOutput, CallDescriptor, CallOptions, DecodedResult, DEFAULT_PAGE_SIZE};
pub use traits::{AbiCodec, AggregateCaller};
pub use codec::DynAbiCodec;
pub use errors::AggregateError;
