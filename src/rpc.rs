//! Alloy-backed RPC capability
//!
//! [`ProviderCaller`] submits a page of calls to a Multicall-compatible
//! aggregator through any alloy [`Provider`], using the `aggregate` entry
//! point:
//!
//! ```solidity
//! function aggregate((address target, bytes callData)[] calls)
//!     returns (uint256 blockNumber, bytes[] returnData);
//! ```
//!
//! Timeouts and retries are whatever the provider's transport is configured
//! with; this layer adds none.

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder, WsConnect},
    sol,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    errors::TransportError,
    traits::AggregateCaller,
    types::{AggregatedResponse, CallOptions},
    utils::error_utils::describe_revert,
};

sol! {
    #[sol(rpc)]
    interface IMulticall {
        struct Call {
            address target;
            bytes callData;
        }

        function aggregate(Call[] calldata calls)
            external
            payable
            returns (uint256 blockNumber, bytes[] memory returnData);
    }
}

/// [`AggregateCaller`] over an alloy provider
#[derive(Debug, Clone)]
pub struct ProviderCaller<P> {
    provider: P,
}

impl<P> ProviderCaller<P>
where
    P: Provider<Ethereum>,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl ProviderCaller<DynProvider> {
    /// Connect to an HTTP or WebSocket endpoint
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// use revest_multicall::rpc::ProviderCaller;
    /// let caller = ProviderCaller::connect("https://rpc.ftm.tools").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(rpc_url: &str) -> Result<Self, TransportError> {
        Ok(Self::new(connect(rpc_url).await?))
    }
}

/// Build a type-erased provider for `rpc_url`
///
/// URLs starting with `http` use the HTTP transport, anything else is treated
/// as a WebSocket endpoint.
pub async fn connect(rpc_url: &str) -> Result<DynProvider, TransportError> {
    let connect_error = |reason: String| TransportError::Connect {
        url: rpc_url.to_string(),
        reason,
    };

    let provider = if rpc_url.starts_with("http") {
        let url = rpc_url
            .parse::<Url>()
            .map_err(|e| connect_error(e.to_string()))?;
        ProviderBuilder::new().connect_http(url).erased()
    } else {
        ProviderBuilder::new()
            .connect_ws(WsConnect::new(rpc_url))
            .await
            .map_err(|e| connect_error(e.to_string()))?
            .erased()
    };
    Ok(provider)
}

#[async_trait]
impl<P> AggregateCaller for ProviderCaller<P>
where
    P: Provider<Ethereum> + Send + Sync,
{
    async fn aggregate_call(
        &self,
        multicall: Address,
        calls: Vec<(Address, Bytes)>,
        options: &CallOptions,
    ) -> Result<AggregatedResponse, TransportError> {
        let size = calls.len();
        let calls = calls
            .into_iter()
            .map(|(target, call_data)| IMulticall::Call { target, callData: call_data })
            .collect::<Vec<_>>();

        let aggregator = IMulticall::new(multicall, &self.provider);
        let mut request = aggregator.aggregate(calls);
        if let Some(block) = options.block {
            request = request.block(block);
        }
        if let Some(gas) = options.gas {
            request = request.gas(gas);
        }
        if let Some(from) = options.from {
            request = request.from(from);
        }

        debug!(%multicall, calls = size, "submitting aggregate call");
        let result = request.call().await.map_err(|e| match e.as_revert_data() {
            Some(data) => {
                let reason = describe_revert(&data);
                warn!(%multicall, %reason, "aggregate call reverted");
                TransportError::Reverted(reason)
            }
            None => {
                warn!(%multicall, error = %e, "aggregate call failed");
                TransportError::Rpc(e.to_string())
            }
        })?;

        Ok(AggregatedResponse {
            block_number: result.blockNumber.saturating_to::<u64>(),
            return_data: result.returnData,
        })
    }
}
