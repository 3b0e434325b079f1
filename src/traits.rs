//! Capability traits the aggregator is built on
//!
//! This module provides the two seams between the batching logic and the
//! outside world:
//! - `AbiCodec`: encodes calls and decodes their raw return bytes
//! - `AggregateCaller`: submits one page of calls to an on-chain aggregator
//!
//! Default implementations live in [`crate::codec`] and [`crate::rpc`];
//! tests swap in in-memory doubles.

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::Function,
    primitives::{Address, Bytes},
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    errors::{CodecError, TransportError},
    types::{AggregatedResponse, CallOptions},
};

/// ABI encoding capability
///
/// Called once per call before dispatch and once per result after it.
/// Implementations must be pure: the same input always yields the same
/// output.
pub trait AbiCodec: Send + Sync {
    /// Encode selector and arguments into call data
    fn encode_call(&self, function: &Function, args: &[DynSolValue]) -> Result<Bytes, CodecError>;

    /// Decode raw return bytes against the function's outputs
    fn decode_result(
        &self,
        function: &Function,
        raw: &[u8],
    ) -> Result<Vec<DynSolValue>, CodecError>;
}

/// RPC capability for one aggregated read
///
/// Implementors own timeouts and retries; whatever error they finally return
/// fails the whole batch.
#[async_trait]
pub trait AggregateCaller: Send + Sync {
    /// Execute `calls` through the aggregator contract at `multicall`
    ///
    /// # Arguments
    /// * `multicall` - Address of the on-chain aggregator
    /// * `calls` - `(target, call data)` pairs, in submission order
    /// * `options` - Block/gas/sender overrides, forwarded as-is
    ///
    /// # Returns
    /// The block number and one raw return value per call, in submission order
    async fn aggregate_call(
        &self,
        multicall: Address,
        calls: Vec<(Address, Bytes)>,
        options: &CallOptions,
    ) -> Result<AggregatedResponse, TransportError>;
}

#[async_trait]
impl<T: AggregateCaller + ?Sized> AggregateCaller for Arc<T> {
    async fn aggregate_call(
        &self,
        multicall: Address,
        calls: Vec<(Address, Bytes)>,
        options: &CallOptions,
    ) -> Result<AggregatedResponse, TransportError> {
        (**self).aggregate_call(multicall, calls, options).await
    }
}

#[async_trait]
impl<T: AggregateCaller + ?Sized> AggregateCaller for &T {
    async fn aggregate_call(
        &self,
        multicall: Address,
        calls: Vec<(Address, Bytes)>,
        options: &CallOptions,
    ) -> Result<AggregatedResponse, TransportError> {
        (**self).aggregate_call(multicall, calls, options).await
    }
}
