//! Paginated batch calls through an on-chain aggregator
//!
//! [`Multicall`] turns N independent read-only calls into
//! `ceil(N / page_size)` aggregate round trips and hands back one decoded
//! result per call, in input order.
//!
//! Key properties:
//! - Pages are contiguous slices of the input and are dispatched concurrently
//! - Output order depends only on input order, never on completion order
//! - All or nothing: any encode, transport or decode failure fails the batch
//! - No retries and no state; one instance can serve concurrent batches

use alloy::primitives::{Address, Bytes};
use futures::{stream, StreamExt};
use tracing::{debug, warn};

use crate::{
    codec::DynAbiCodec,
    errors::AggregateError,
    traits::{AbiCodec, AggregateCaller},
    types::{
        AggregatedResponse, BatchOutput, CallDescriptor, CallOptions, DecodedResult, PagePlan,
        DEFAULT_PAGE_SIZE,
    },
};

/// Batch call aggregator
///
/// # Example
/// ```no_run
/// use revest_multicall::{
///     Multicall, CallDescriptor, CallOptions,
///     config::MULTICALL3_ADDRESS,
///     rpc::ProviderCaller,
/// };
/// use alloy::primitives::address;
///
/// # async fn example() -> anyhow::Result<()> {
/// let caller = ProviderCaller::connect("https://eth.llamarpc.com").await?;
/// let multicall = Multicall::new(caller, MULTICALL3_ADDRESS);
///
/// let usdc = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// let calls = vec![
///     CallDescriptor::new(usdc, "function symbol() view returns (string)", vec![])?,
///     CallDescriptor::new(usdc, "function decimals() view returns (uint8)", vec![])?,
/// ];
/// let results = multicall.aggregate(&calls, 500, &CallOptions::default()).await?;
/// assert_eq!(results.len(), calls.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Multicall<C, D = DynAbiCodec> {
    caller: C,
    codec: D,
    address: Address,
    page_size: usize,
    max_concurrent_pages: Option<usize>,
}

impl<C> Multicall<C, DynAbiCodec>
where
    C: AggregateCaller,
{
    /// Aggregator at `address` using the standard ABI codec
    pub fn new(caller: C, address: Address) -> Self {
        Self {
            caller,
            codec: DynAbiCodec,
            address,
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrent_pages: None,
        }
    }
}

impl<C, D> Multicall<C, D>
where
    C: AggregateCaller,
    D: AbiCodec,
{
    /// Swap the ABI codec
    pub fn with_codec<E: AbiCodec>(self, codec: E) -> Multicall<C, E> {
        Multicall {
            caller: self.caller,
            codec,
            address: self.address,
            page_size: self.page_size,
            max_concurrent_pages: self.max_concurrent_pages,
        }
    }

    /// Page size used by [`Multicall::aggregate_default`]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Cap the number of pages in flight at once (unbounded by default)
    pub fn with_max_concurrent_pages(mut self, limit: usize) -> Self {
        self.max_concurrent_pages = Some(limit.max(1));
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// Execute `calls` in pages of at most `page_size`
    ///
    /// # Arguments
    /// * `calls` - Calls to execute; may be empty
    /// * `page_size` - Maximum calls per aggregate round trip, at least 1
    /// * `options` - Forwarded unchanged to every page's RPC request
    ///
    /// # Returns
    /// * `Ok(Vec<DecodedResult>)` - One result per call, in input order
    /// * `Err(AggregateError)` - The first failure; no partial results
    pub async fn aggregate(
        &self,
        calls: &[CallDescriptor],
        page_size: usize,
        options: &CallOptions,
    ) -> Result<Vec<DecodedResult>, AggregateError> {
        Ok(self
            .aggregate_with_blocks(calls, page_size, options)
            .await?
            .results)
    }

    /// [`Multicall::aggregate`] with the configured page size and no overrides
    pub async fn aggregate_default(
        &self,
        calls: &[CallDescriptor],
    ) -> Result<Vec<DecodedResult>, AggregateError> {
        self.aggregate(calls, self.page_size, &CallOptions::default())
            .await
    }

    /// [`Multicall::aggregate`], also reporting the block each page ran at
    pub async fn aggregate_with_blocks(
        &self,
        calls: &[CallDescriptor],
        page_size: usize,
        options: &CallOptions,
    ) -> Result<BatchOutput, AggregateError> {
        if page_size == 0 {
            return Err(AggregateError::InvalidPageSize(page_size));
        }
        if calls.is_empty() {
            return Ok(BatchOutput::default());
        }

        let encoded = self.encode_calls(calls)?;
        let plan = PagePlan::new(calls.len(), page_size);
        let in_flight = self.max_concurrent_pages.unwrap_or(plan.pages);
        debug!(
            calls = plan.calls,
            page_size = plan.page_size,
            pages = plan.pages,
            in_flight,
            multicall = %self.address,
            "dispatching batch"
        );

        // `buffered` yields in page order and runs every page to completion.
        let responses: Vec<Result<AggregatedResponse, AggregateError>> =
            stream::iter(encoded.chunks(page_size).enumerate())
                .map(|(page, chunk)| self.dispatch_page(page, chunk.to_vec(), options))
                .buffered(in_flight)
                .collect()
                .await;

        let mut block_numbers = Vec::with_capacity(plan.pages);
        let mut raw_results = Vec::with_capacity(calls.len());
        for response in responses {
            let response = response?;
            block_numbers.push(response.block_number);
            raw_results.extend(response.return_data);
        }

        let results = self.decode_results(calls, &raw_results)?;
        debug!(calls = results.len(), pages = block_numbers.len(), "batch complete");
        Ok(BatchOutput {
            results,
            block_numbers,
        })
    }

    fn encode_calls(
        &self,
        calls: &[CallDescriptor],
    ) -> Result<Vec<(Address, Bytes)>, AggregateError> {
        calls
            .iter()
            .enumerate()
            .map(|(index, call)| {
                self.codec
                    .encode_call(call.function(), call.args())
                    .map(|data| (call.target(), data))
                    .map_err(|source| AggregateError::Encode {
                        index,
                        target: call.target(),
                        signature: call.signature(),
                        source,
                    })
            })
            .collect()
    }

    async fn dispatch_page(
        &self,
        page: usize,
        calls: Vec<(Address, Bytes)>,
        options: &CallOptions,
    ) -> Result<AggregatedResponse, AggregateError> {
        let expected = calls.len();
        let response = self
            .caller
            .aggregate_call(self.address, calls, options)
            .await
            .map_err(|source| {
                warn!(page, error = %source, "page failed");
                AggregateError::Transport { page, source }
            })?;

        if response.return_data.len() != expected {
            return Err(AggregateError::PageLength {
                page,
                expected,
                actual: response.return_data.len(),
            });
        }
        debug!(page, calls = expected, block = response.block_number, "page complete");
        Ok(response)
    }

    fn decode_results(
        &self,
        calls: &[CallDescriptor],
        raw_results: &[Bytes],
    ) -> Result<Vec<DecodedResult>, AggregateError> {
        calls
            .iter()
            .zip(raw_results)
            .enumerate()
            .map(|(index, (call, raw))| {
                self.codec
                    .decode_result(call.function(), raw)
                    .map(|values| DecodedResult::new(call.function(), values))
                    .map_err(|source| AggregateError::Decode {
                        index,
                        target: call.target(),
                        signature: call.signature(),
                        source,
                    })
            })
            .collect()
    }
}
