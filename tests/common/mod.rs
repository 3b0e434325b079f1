// tests/common/mod.rs
#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, Bytes, U256},
};
use async_trait::async_trait;
use revest_multicall::{
    errors::TransportError,
    types::{AggregatedResponse, CallOptions},
    AggregateCaller, CallDescriptor,
};

pub const MULTICALL: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");
pub const TOKEN: Address = address!("5cc61a78f164885776aa610fb0fe1257df78e59b");
pub const FORK_BLOCK: u64 = 17277518;

/// In-memory aggregator
///
/// Every inner call "returns" its own ABI-encoded arguments, so a function
/// declared as `f(T...) returns (T...)` decodes back to the arguments it was
/// called with.
#[derive(Default)]
pub struct EchoAggregator {
    /// Page sizes in the order pages were received
    pub dispatches: Mutex<Vec<usize>>,
    /// Options seen by each page
    pub options: Mutex<Vec<CallOptions>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// Fail any page containing a call whose first argument word equals this
    pub fail_on: Option<u64>,
    /// Make earlier pages finish later than later ones
    pub reverse_delays: bool,
    /// Drop the last return value of every page
    pub drop_last: bool,
}

impl EchoAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(value: u64) -> Self {
        Self {
            fail_on: Some(value),
            ..Self::default()
        }
    }

    pub fn with_reverse_delays(mut self) -> Self {
        self.reverse_delays = true;
        self
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.lock().unwrap().len()
    }

    pub fn page_sizes(&self) -> Vec<usize> {
        let mut sizes = self.dispatches.lock().unwrap().clone();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }
}

fn first_word(call_data: &Bytes) -> Option<U256> {
    call_data
        .get(4..36)
        .map(U256::from_be_slice)
}

#[async_trait]
impl AggregateCaller for EchoAggregator {
    async fn aggregate_call(
        &self,
        multicall: Address,
        calls: Vec<(Address, Bytes)>,
        options: &CallOptions,
    ) -> Result<AggregatedResponse, TransportError> {
        assert_eq!(multicall, MULTICALL);
        self.dispatches.lock().unwrap().push(calls.len());
        self.options.lock().unwrap().push(options.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let first = calls
            .first()
            .and_then(|(_, data)| first_word(data))
            .map(|word| word.saturating_to::<u64>())
            .unwrap_or_default();
        let delay = if self.reverse_delays {
            5_000u64.saturating_sub(first) / 100
        } else {
            5
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(fail_on) = self.fail_on {
            let hit = calls
                .iter()
                .filter_map(|(_, data)| first_word(data))
                .any(|word| word == U256::from(fail_on));
            if hit {
                return Err(TransportError::Rpc("connection reset by peer".to_string()));
            }
        }

        let mut return_data = calls
            .into_iter()
            .map(|(_, data)| Bytes::copy_from_slice(data.get(4..).unwrap_or_default()))
            .collect::<Vec<_>>();
        if self.drop_last {
            return_data.pop();
        }

        Ok(AggregatedResponse {
            block_number: FORK_BLOCK,
            return_data,
        })
    }
}

pub fn uint(value: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(value), 256)
}

/// `echo(uint256 x) returns (uint256 x)` on TOKEN for every value
pub fn echo_calls(values: impl IntoIterator<Item = u64>) -> Vec<CallDescriptor> {
    values
        .into_iter()
        .map(|value| {
            CallDescriptor::new(
                TOKEN,
                "function echo(uint256 x) view returns (uint256 x)",
                vec![uint(value)],
            )
            .unwrap()
        })
        .collect()
}

pub fn as_u64(value: &DynSolValue) -> u64 {
    match value {
        DynSolValue::Uint(v, _) => v.saturating_to::<u64>(),
        other => panic!("expected uint, got {other:?}"),
    }
}
