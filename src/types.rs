//! Core types for batched contract reads
//!
//! This module defines the data structures that flow through the aggregator:
//! - Call descriptors (what to read)
//! - Call options forwarded to the RPC layer
//! - Raw aggregated responses (one per page)
//! - Decoded results (one per call)

pub use alloy::dyn_abi::DynSolValue;
pub use alloy::eips::BlockId;
pub use alloy::json_abi::Function;
pub use alloy::primitives::{Address, Bytes, U256};

use crate::errors::CodecError;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// One read-only contract call
///
/// The function signature is parsed once at construction; the descriptor is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    target: Address,
    function: Function,
    args: Vec<DynSolValue>,
}

impl CallDescriptor {
    /// Build a descriptor from a human-readable signature
    ///
    /// Accepts Solidity fragment forms such as
    /// `"function locked(address) view returns (int128 amount, uint256 end)"`
    /// or `"totalSupply() returns (uint256)"`.
    ///
    /// # Example
    /// ```
    /// use revest_multicall::types::{CallDescriptor, DynSolValue};
    /// use alloy::primitives::{address, U256};
    ///
    /// let call = CallDescriptor::new(
    ///     address!("b80f5a586bc247d993e6dbacd8add211ec6b0ca5"),
    ///     "function getAddressForFNFT(uint256 fnftId) view returns (address smartWallAdd)",
    ///     vec![DynSolValue::Uint(U256::from(7), 256)],
    /// ).unwrap();
    /// assert_eq!(call.signature(), "getAddressForFNFT(uint256)");
    /// ```
    pub fn new(
        target: Address,
        signature: &str,
        args: Vec<DynSolValue>,
    ) -> Result<Self, CodecError> {
        let function = Function::parse(signature).map_err(|e| CodecError::InvalidSignature {
            signature: signature.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_function(target, function, args))
    }

    /// Build a descriptor from an already parsed function
    pub fn from_function(target: Address, function: Function, args: Vec<DynSolValue>) -> Self {
        Self { target, function, args }
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn args(&self) -> &[DynSolValue] {
        &self.args
    }

    /// Canonical `name(types)` signature, used in error messages
    pub fn signature(&self) -> String {
        self.function.signature()
    }
}

/// Per-request overrides forwarded verbatim to the RPC layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Block to execute the read against (latest if unset)
    pub block: Option<BlockId>,
    /// Gas limit for the `eth_call`
    pub gas: Option<u64>,
    /// Sender of the `eth_call`
    pub from: Option<Address>,
}

impl CallOptions {
    pub fn at_block(mut self, block: impl Into<BlockId>) -> Self {
        self.block = Some(block.into());
        self
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

/// Raw result of one on-chain `aggregate` call
///
/// `return_data[i]` belongs to the i-th call of the page that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedResponse {
    /// Block the aggregator executed at
    pub block_number: u64,
    /// Opaque return bytes, one entry per submitted call
    pub return_data: Vec<Bytes>,
}

/// Decoded return values of one call
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResult {
    names: Vec<String>,
    values: Vec<DynSolValue>,
}

impl DecodedResult {
    /// Pair decoded values with the output names of `function`
    pub fn new(function: &Function, values: Vec<DynSolValue>) -> Self {
        let names = function.outputs.iter().map(|param| param.name.clone()).collect();
        Self { names, values }
    }

    /// Look up an output by its declared name
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        if name.is_empty() {
            return None;
        }
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.values.get(i))
    }

    /// Output at position `index`
    pub fn value(&self, index: usize) -> Option<&DynSolValue> {
        self.values.get(index)
    }

    /// The only output of a single-return function
    pub fn single(&self) -> Option<&DynSolValue> {
        match self.values.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }

    pub fn values(&self) -> &[DynSolValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<DynSolValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decoded results plus the block each page was served at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    /// One entry per input call, in input order
    pub results: Vec<DecodedResult>,
    /// One entry per page, in page order
    pub block_numbers: Vec<u64>,
}

/// Shape of a batch dispatch, handy for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// Number of calls in the batch
    pub calls: usize,
    /// Maximum calls per page
    pub page_size: usize,
    /// Number of aggregate round trips
    pub pages: usize,
}

impl PagePlan {
    pub fn new(calls: usize, page_size: usize) -> Self {
        Self {
            calls,
            page_size,
            pages: calls.div_ceil(page_size.max(1)),
        }
    }
}
