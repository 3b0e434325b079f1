//! Error types for batched contract reads
//!
//! This module defines the error handling system that covers:
//! - Invalid aggregator input (page size)
//! - ABI encoding and decoding of individual calls
//! - Transport failures of whole pages
//! - Network configuration lookup
//!
//! Every failure is surfaced to the caller as a single failed operation;
//! nothing here is retried or recovered locally.

use alloy::primitives::Address;
use thiserror::Error;

/// Top-level error type for [`Multicall`](crate::Multicall) operations
///
/// Each variant carries enough context (call index, target, function
/// signature or page number) to tell which part of the batch failed.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The caller supplied a page size of zero
    #[error("Invalid page size {0}: must be at least 1")]
    InvalidPageSize(usize),

    /// A call could not be ABI-encoded; nothing was dispatched
    #[error("Failed to encode call #{index} {signature} on {target}: {source}")]
    Encode {
        index: usize,
        target: Address,
        signature: String,
        #[source]
        source: CodecError,
    },

    /// A page's aggregate request failed in the RPC layer
    #[error("Aggregate request for page {page} failed: {source}")]
    Transport {
        page: usize,
        #[source]
        source: TransportError,
    },

    /// A raw return value could not be decoded against its call's outputs
    #[error("Failed to decode result #{index} of {signature} on {target}: {source}")]
    Decode {
        index: usize,
        target: Address,
        signature: String,
        #[source]
        source: CodecError,
    },

    /// The aggregator contract answered with the wrong number of entries
    #[error("Page {page} returned {actual} results for {expected} calls")]
    PageLength {
        page: usize,
        expected: usize,
        actual: usize,
    },
}

/// ABI codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Human-readable signature could not be parsed
    #[error("Invalid function signature `{signature}`: {reason}")]
    InvalidSignature {
        signature: String,
        reason: String,
    },

    /// Wrong number of arguments for the function's inputs
    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount {
        expected: usize,
        actual: usize,
    },

    /// Arguments do not match the declared input types
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Raw bytes do not match the declared output types
    #[error("Decoding failed: {0}")]
    Decode(String),
}

/// RPC capability errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not establish a provider for the endpoint
    #[error("Failed to connect to {url}: {reason}")]
    Connect {
        url: String,
        reason: String,
    },

    /// The JSON-RPC request itself failed
    #[error("RPC request failed: {0}")]
    Rpc(String),

    /// The aggregator contract reverted
    #[error("Aggregator reverted: {0}")]
    Reverted(String),
}

/// Network configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration registered for the chain
    #[error("No network configuration for chain {0}")]
    UnknownChain(u64),

    /// The chain is known but the named contract address is not set
    #[error("Chain {chain_id} has no `{name}` address configured")]
    MissingAddress {
        chain_id: u64,
        name: &'static str,
    },

    /// Chain ID retrieval from the provider failed
    #[error("Failed to get chain ID: {0}")]
    ChainId(String),

    /// Override document could not be parsed
    #[error("Invalid network configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Override file could not be read
    #[error("Failed to read network configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract interface lookup errors
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// No function with this name or signature in the interface
    #[error("Function `{0}` not found in interface")]
    UnknownFunction(String),

    /// Name matches several overloads; a full signature is required
    #[error("Function `{0}` is overloaded, use the full signature")]
    AmbiguousFunction(String),

    /// A fragment could not be parsed
    #[error(transparent)]
    Codec(#[from] CodecError),
}
