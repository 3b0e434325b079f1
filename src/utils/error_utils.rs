//! Revert data helpers for failed aggregate calls
//!
//! When the aggregator contract reverts (typically `Multicall3: call failed`
//! because one inner call reverted), the RPC error carries raw revert bytes.
//! This module turns those bytes into something readable:
//! - Error(string) - Standard revert with message
//! - Panic(uint256) - Solidity panic with error code
//! - Anything else is shown as hex

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    hex,
};

/// Parse a revert reason from raw revert data
///
/// Handles two main types of errors:
/// 1. Error(string) - Standard revert with message (selector: 0x08c379a0)
/// 2. Panic(uint256) - Solidity panic with error code (selector: 0x4e487b71)
///
/// # Arguments
/// * `output` - Raw revert bytes returned by the node
///
/// # Returns
/// * `Some(String)` - Decoded error message or panic reason
/// * `None` - If the error format is not recognized or cannot be decoded
pub fn parse_revert_reason(output: &[u8]) -> Option<String> {
    if output.len() < 4 {
        return None;
    }

    let (selector, payload) = output.split_at(4);
    match selector {
        // Error(string) - 0x08c379a0
        [0x08, 0xc3, 0x79, 0xa0] => match DynSolType::String.abi_decode(payload) {
            Ok(DynSolValue::String(reason)) => Some(reason),
            _ => None,
        },
        // Panic(uint256) - 0x4e487b71
        [0x4e, 0x48, 0x7b, 0x71] => match DynSolType::Uint(256).abi_decode(payload) {
            Ok(DynSolValue::Uint(code, _)) => Some(match code.saturating_to::<u64>() {
                0x01 => "Panic: Assertion failed".to_string(),
                0x11 => "Panic: Arithmetic overflow".to_string(),
                0x12 => "Panic: Division by zero".to_string(),
                0x21 => "Panic: Invalid enum value".to_string(),
                0x22 => "Panic: Invalid storage byte array access".to_string(),
                0x31 => "Panic: Pop on empty array".to_string(),
                0x32 => "Panic: Array access out of bounds".to_string(),
                0x41 => "Panic: Out of memory".to_string(),
                0x51 => "Panic: Zero-initialized function pointer".to_string(),
                code => format!("Panic: Unknown error code (0x{:x})", code),
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Readable description of revert data, falling back to hex
pub fn describe_revert(output: &[u8]) -> String {
    if output.is_empty() {
        return "execution reverted without data".to_string();
    }
    parse_revert_reason(output).unwrap_or_else(|| format!("0x{}", hex::encode(output)))
}
