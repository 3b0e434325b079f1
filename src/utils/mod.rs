//! Utility functions shared by the aggregator and its RPC backend
//!
//! # Modules
//!
//! - [`error_utils`]: Revert data handling
//!   - Revert reason extraction
//!   - Solidity panic code interpretation

/// Revert data parsing utilities
pub mod error_utils;
