//! Contract interfaces built from human-readable ABI fragments
//!
//! Calls against a contract are usually written as
//! `(target, "functionName", args)` against a short list of fragments.
//! [`ContractInterface`] parses such a list once and hands out typed
//! [`CallDescriptor`]s.
//!
//! ```
//! use revest_multicall::interface::ContractInterface;
//! use alloy::{dyn_abi::DynSolValue, primitives::{address, U256}};
//!
//! let lqdr = ContractInterface::parse([
//!     "event DepositERC20OutputReceiver(address indexed mintTo, address indexed token, uint amountTokens, uint indexed fnftId, bytes extraData)",
//!     "function getAddressForFNFT(uint256 fnftId) view returns (address smartWallAdd)",
//! ]).unwrap();
//!
//! let call = lqdr.call(
//!     address!("b80f5a586bc247d993e6dbacd8add211ec6b0ca5"),
//!     "getAddressForFNFT",
//!     vec![DynSolValue::Uint(U256::from(1), 256)],
//! ).unwrap();
//! assert_eq!(call.signature(), "getAddressForFNFT(uint256)");
//! ```

use std::collections::BTreeMap;

use alloy::{dyn_abi::DynSolValue, json_abi::Function, primitives::Address};

use crate::{
    errors::{CodecError, InterfaceError},
    types::CallDescriptor,
};

/// Fragment kinds that carry no callable function
const NON_FUNCTION_PREFIXES: [&str; 4] = ["event ", "error ", "constructor", "fallback"];

/// Set of callable functions, addressable by name or full signature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractInterface {
    functions: BTreeMap<String, Vec<Function>>,
}

impl ContractInterface {
    /// Parse a list of human-readable fragments
    ///
    /// Event, error, constructor and fallback fragments are skipped; every
    /// other fragment must be a valid function.
    pub fn parse<'a, I>(fragments: I) -> Result<Self, InterfaceError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut interface = Self::default();
        for fragment in fragments {
            let fragment = fragment.trim();
            if fragment.is_empty()
                || NON_FUNCTION_PREFIXES
                    .iter()
                    .any(|prefix| fragment.starts_with(prefix))
            {
                continue;
            }
            let function =
                Function::parse(fragment).map_err(|e| CodecError::InvalidSignature {
                    signature: fragment.to_string(),
                    reason: e.to_string(),
                })?;
            interface.add(function);
        }
        Ok(interface)
    }

    /// Register one more function; overloads accumulate under one name
    pub fn add(&mut self, function: Function) {
        let overloads = self.functions.entry(function.name.clone()).or_default();
        if !overloads.contains(&function) {
            overloads.push(function);
        }
    }

    /// Find a function by bare name or by signature
    ///
    /// A bare name must be unambiguous; overloaded functions need the full
    /// signature. Signatures may be written in any form `Function::parse`
    /// accepts (`balanceOf(address,uint256)`, with parameter names, or as a
    /// `function ...` fragment).
    pub fn function(&self, name_or_signature: &str) -> Result<&Function, InterfaceError> {
        let unknown = || InterfaceError::UnknownFunction(name_or_signature.to_string());

        if name_or_signature.contains('(') {
            let wanted = Function::parse(name_or_signature).map_err(|_| unknown())?;
            let signature = wanted.signature();
            return self
                .functions
                .get(&wanted.name)
                .and_then(|overloads| overloads.iter().find(|f| f.signature() == signature))
                .ok_or_else(unknown);
        }

        let name = name_or_signature.trim();
        match self.functions.get(name).map(Vec::as_slice) {
            Some([function]) => Ok(function),
            Some([_, _, ..]) => Err(InterfaceError::AmbiguousFunction(name.to_string())),
            _ => Err(unknown()),
        }
    }

    /// Build a call descriptor for `target`
    pub fn call(
        &self,
        target: Address,
        name_or_signature: &str,
        args: Vec<DynSolValue>,
    ) -> Result<CallDescriptor, InterfaceError> {
        let function = self.function(name_or_signature)?;
        Ok(CallDescriptor::from_function(target, function.clone(), args))
    }

    /// All registered functions, grouped by name
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
