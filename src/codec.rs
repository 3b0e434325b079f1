//! Default ABI codec backed by `alloy::dyn_abi`
//!
//! Encodes call data from a parsed [`Function`] and a list of dynamic values,
//! and decodes return data against the function's declared outputs. Output
//! shapes may differ from call to call; each decode only ever sees its own
//! function.

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::Function,
    primitives::Bytes,
};

use crate::{errors::CodecError, traits::AbiCodec};

/// Codec for Solidity's standard contract ABI
#[derive(Debug, Clone, Copy, Default)]
pub struct DynAbiCodec;

impl AbiCodec for DynAbiCodec {
    fn encode_call(&self, function: &Function, args: &[DynSolValue]) -> Result<Bytes, CodecError> {
        if function.inputs.len() != args.len() {
            return Err(CodecError::ArgumentCount {
                expected: function.inputs.len(),
                actual: args.len(),
            });
        }
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode_result(
        &self,
        function: &Function,
        raw: &[u8],
    ) -> Result<Vec<DynSolValue>, CodecError> {
        function
            .abi_decode_output(raw)
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}
