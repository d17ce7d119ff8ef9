//! The RPC executor capability consumed by `CallRpc` nodes.

use sensorgraph_types::SlotIdentifier;
use thiserror::Error;

/// An RPC invocation failed.
///
/// Failures are caught inside node evaluation and downgraded to a zero
/// output; they never abort a propagation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// No device answers at the addressed slot.
    #[error("no device at {slot}")]
    UnknownSlot { slot: SlotIdentifier },

    /// The device answered with a non-success status.
    #[error("rpc 0x{rpc_id:04x} on {slot} failed with status {status}")]
    CallFailed {
        slot: SlotIdentifier,
        rpc_id: u16,
        status: u8,
    },
}

/// Pluggable capability that performs (or stubs) hardware RPC calls.
///
/// A call is synchronous and runs from within node evaluation; an executor
/// that blocks (for example one forwarding to real hardware) blocks the
/// whole propagation pass.
pub trait RpcExecutor {
    fn call(
        &mut self,
        address: SlotIdentifier,
        rpc_id: u16,
        payload: &[u8],
    ) -> Result<Vec<u8>, RpcError>;
}

/// Default executor: accepts any RPC and returns an empty response.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRpcExecutor;

impl RpcExecutor for NullRpcExecutor {
    fn call(
        &mut self,
        _address: SlotIdentifier,
        _rpc_id: u16,
        _payload: &[u8],
    ) -> Result<Vec<u8>, RpcError> {
        Ok(Vec::new())
    }
}

/// Decode an RPC response into a node output value.
///
/// Devices answer with little-endian integers; anything of an unexpected
/// length decodes to 0 so a misbehaving device cannot poison the graph.
pub(crate) fn decode_response(payload: &[u8]) -> u32 {
    match payload.len() {
        2 => u16::from_le_bytes([payload[0], payload[1]]) as u32,
        4 => u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_executor_returns_empty() {
        let mut rpc = NullRpcExecutor;
        assert_eq!(rpc.call(SlotIdentifier::Slot(1), 0x8000, &[]).unwrap(), vec![]);
    }

    #[test]
    fn response_decoding() {
        assert_eq!(decode_response(&[]), 0);
        assert_eq!(decode_response(&[0x34, 0x12]), 0x1234);
        assert_eq!(decode_response(&[0x78, 0x56, 0x34, 0x12]), 0x12345678);
        assert_eq!(decode_response(&[1, 2, 3]), 0);
    }
}
