// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

use crate::protocol::ProtocolError;

/// Error type for actuator board round trips.
///
/// `E` is the bus driver's own error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus kept refusing the frame until the retry budget ran out.
    TransportRefused,
    /// No response arrived on the receive identifier in time.
    Timeout,
    /// The board answered with something other than the success code. Carries the raw byte.
    RemoteRejected(u8),
    /// Hard bus driver error.
    Bus(E),
    /// Invalid tool/function pairing.
    Protocol(ProtocolError),
}

impl<E> From<ProtocolError> for Error<E> {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}
