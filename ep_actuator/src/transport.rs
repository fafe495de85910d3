// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Request/response transport over the shared bus.
//!
//! Commands go out on a transmit identifier and the answer comes back on a distinct receive
//! identifier. There is no request id on the wire, so only one request may be in flight; this is
//! enforced by taking `&mut self` for the whole round trip. Anything already waiting on the
//! receive identifier when a round trip starts is an answer to an earlier, timed-out request and is
//! discarded before sending.

use embedded_hal::delay::DelayNs;

use crate::error::Error;
use crate::protocol::{CommandFrame, ResponseFrame, FRAME_CAPACITY};

/// Non-blocking access to the shared bus.
pub trait Bus {
    type Error;

    /// Hand a frame to the bus. `WouldBlock` means the bus did not accept it.
    fn try_send(&mut self, id: u16, frame: &[u8; FRAME_CAPACITY]) -> nb::Result<(), Self::Error>;

    /// Take the next frame addressed to `id`. `WouldBlock` means none is pending.
    fn try_receive(&mut self, id: u16) -> nb::Result<[u8; FRAME_CAPACITY], Self::Error>;
}

/// How long to keep retrying a refused send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetryPolicy {
    /// Retry until the bus accepts.
    Forever,
    /// Give up after this many retries.
    Bounded(u32),
}

/// Transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportConfig {
    /// Identifier commands are sent on.
    pub tx_id: u16,
    /// Identifier responses are expected on.
    pub rx_id: u16,
    /// Wait between refused sends.
    pub retry_delay_ms: u32,
    pub retry: RetryPolicy,
    /// `None` waits for the response forever.
    pub response_timeout_ms: Option<u32>,
    /// Wait between receive polls.
    pub poll_interval_us: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tx_id: 0x100,
            rx_id: 0x101,
            retry_delay_ms: 10,
            retry: RetryPolicy::Bounded(100),
            response_timeout_ms: Some(50),
            poll_interval_us: 100,
        }
    }
}

impl TransportConfig {
    /// Retry forever and wait forever for the response.
    pub fn unbounded() -> Self {
        Self {
            retry: RetryPolicy::Forever,
            response_timeout_ms: None,
            ..Self::default()
        }
    }

    /// Set the transmit and receive identifiers.
    pub fn with_ids(mut self, tx_id: u16, rx_id: u16) -> Self {
        self.tx_id = tx_id;
        self.rx_id = rx_id;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_retry_delay_ms(mut self, ms: u32) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    pub fn with_response_timeout_ms(mut self, timeout: Option<u32>) -> Self {
        self.response_timeout_ms = timeout;
        self
    }
}

/// Owns the bus and a delay provider and performs round trips one at a time.
pub struct Transport<B, D> {
    bus: B,
    delay: D,
    config: TransportConfig,
}

impl<B, D> Transport<B, D>
where
    B: Bus,
    D: DelayNs,
{
    pub fn new(bus: B, delay: D, config: TransportConfig) -> Self {
        Self { bus, delay, config }
    }

    #[inline]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Access the underlying bus.
    #[inline]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the transport and return the bus and delay.
    pub fn free(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Send `frame` and wait for the board's answer.
    pub fn roundtrip(&mut self, frame: CommandFrame) -> Result<ResponseFrame, Error<B::Error>> {
        self.drain()?;

        trace!("tx {=[u8]:x}", &frame.to_bytes()[..]);
        self.send(&frame.to_bytes())?;

        let resp = self.receive()?;
        trace!("rx {=[u8]:x}", &resp.as_bytes()[..]);
        Ok(resp)
    }

    /// Drop stale frames left on the receive identifier.
    fn drain(&mut self) -> Result<(), Error<B::Error>> {
        loop {
            match self.bus.try_receive(self.config.rx_id) {
                Ok(stale) => debug!("discarding stale frame {=[u8]:x}", &stale[..]),
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(Error::Bus(e)),
            }
        }
    }

    fn send(&mut self, bytes: &[u8; FRAME_CAPACITY]) -> Result<(), Error<B::Error>> {
        let mut retries: u32 = 0;

        loop {
            match self.bus.try_send(self.config.tx_id, bytes) {
                Ok(()) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(Error::Bus(e)),
                Err(nb::Error::WouldBlock) => {}
            }

            if let RetryPolicy::Bounded(max) = self.config.retry {
                if retries >= max {
                    warn!("bus refused frame after {=u32} retries", retries);
                    return Err(Error::TransportRefused);
                }
            }

            retries += 1;
            debug!("bus busy, retry {=u32}", retries);
            self.delay.delay_ms(self.config.retry_delay_ms);
        }
    }

    fn receive(&mut self) -> Result<ResponseFrame, Error<B::Error>> {
        let step_us = self.config.poll_interval_us.max(1);
        let mut waited_us: u64 = 0;

        loop {
            match self.bus.try_receive(self.config.rx_id) {
                Ok(bytes) => return Ok(ResponseFrame::from_bytes(bytes)),
                Err(nb::Error::Other(e)) => return Err(Error::Bus(e)),
                Err(nb::Error::WouldBlock) => {}
            }

            if let Some(timeout_ms) = self.config.response_timeout_ms {
                if waited_us >= u64::from(timeout_ms) * 1000 {
                    warn!("no response on {=u16:#x} after {=u32} ms", self.config.rx_id, timeout_ms);
                    return Err(Error::Timeout);
                }
            }

            self.delay.delay_us(step_us);
            waited_us += u64::from(step_us);
        }
    }
}
