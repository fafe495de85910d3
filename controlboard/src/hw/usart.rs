// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer.
//!
//! Blocking byte I/O exposed through `embedded_io::{Read, Write}` for the companion link.
//! Reception is polled, not interrupt driven.

use core::fmt;
use nb::block;

use embedded_io::{ErrorKind, ErrorType, Read, Write};
use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

/// Receive-side fault (framing, noise, overrun or parity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct UsartError;

impl fmt::Display for UsartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("USART receive error")
    }
}

impl core::error::Error for UsartError {}

impl embedded_io::Error for UsartError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    /// Block until one byte arrives.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, UsartError> {
        block!(self.rx.read()).map_err(|_| UsartError)
    }
}

impl<U: Instance> ErrorType for Usart<U> {
    type Error = UsartError;
}

impl<U: Instance> Read for Usart<U> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match buf.first_mut() {
            Some(slot) => {
                *slot = self.read_byte()?;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl<U: Instance> Write for Usart<U> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &b in buf {
            self.write_byte(b);
        }
        Ok(buf.len())
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    fn flush(&mut self) -> Result<(), Self::Error> {
        let _ = block!(self.tx.flush());
        Ok(())
    }
}
