// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial link to the companion microcontroller.
//!
//! Messages are four bytes: `[type][id][data]['X']`. A get request is sent as
//! `['G'][type][id]['X']`; the companion answers twice and only the second byte is kept.

use embedded_io::{Read, ReadExactError, Write};

/// Message terminator.
pub const TERMINATOR: u8 = b'X';

/// Type byte of a get request.
pub const GET_REQUEST: u8 = b'G';

/// Error type for `CompanionLink` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Serial driver error.
    Io(E),
    /// The serial stream ended before a reply byte arrived.
    UnexpectedEof,
}

impl<E> From<ReadExactError<E>> for LinkError<E> {
    fn from(e: ReadExactError<E>) -> Self {
        match e {
            ReadExactError::UnexpectedEof => LinkError::UnexpectedEof,
            ReadExactError::Other(e) => LinkError::Io(e),
        }
    }
}

pub struct CompanionLink<S> {
    serial: S,
}

impl<S: Read + Write> CompanionLink<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn free(self) -> S {
        self.serial
    }

    /// Send one `[kind][id][data]['X']` message.
    pub fn send(&mut self, kind: u8, id: u8, data: u8) -> Result<(), LinkError<S::Error>> {
        self.serial
            .write_all(&[kind, id, data, TERMINATOR])
            .map_err(LinkError::Io)?;
        self.serial.flush().map_err(LinkError::Io)
    }

    /// Ask the companion for the value of device `kind`/`id`.
    pub fn get(&mut self, kind: u8, id: u8) -> Result<u8, LinkError<S::Error>> {
        self.send(GET_REQUEST, kind, id)?;

        // The companion replies twice; the first byte is stale.
        let _ = self.read_byte()?;
        self.read_byte()
    }

    fn read_byte(&mut self) -> Result<u8, LinkError<S::Error>> {
        let mut buf = [0u8; 1];
        self.serial.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{ErrorKind, ErrorType};
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[derive(Default)]
    struct StubSerial {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        flushes: usize,
    }

    impl ErrorType for StubSerial {
        type Error = ErrorKind;
    }

    impl Read for StubSerial {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match (self.rx.pop_front(), buf.first_mut()) {
                (Some(b), Some(slot)) => {
                    *slot = b;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    impl Write for StubSerial {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn send_appends_terminator() {
        let mut link = CompanionLink::new(StubSerial::default());
        link.send(b'M', 1, 1).unwrap();

        let serial = link.free();
        assert_eq!(serial.tx, vec![b'M', 1, 1, b'X']);
        assert_eq!(serial.flushes, 1);
    }

    #[test]
    fn get_discards_first_reply() {
        let serial = StubSerial {
            rx: VecDeque::from(vec![0xAA, 7]),
            ..StubSerial::default()
        };
        let mut link = CompanionLink::new(serial);

        assert_eq!(link.get(b'M', 1), Ok(7));
        let serial = link.free();
        assert_eq!(serial.tx, vec![b'G', b'M', 1, b'X']);
        assert!(serial.rx.is_empty());
    }

    #[test]
    fn get_with_single_reply_is_eof() {
        let serial = StubSerial {
            rx: VecDeque::from(vec![5]),
            ..StubSerial::default()
        };
        let mut link = CompanionLink::new(serial);

        assert_eq!(link.get(b'M', 1), Err(LinkError::UnexpectedEof));
    }
}
