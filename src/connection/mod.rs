//! Implements opening, writing commands to, and reading replies from an OI device.

use std::io::{self, Read, Write};

use log::info;
use thiserror::Error;

use crate::encode::EncodeError;

#[cfg(feature = "serial")]
pub mod serial;
#[cfg(feature = "tokio")]
pub mod async_serial;

#[derive(Error, Debug)]
pub enum RoombaError {
    #[error("invalid baud rate: {0}. Must be one of 115200, 19200")]
    InvalidBaudRate(u32),

    #[error("serial port is not open")]
    NotOpen,

    #[cfg(feature = "serial")]
    #[error("Serialport Error: {0}")]
    Serialport(#[from] serialport::Error),

    #[error("failed writing opcode {opcode} to serial interface")]
    OpcodeWrite {
        opcode: u8,
        #[source]
        source: io::Error,
    },

    #[error("failed writing command to serial interface: {payload:?}")]
    PayloadWrite {
        payload: Vec<u8>,
        #[source]
        source: io::Error,
    },

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Argument encoding error: {0}")]
    Encode(#[from] EncodeError),
}

/// Turns a write that transmitted fewer than `expected` bytes into an error.
pub(crate) fn check_written(written: io::Result<usize>, expected: usize) -> io::Result<()> {
    match written {
        Ok(n) if n == expected => Ok(()),
        Ok(n) => Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("wrote {n} of {expected} bytes"),
        )),
        Err(e) => Err(e),
    }
}

/// A handle to an OI device on a named serial port.
///
/// The handle starts out closed. Opcodes and their arguments can only be
/// written once a stream has been opened or attached with [`Roomba::from_stream`].
#[derive(Debug)]
pub struct Roomba<S> {
    port_name: String,
    stream: Option<S>,
}

impl<S> Roomba<S> {
    /// Creates a closed handle for the given port.
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            stream: None,
        }
    }

    /// Creates a handle around an already open stream.
    pub fn from_stream(port_name: impl Into<String>, stream: S) -> Self {
        Self {
            port_name: port_name.into(),
            stream: Some(stream),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Detaches the stream, returning it if the handle was open.
    ///
    /// The port is released once the returned stream is dropped.
    pub fn close(&mut self) -> Option<S> {
        self.stream.take()
    }
}

impl<S: Read + Write> Roomba<S> {
    /// Writes an opcode followed by its argument bytes.
    ///
    /// The opcode and the payload are sent as two separate writes. Either one
    /// transmitting fewer bytes than requested fails the whole call.
    pub fn write(&mut self, opcode: u8, payload: &[u8]) -> Result<(), RoombaError> {
        info!("writing opcode: {}, data {:?}", opcode, payload);
        let stream = self.stream.as_mut().ok_or(RoombaError::NotOpen)?;

        check_written(stream.write(&[opcode]), 1)
            .map_err(|source| RoombaError::OpcodeWrite { opcode, source })?;

        if !payload.is_empty() {
            check_written(stream.write(payload), payload.len()).map_err(|source| {
                RoombaError::PayloadWrite {
                    payload: payload.to_vec(),
                    source,
                }
            })?;
        }

        Ok(())
    }

    /// Writes a lone opcode with no arguments.
    pub fn write_byte(&mut self, opcode: u8) -> Result<(), RoombaError> {
        self.write(opcode, &[])
    }

    /// Reads whatever the device has sent into `buf`.
    ///
    /// This is a single read on the underlying stream. The caller has to know
    /// how many bytes a command replies with.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, RoombaError> {
        let stream = self.stream.as_mut().ok_or(RoombaError::NotOpen)?;
        Ok(stream.read(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        io::{self, Read, Write},
    };

    use super::{Roomba, RoombaError};
    use crate::encode::pack;

    /// A stream that records writes and replays scripted results.
    #[derive(Default)]
    pub struct MockStream {
        /// Bytes accepted by each write call.
        pub writes: Vec<Vec<u8>>,
        /// Per-call override for how many bytes a write accepts, or the error it fails with.
        pub write_results: VecDeque<Result<usize, io::ErrorKind>>,
        pub incoming: VecDeque<u8>,
        pub read_error: Option<io::ErrorKind>,
        /// Feeds accepted writes back as incoming bytes.
        pub echo: bool,
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(kind) = self.read_error.take() {
                return Err(kind.into());
            }
            let n = buf.len().min(self.incoming.len());
            for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = match self.write_results.pop_front() {
                Some(Ok(n)) => n.min(buf.len()),
                Some(Err(kind)) => return Err(kind.into()),
                None => buf.len(),
            };
            self.writes.push(buf[..n].to_vec());
            if self.echo {
                self.incoming.extend(&buf[..n]);
            }
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn roomba(stream: MockStream) -> Roomba<MockStream> {
        Roomba::from_stream("/dev/mock", stream)
    }

    #[test]
    fn opcode_then_payload() {
        let mut roomba = roomba(MockStream::default());
        roomba.write(137, &[0xFF, 0x38, 0x01, 0xF4]).unwrap();

        let stream = roomba.close().unwrap();
        assert_eq!(stream.writes, vec![vec![137], vec![0xFF, 0x38, 0x01, 0xF4]]);
    }

    #[test]
    fn lone_opcode_is_one_write() {
        let mut roomba = roomba(MockStream::default());
        roomba.write_byte(128).unwrap();
        roomba.write(131, &[]).unwrap();

        let stream = roomba.close().unwrap();
        assert_eq!(stream.writes, vec![vec![128], vec![131]]);
    }

    #[test]
    fn opcode_not_accepted() {
        let mut roomba = roomba(MockStream {
            write_results: VecDeque::from([Ok(0)]),
            ..Default::default()
        });

        let err = roomba.write(128, &[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            RoombaError::OpcodeWrite { opcode: 128, ref source }
                if source.kind() == io::ErrorKind::WriteZero
        ));
        assert_eq!(err.to_string(), "failed writing opcode 128 to serial interface");

        // The payload is never attempted.
        assert_eq!(roomba.close().unwrap().writes, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn opcode_write_error() {
        let mut roomba = roomba(MockStream {
            write_results: VecDeque::from([Err(io::ErrorKind::BrokenPipe)]),
            ..Default::default()
        });

        let err = roomba.write_byte(7).unwrap_err();
        assert!(matches!(
            err,
            RoombaError::OpcodeWrite { opcode: 7, ref source }
                if source.kind() == io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn payload_short_write() {
        let mut roomba = roomba(MockStream {
            write_results: VecDeque::from([Ok(1), Ok(2)]),
            ..Default::default()
        });

        let err = roomba.write(140, &[0, 1, 62, 32]).unwrap_err();
        match err {
            RoombaError::PayloadWrite { payload, source } => {
                assert_eq!(payload, vec![0, 1, 62, 32]);
                assert_eq!(source.kind(), io::ErrorKind::WriteZero);
            }
            other => panic!("expected a payload write error, got {other:?}"),
        }
    }

    #[test]
    fn read_passthrough() {
        let mut roomba = roomba(MockStream {
            incoming: VecDeque::from([1, 2, 3]),
            ..Default::default()
        });

        assert_eq!(roomba.read(&mut [0u8; 0]).unwrap(), 0);

        let mut one = [0u8; 1];
        assert_eq!(roomba.read(&mut one).unwrap(), 1);
        assert_eq!(one, [1]);

        let mut large = [0u8; 16];
        assert_eq!(roomba.read(&mut large).unwrap(), 2);
        assert_eq!(&large[..2], &[2, 3]);

        // End of stream.
        assert_eq!(roomba.read(&mut large).unwrap(), 0);
    }

    #[test]
    fn read_error_passthrough() {
        let mut roomba = roomba(MockStream {
            read_error: Some(io::ErrorKind::TimedOut),
            ..Default::default()
        });

        let err = roomba.read(&mut [0u8; 4]).unwrap_err();
        assert!(matches!(err, RoombaError::Io(ref e) if e.kind() == io::ErrorKind::TimedOut));
    }

    #[test]
    fn echo_round_trip() {
        let mut roomba = roomba(MockStream {
            echo: true,
            ..Default::default()
        });

        let args = pack(&[&-200i16, &500i16]).unwrap();
        roomba.write(137, &args).unwrap();

        let mut buf = [0u8; 8];
        let n = roomba.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[137, 0xFF, 0x38, 0x01, 0xF4]);
    }

    #[test]
    fn closed_handle() {
        let mut roomba = Roomba::<MockStream>::new("/dev/ttyUSB0");
        assert!(!roomba.is_open());
        assert_eq!(roomba.port_name(), "/dev/ttyUSB0");

        assert!(matches!(roomba.write_byte(128), Err(RoombaError::NotOpen)));
        assert!(matches!(roomba.read(&mut [0u8; 1]), Err(RoombaError::NotOpen)));
        assert!(roomba.close().is_none());
    }

    #[test]
    fn close_releases_stream() {
        let mut roomba = roomba(MockStream::default());
        assert!(roomba.is_open());

        roomba.close();
        assert!(!roomba.is_open());
        assert!(matches!(roomba.write_byte(128), Err(RoombaError::NotOpen)));
    }
}
