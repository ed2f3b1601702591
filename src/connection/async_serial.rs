//! Async counterpart of [`Roomba`](super::Roomba), built on tokio.

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::{
    check_written,
    serial::{BaudRate, SerialConfig},
    RoombaError,
};

/// A handle to an OI device whose stream is driven by a tokio runtime.
#[derive(Debug)]
pub struct AsyncRoomba<S> {
    port_name: String,
    stream: Option<S>,
}

impl<S> AsyncRoomba<S> {
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
    pub fn close(&mut self) -> Option<S> {
        self.stream.take()
    }
}

impl AsyncRoomba<SerialStream> {
    /// Opens the serial port at the given baud rate.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self, baud: u32) -> Result<(), RoombaError> {
        let baud_rate = BaudRate::try_from(baud)?;
        self.open_with(SerialConfig::new(baud_rate))
    }

    pub fn open_with(&mut self, config: SerialConfig) -> Result<(), RoombaError> {
        let port = match config.builder(&self.port_name).open_native_async() {
            Ok(port) => port,
            Err(e) => {
                warn!("failed to open serial port: {}", self.port_name);
                return Err(RoombaError::Serialport(e));
            }
        };

        self.stream = Some(port);
        info!("opened serial port: {}", self.port_name);
        Ok(())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncRoomba<S> {
    /// Writes an opcode followed by its argument bytes as two separate writes.
    pub async fn write(&mut self, opcode: u8, payload: &[u8]) -> Result<(), RoombaError> {
        info!("writing opcode: {}, data {:?}", opcode, payload);
        let stream = self.stream.as_mut().ok_or(RoombaError::NotOpen)?;

        check_written(stream.write(&[opcode]).await, 1)
            .map_err(|source| RoombaError::OpcodeWrite { opcode, source })?;

        if !payload.is_empty() {
            check_written(stream.write(payload).await, payload.len()).map_err(|source| {
                RoombaError::PayloadWrite {
                    payload: payload.to_vec(),
                    source,
                }
            })?;
        }

        Ok(())
    }

    /// Writes a lone opcode with no arguments.
    pub async fn write_byte(&mut self, opcode: u8) -> Result<(), RoombaError> {
        self.write(opcode, &[]).await
    }

    /// Performs a single read on the underlying stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, RoombaError> {
        let stream = self.stream.as_mut().ok_or(RoombaError::NotOpen)?;
        Ok(stream.read(buf).await?)
    }
}
