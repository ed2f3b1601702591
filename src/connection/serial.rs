//! Implements discovering and opening OI devices connected over a serial port.

use std::time::Duration;

use log::{debug, info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortBuilder, StopBits};

use super::{Roomba, RoombaError};

/// A [`Roomba`] backed by a native serial port.
pub type SerialRoomba = Roomba<Box<dyn SerialPort>>;

/// Baud rates the Create 2 can be configured for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaudRate {
    /// The default rate after power-on.
    B115200,
    /// Selected by holding the Clean button while powering on.
    B19200,
}

impl BaudRate {
    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B115200 => 115200,
            BaudRate::B19200 => 19200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = RoombaError;

    fn try_from(baud: u32) -> Result<Self, Self::Error> {
        match baud {
            115200 => Ok(BaudRate::B115200),
            19200 => Ok(BaudRate::B19200),
            other => Err(RoombaError::InvalidBaudRate(other)),
        }
    }
}

/// Settings used when opening a serial port.
///
/// Only the baud rate can be chosen. The OI always uses 8 data bits, no
/// parity, one stop bit and no flow control.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialConfig {
    pub baud_rate: BaudRate,
    /// How long a single read blocks before failing with `TimedOut`.
    pub timeout: Duration,
}

impl SerialConfig {
    pub const DATA_BITS: DataBits = DataBits::Eight;
    pub const PARITY: Parity = Parity::None;
    pub const STOP_BITS: StopBits = StopBits::One;
    pub const FLOW_CONTROL: FlowControl = FlowControl::None;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    pub fn new(baud_rate: BaudRate) -> Self {
        Self {
            baud_rate,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates a port builder for the given path with these settings.
    pub fn builder(&self, port_name: &str) -> SerialPortBuilder {
        serialport::new(port_name, self.baud_rate.as_u32())
            .data_bits(Self::DATA_BITS)
            .parity(Self::PARITY)
            .stop_bits(Self::STOP_BITS)
            .flow_control(Self::FLOW_CONTROL)
            .timeout(self.timeout)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(BaudRate::B115200)
    }
}

/// Lists the names of all serial ports on the system.
pub fn find_ports() -> Result<Vec<String>, RoombaError> {
    let ports = serialport::available_ports()?;
    debug!("Found {} serial ports", ports.len());

    Ok(ports.into_iter().map(|port| port.port_name).collect())
}

impl SerialRoomba {
    /// Opens the serial port at the given baud rate.
    ///
    /// Fails without touching the port unless `baud` is 115200 or 19200.
    pub fn open(&mut self, baud: u32) -> Result<(), RoombaError> {
        let baud_rate = BaudRate::try_from(baud)?;
        self.open_with(SerialConfig::new(baud_rate))
    }

    /// Opens the serial port with the given settings, replacing any open stream.
    pub fn open_with(&mut self, config: SerialConfig) -> Result<(), RoombaError> {
        let port = match config.builder(&self.port_name).open() {
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
