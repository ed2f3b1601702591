//! Crate for sending iRobot Open Interface (OI) commands to a Create 2 over serial. Not affiliated with iRobot.
//!
//! A command is an opcode byte followed by its arguments packed in big-endian order.
//! Arguments are encoded with [`Encode`](encode::Encode) and joined with [`pack`](encode::pack),
//! then written with [`Roomba::write`](connection::Roomba::write).
//! Replies are read back raw; the caller knows how many bytes each command answers with.
//!
//! ```no_run
//! use roomba_oi::{connection::serial::SerialRoomba, encode::pack};
//!
//! # fn main() -> Result<(), roomba_oi::connection::RoombaError> {
//! let mut roomba = SerialRoomba::new("/dev/ttyUSB0");
//! roomba.open(115200)?;
//!
//! roomba.write_byte(128)?; // Start
//! roomba.write_byte(131)?; // Safe
//! roomba.write(137, &pack(&[&-200i16, &500i16])?)?; // Drive
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod encode;
pub mod value;
