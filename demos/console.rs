//! Interactive console for sending raw OI commands.
//!
//! Usage: `cargo run --example console -- /dev/ttyUSB0 [115200|19200]`
//!
//! Each line is an opcode followed by its arguments, e.g. `137 i16:-200 i16:500`.

use std::{io, time::Duration};

use log::{error, info};
use roomba_oi::{
    connection::{
        serial::{BaudRate, SerialConfig, SerialRoomba},
        RoombaError,
    },
    encode::{pack, Encode},
    value::Value,
};
use rustyline::{error::ReadlineError, DefaultEditor};

fn send_line(roomba: &mut SerialRoomba, line: &str) -> Result<(), RoombaError> {
    let mut tokens = line.split_whitespace();
    let Some(opcode) = tokens.next() else {
        return Ok(());
    };
    let opcode = match opcode.parse::<Value>()? {
        Value::U8(opcode) => opcode,
        other => {
            error!("Opcodes are a single byte, got {}", other);
            return Ok(());
        }
    };

    let values = tokens
        .map(|token| token.parse::<Value>())
        .collect::<Result<Vec<_>, _>>()?;
    let args: Vec<&dyn Encode> = values.iter().map(|v| v as &dyn Encode).collect();
    roomba.write(opcode, &pack(&args)?)?;

    let mut reply = [0u8; 256];
    match roomba.read(&mut reply) {
        Ok(0) => {}
        Ok(n) => info!("reply: {:x?}", &reply[..n]),
        Err(RoombaError::Io(e)) if e.kind() == io::ErrorKind::TimedOut => {}
        Err(e) => return Err(e),
    }

    Ok(())
}

fn main() -> Result<(), RoombaError> {
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Always,
    )
    .unwrap();

    let mut args = std::env::args().skip(1);
    let port_name = args.next().expect("usage: console <port> [baud]");
    let baud: u32 = match args.next() {
        Some(baud) => baud.parse().expect("baud rate must be a number"),
        None => 115200,
    };

    let mut roomba = SerialRoomba::new(port_name);
    let config = SerialConfig::new(BaudRate::try_from(baud)?).timeout(Duration::from_millis(100));
    roomba.open_with(config)?;

    let mut editor = DefaultEditor::new().unwrap();
    loop {
        match editor.readline("oi> ") {
            Ok(line) => {
                _ = editor.add_history_entry(line.as_str());
                if let Err(e) = send_line(&mut roomba, &line) {
                    error!("{}", e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                error!("{}", e);
                break;
            }
        }
    }

    Ok(())
}
