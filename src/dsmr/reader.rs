use super::error::DecodeError;
use super::parser::parse_telegram;
use super::record::Record;
use core::fmt::Debug;

/// Largest telegram the reader buffers; anything longer is dropped.
pub const TELEGRAM_BUFFER_SIZE: usize = 2048;

/// Non-blocking byte input the P1 port is read through.
pub trait SerialPort {
    type Error: Debug;

    fn available(&mut self) -> bool;

    /// Copy pending bytes into `buf`, returning how many were read (0 if none).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Where decoded telegrams come from.
pub trait TelegramSource {
    fn bytes_available(&mut self) -> bool;

    /// Feed pending input into the incremental reader.
    fn poll(&mut self);

    fn telegram_available(&self) -> bool;

    /// Decode the buffered telegram and release it, successful or not.
    fn decode(&mut self) -> Result<Record, DecodeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    WaitingForStart,
    Reading,
    Checksum(u8),
    Complete,
}

/// Frames P1 telegrams out of a serial byte stream.
pub struct P1Reader<S: SerialPort> {
    port: S,
    buffer: heapless::Vec<u8, TELEGRAM_BUFFER_SIZE>,
    state: FrameState,
    require_crc: bool,
    overflows: u32,
}

impl<S: SerialPort> P1Reader<S> {
    pub fn new(port: S, require_crc: bool) -> Self {
        Self {
            port,
            buffer: heapless::Vec::new(),
            state: FrameState::WaitingForStart,
            require_crc,
            overflows: 0,
        }
    }

    /// Telegrams dropped because they did not fit the buffer.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }

    fn restart(&mut self) {
        self.buffer.clear();
        let _ = self.buffer.push(b'/');
        self.state = FrameState::Reading;
    }

    fn push(&mut self, byte: u8) -> bool {
        if self.buffer.push(byte).is_err() {
            self.overflows += 1;
            log::warn!(
                "P1: Telegram exceeds {} bytes, discarding (overflow #{})",
                TELEGRAM_BUFFER_SIZE,
                self.overflows
            );
            self.buffer.clear();
            self.state = FrameState::WaitingForStart;
            return false;
        }
        true
    }

    fn feed(&mut self, byte: u8) {
        match self.state {
            FrameState::WaitingForStart => {
                if byte == b'/' {
                    self.restart();
                }
            }
            FrameState::Reading => {
                if byte == b'/' {
                    log::debug!("P1: Start of new telegram inside previous one, restarting");
                    self.restart();
                } else if self.push(byte) && byte == b'!' {
                    self.state = if self.require_crc {
                        FrameState::Checksum(0)
                    } else {
                        FrameState::Complete
                    };
                }
            }
            FrameState::Checksum(_) if byte == b'/' => {
                log::debug!("P1: Start of new telegram inside checksum, restarting");
                self.restart();
            }
            FrameState::Checksum(count) => {
                if byte.is_ascii_hexdigit() && self.push(byte) {
                    self.state = if count + 1 == 4 {
                        FrameState::Complete
                    } else {
                        FrameState::Checksum(count + 1)
                    };
                } else if !byte.is_ascii_hexdigit() {
                    // Short checksum, let the parser report it
                    self.state = FrameState::Complete;
                }
            }
            FrameState::Complete => {}
        }
    }
}

impl<S: SerialPort> TelegramSource for P1Reader<S> {
    fn bytes_available(&mut self) -> bool {
        self.port.available()
    }

    fn poll(&mut self) {
        let mut byte = [0u8; 1];
        // A finished telegram stays buffered until it is decoded
        while self.state != FrameState::Complete {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => self.feed(byte[0]),
                Err(e) => {
                    log::warn!("P1: Serial read error: {:?}", e);
                    break;
                }
            }
        }
    }

    fn telegram_available(&self) -> bool {
        self.state == FrameState::Complete
    }

    fn decode(&mut self) -> Result<Record, DecodeError> {
        if self.state != FrameState::Complete {
            return Err(DecodeError::NoTelegram);
        }
        let result = parse_telegram(&self.buffer, self.require_crc);
        self.buffer.clear();
        self.state = FrameState::WaitingForStart;
        result
    }
}
