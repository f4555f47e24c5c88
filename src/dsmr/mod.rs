//! P1 telegram decoding: field catalogue, framing reader and line parser.

pub mod error;
pub mod fields;
pub mod parser;
pub mod reader;
pub mod record;
pub mod value;

pub use error::DecodeError;
pub use fields::{FieldKind, FieldSpec, FIELDS, FIELD_COUNT};
pub use parser::{parse_telegram, telegram_crc};
pub use reader::{P1Reader, SerialPort, TelegramSource, TELEGRAM_BUFFER_SIZE};
pub use record::{Field, Record};
pub use value::{FixedValue, Value};
