use super::error::DecodeError;
use super::fields::{index_of_obis, FieldKind, FieldSpec, FIELDS, IDENTIFICATION};
use super::record::Record;
use super::value::{FixedValue, Value};
use crc::{Crc, CRC_16_ARC};

pub const P1_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

/// Checksum a P1 meter appends after `!`, computed over `/` up to and including `!`.
pub fn telegram_crc(body: &[u8]) -> u16 {
    P1_CRC.checksum(body)
}

/// Decode one framed telegram (`/` ... `!` followed by the checksum digits).
///
/// Either every line decodes and a full [`Record`] comes back, or nothing does.
pub fn parse_telegram(data: &[u8], require_crc: bool) -> Result<Record, DecodeError> {
    if data.first() != Some(&b'/') {
        return Err(DecodeError::MissingHeader);
    }
    let bang = data
        .iter()
        .rposition(|&b| b == b'!')
        .ok_or(DecodeError::MissingChecksum)?;

    if require_crc {
        verify_checksum(&data[..=bang], &data[bang + 1..])?;
    }

    let text = String::from_utf8_lossy(&data[1..bang]);
    let mut lines = text.split("\r\n");

    let mut record = Record::new();
    let header = lines.next().unwrap_or("");
    *record.slot_mut(IDENTIFICATION) = Some(Value::Text(header.to_string()));

    // Last line is complete when the telegram ends in "\r\n!", leaving an empty tail
    let lines: Vec<&str> = lines.collect();
    if let Some((tail, complete)) = lines.split_last() {
        if !tail.is_empty() {
            return Err(DecodeError::UnterminatedLine(tail.to_string()));
        }
        for line in complete.iter().filter(|l| !l.is_empty()) {
            parse_line(&mut record, line)?;
        }
    } else if !header.is_empty() {
        return Err(DecodeError::UnterminatedLine(header.to_string()));
    }

    Ok(record)
}

fn verify_checksum(body: &[u8], trailer: &[u8]) -> Result<(), DecodeError> {
    let digits = trailer
        .iter()
        .take_while(|&&b| b != b'\r' && b != b'\n')
        .copied()
        .collect::<Vec<u8>>();
    if digits.is_empty() {
        return Err(DecodeError::MissingChecksum);
    }
    let digits = String::from_utf8_lossy(&digits).into_owned();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::MalformedChecksum(digits));
    }
    let expected = u16::from_str_radix(&digits, 16)
        .map_err(|_| DecodeError::MalformedChecksum(digits.clone()))?;

    let computed = telegram_crc(body);
    if expected != computed {
        return Err(DecodeError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}

fn parse_line(record: &mut Record, line: &str) -> Result<(), DecodeError> {
    let open = line
        .find('(')
        .ok_or_else(|| DecodeError::MalformedLine(line.to_string()))?;
    let (obis, rest) = line.split_at(open);

    // Unknown references are skipped
    let Some(index) = index_of_obis(obis) else {
        log::debug!("P1: Ignoring unknown field {}", obis);
        return Ok(());
    };
    let spec = &FIELDS[index];

    let slot = record.slot_mut(index);
    if slot.is_some() {
        return Err(DecodeError::DuplicateField(spec.name));
    }
    *slot = Some(parse_value(spec, line, rest)?);
    Ok(())
}

fn parse_value(spec: &'static FieldSpec, line: &str, rest: &str) -> Result<Value, DecodeError> {
    if spec.kind == FieldKind::Raw {
        return Ok(Value::Text(rest.to_string()));
    }

    let groups = split_groups(rest).ok_or_else(|| DecodeError::MalformedLine(line.to_string()))?;

    match (spec.kind, groups.as_slice()) {
        (FieldKind::Text, [text]) => Ok(Value::Text(text.to_string())),
        (FieldKind::Integer, [text]) => {
            let (number, unit) = split_unit(text);
            if !unit.is_empty() && unit != spec.unit {
                return Err(DecodeError::InvalidUnit {
                    field: spec.name,
                    unit: unit.to_string(),
                });
            }
            number
                .parse()
                .map(Value::Integer)
                .map_err(|_| invalid_value(spec, number))
        }
        (FieldKind::Fixed, [text]) => parse_fixed(spec, text).map(Value::Fixed),
        (FieldKind::TimestampedFixed, [timestamp, text]) => Ok(Value::Timestamped {
            timestamp: timestamp.to_string(),
            value: parse_fixed(spec, text)?,
        }),
        _ => Err(DecodeError::MalformedLine(line.to_string())),
    }
}

fn parse_fixed(spec: &'static FieldSpec, text: &str) -> Result<FixedValue, DecodeError> {
    let (number, unit) = split_unit(text);
    if unit == spec.unit {
        FixedValue::parse_decimal(number).ok_or_else(|| invalid_value(spec, number))
    } else if spec.base_unit() == Some(unit) {
        FixedValue::parse_milli(number).ok_or_else(|| invalid_value(spec, number))
    } else {
        Err(DecodeError::InvalidUnit {
            field: spec.name,
            unit: unit.to_string(),
        })
    }
}

fn invalid_value(spec: &'static FieldSpec, value: &str) -> DecodeError {
    DecodeError::InvalidValue {
        field: spec.name,
        value: value.to_string(),
    }
}

/// `01.193*kW` -> (`01.193`, `kW`)
fn split_unit(text: &str) -> (&str, &str) {
    text.split_once('*').unwrap_or((text, ""))
}

/// `(a)(b)` -> [`a`, `b`]
fn split_groups(mut rest: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('(')?;
        let close = inner.find(')')?;
        groups.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    if groups.is_empty() {
        None
    } else {
        Some(groups)
    }
}
