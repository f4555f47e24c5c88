use core::fmt;

/// Fixed-point reading stored as thousandths of its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FixedValue {
    milli: u32,
}

impl FixedValue {
    pub const fn from_milli(milli: u32) -> Self {
        Self { milli }
    }

    pub const fn milli(self) -> u32 {
        self.milli
    }

    /// Parse a decimal such as `01.193` or `230.0`. Digits past the third
    /// fractional digit are truncated.
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let whole: u32 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };

        let mut frac = 0u32;
        let mut digits = frac_part.bytes();
        for _ in 0..3 {
            let digit = digits.next().map(|b| (b - b'0') as u32).unwrap_or(0);
            frac = frac * 10 + digit;
        }

        whole.checked_mul(1000)?.checked_add(frac).map(Self::from_milli)
    }

    /// Parse an integer already expressed in thousandths (e.g. `W` for a `kW` field).
    pub fn parse_milli(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok().map(Self::from_milli)
    }
}

impl fmt::Display for FixedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.milli / 1000, self.milli % 1000)
    }
}

/// Decoded value of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Fixed(FixedValue),
    Integer(u32),
    /// Reading with the meter timestamp it was taken at (`YYMMDDhhmmssX`).
    Timestamped { timestamp: String, value: FixedValue },
}

impl Value {
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Value::Timestamped { timestamp, .. } => Some(timestamp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimals_into_thousandths() {
        assert_eq!(FixedValue::parse_decimal("01.193"), Some(FixedValue::from_milli(1193)));
        assert_eq!(FixedValue::parse_decimal("230.0"), Some(FixedValue::from_milli(230_000)));
        assert_eq!(FixedValue::parse_decimal("12"), Some(FixedValue::from_milli(12_000)));
        assert_eq!(FixedValue::parse_decimal("0.12345"), Some(FixedValue::from_milli(123)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(FixedValue::parse_decimal(""), None);
        assert_eq!(FixedValue::parse_decimal("."), None);
        assert_eq!(FixedValue::parse_decimal("1,5"), None);
        assert_eq!(FixedValue::parse_decimal("-1.0"), None);
        assert_eq!(FixedValue::parse_decimal("99999999.0"), None);
        assert_eq!(FixedValue::parse_milli("12a"), None);
    }

    #[test]
    fn base_unit_integers_are_thousandths() {
        assert_eq!(FixedValue::parse_milli("001193"), Some(FixedValue::from_milli(1193)));
    }

    #[test]
    fn display_always_has_three_decimals() {
        assert_eq!(FixedValue::from_milli(1200).to_string(), "1.200");
        assert_eq!(FixedValue::from_milli(0).to_string(), "0.000");
        assert_eq!(FixedValue::from_milli(12_785_123).to_string(), "12785.123");
    }
}
