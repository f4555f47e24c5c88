use crate::dsmr::Value;

/// Canonical wire text of a decoded value.
///
/// Fixed-point readings always carry exactly three decimals, independent of
/// how many digits the meter sent. Timestamped readings render as their
/// value; the timestamp is published separately when configured.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Fixed(fixed) => fixed.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Timestamped { value, .. } => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsmr::FixedValue;

    #[test]
    fn fixed_values_have_three_decimals() {
        assert_eq!(
            format_value(&Value::Fixed(FixedValue::parse_decimal("1.2").unwrap())),
            "1.200"
        );
        assert_eq!(format_value(&Value::Fixed(FixedValue::from_milli(0))), "0.000");
        assert_eq!(
            format_value(&Value::Fixed(FixedValue::parse_decimal("0001.234").unwrap())),
            "1.234"
        );
    }

    #[test]
    fn integers_and_text_are_natural() {
        assert_eq!(format_value(&Value::Integer(42)), "42");
        assert_eq!(format_value(&Value::Integer(0)), "0");
        assert_eq!(format_value(&Value::Text("KFM5KAIFA-METER".into())), "KFM5KAIFA-METER");
    }

    #[test]
    fn timestamped_value_formats_as_value() {
        let value = Value::Timestamped {
            timestamp: "161129200000W".into(),
            value: FixedValue::from_milli(981_443),
        };
        assert_eq!(format_value(&value), "981.443");
        assert_eq!(value.timestamp(), Some("161129200000W"));
    }
}
