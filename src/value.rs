//! Field-type codec (C2): decodes a column's textual representation into a
//! typed scalar, dispatching on `(type_id, flags, column_charset)`.

use crate::charset;
use crate::error::{Error, Result};
use crate::protocol::{ColumnDefinition, TypeId};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Signed(i64),
    Unsigned(u64),
    Double(f64),
    /// Exact decimal value, string-preserving (spec.md §4.2).
    Decimal(Box<str>),
    Bytes(Vec<u8>),
    Text(Box<str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// A signed duration; MySQL's TIME type ranges -838:59:59..838:59:59,
    /// wider than a single day, hence `chrono::Duration` rather than `NaiveTime`.
    Time(Duration),
    Year(i32),
    Bit(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Decode one text-protocol field. `raw` is `None` for the row decoder's
/// `0xFB` NULL sentinel (spec.md §4.9); every other case is this function's
/// job, including the zero-date-is-null rule from spec.md §4.2.
pub fn decode_text(raw: Option<&[u8]>, column: &ColumnDefinition) -> Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Null);
    };

    match column.type_id {
        TypeId::TINY | TypeId::SHORT | TypeId::LONG | TypeId::INT24 | TypeId::LONGLONG => {
            let text = text_of(raw)?;
            if column.flags.contains(crate::protocol::FieldFlags::UNSIGNED) {
                text.parse::<u64>()
                    .map(Value::Unsigned)
                    .map_err(|e| conv_err(column, text, e))
            } else {
                text.parse::<i64>()
                    .map(Value::Signed)
                    .map_err(|e| conv_err(column, text, e))
            }
        }

        TypeId::YEAR => {
            let text = text_of(raw)?;
            text.parse::<i32>()
                .map(Value::Year)
                .map_err(|e| conv_err(column, text, e))
        }

        TypeId::FLOAT | TypeId::DOUBLE => {
            let text = text_of(raw)?;
            text.parse::<f64>()
                .map(Value::Double)
                .map_err(|e| conv_err(column, text, e))
        }

        TypeId::DECIMAL | TypeId::NEWDECIMAL => Ok(Value::Decimal(text_of(raw)?.into())),

        TypeId::DATE => decode_date(raw, column),
        TypeId::DATETIME | TypeId::TIMESTAMP => decode_datetime(raw, column),
        TypeId::TIME => decode_time(raw, column),

        TypeId::BIT => Ok(Value::Bit(raw.to_vec())),

        TypeId::JSON => Ok(Value::Text(text_of(raw)?.into())),
        TypeId::ENUM | TypeId::SET => Ok(Value::Text(text_of(raw)?.into())),

        _ if column.type_id.is_blob_like() => {
            if column.flags.contains(crate::protocol::FieldFlags::BINARY)
                || charset::is_binary(column.char_set)
            {
                Ok(Value::Bytes(raw.to_vec()))
            } else {
                Ok(Value::Text(text_of(raw)?.into()))
            }
        }

        _ => Ok(Value::Bytes(raw.to_vec())),
    }
}

fn text_of(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).map_err(Into::into)
}

fn conv_err(column: &ColumnDefinition, text: &str, err: impl std::fmt::Display) -> Error {
    Error::interface(format!(
        "could not convert column `{}` value {text:?} to its declared type: {err}",
        column.name()
    ))
}

/// `0000-00-00` is an in-band null (spec.md §4.2, §8 scenario 2/invariant).
fn is_zero_date(text: &str) -> bool {
    text.starts_with("0000-00-00")
}

fn decode_date(raw: &[u8], column: &ColumnDefinition) -> Result<Value> {
    let text = text_of(raw)?;
    if is_zero_date(text) {
        return Ok(Value::Null);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Value::Date)
        .map_err(|e| conv_err(column, text, e))
}

fn decode_datetime(raw: &[u8], column: &ColumnDefinition) -> Result<Value> {
    let text = text_of(raw)?;
    if is_zero_date(text) {
        return Ok(Value::Null);
    }

    let (date_part, time_part) = text.split_once(' ').unwrap_or((text, "00:00:00"));
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| conv_err(column, text, e))?;
    let time = parse_naive_time(time_part).map_err(|e| conv_err(column, text, e))?;

    Ok(Value::DateTime(NaiveDateTime::new(date, time)))
}

fn parse_naive_time(text: &str) -> std::result::Result<NaiveTime, chrono::ParseError> {
    if text.contains('.') {
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
    } else {
        NaiveTime::parse_from_str(text, "%H:%M:%S")
    }
}

/// MySQL's TIME literal form is `[-]HHH:MM:SS[.ffffff]`, hours unbounded up
/// to 838 (spec.md §4.2, §8 scenario 6).
fn decode_time(raw: &[u8], column: &ColumnDefinition) -> Result<Value> {
    let text = text_of(raw)?;
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, text),
    };

    let mut parts = rest.splitn(2, '.');
    let hms = parts.next().unwrap_or_default();
    let frac = parts.next();

    let mut hms_parts = hms.splitn(3, ':');
    let hours: i64 = hms_parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| conv_err(column, text, e))?;
    let minutes: i64 = hms_parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| conv_err(column, text, e))?;
    let seconds: i64 = hms_parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| conv_err(column, text, e))?;

    let micros: i64 = match frac {
        Some(f) => {
            let mut digits = f.to_string();
            while digits.len() < 6 {
                digits.push('0');
            }
            digits.truncate(6);
            digits.parse().map_err(|e| conv_err(column, text, e))?
        }
        None => 0,
    };

    let total_micros = ((hours * 3600 + minutes * 60 + seconds) * 1_000_000 + micros) * sign;
    Ok(Value::Time(Duration::microseconds(total_micros)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FieldFlags;

    fn column(type_id: TypeId, flags: FieldFlags, char_set: u16) -> ColumnDefinition {
        ColumnDefinition {
            schema: "".into(),
            table: "".into(),
            table_alias: "".into(),
            column: "c".into(),
            column_alias: "".into(),
            char_set,
            column_length: 0,
            type_id,
            flags,
            decimals: 0,
        }
    }

    #[test]
    fn decodes_signed_integer() {
        let col = column(TypeId::LONG, FieldFlags::empty(), 33);
        assert_eq!(decode_text(Some(b"-3"), &col).unwrap(), Value::Signed(-3));
    }

    #[test]
    fn decodes_unsigned_integer() {
        let col = column(TypeId::LONGLONG, FieldFlags::UNSIGNED, 33);
        assert_eq!(
            decode_text(Some(b"123456789012"), &col).unwrap(),
            Value::Unsigned(123456789012)
        );
    }

    #[test]
    fn zero_date_decodes_to_null() {
        let col = column(TypeId::DATE, FieldFlags::empty(), 33);
        assert_eq!(decode_text(Some(b"0000-00-00"), &col).unwrap(), Value::Null);
    }

    #[test]
    fn decodes_negative_time_with_fractional_seconds() {
        let col = column(TypeId::TIME, FieldFlags::empty(), 33);
        let value = decode_text(Some(b"-23:12:59.05100"), &col).unwrap();
        match value {
            Value::Time(d) => {
                assert_eq!(d, -Duration::microseconds((23 * 3600 + 12 * 60 + 59) * 1_000_000 + 51_000));
            }
            _ => panic!("expected Time"),
        }
    }

    #[test]
    fn decodes_blob_as_bytes_when_binary() {
        let col = column(TypeId::VAR_STRING, FieldFlags::BINARY, 63);
        assert_eq!(
            decode_text(Some(b"binary\x00data"), &col).unwrap(),
            Value::Bytes(b"binary\x00data".to_vec())
        );
    }

    #[test]
    fn decodes_string_as_text_when_not_binary() {
        let col = column(TypeId::VAR_STRING, FieldFlags::empty(), 45);
        assert_eq!(
            decode_text(Some("hello'\" world".as_bytes()), &col).unwrap(),
            Value::Text("hello'\" world".into())
        );
    }

    #[test]
    fn null_sentinel_decodes_to_null_regardless_of_type() {
        let col = column(TypeId::LONG, FieldFlags::empty(), 33);
        assert_eq!(decode_text(None, &col).unwrap(), Value::Null);
    }
}
