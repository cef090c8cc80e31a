//! Parameter escaper (C3): renders application values into SQL literal bytes
//! safe under the session charset, and splices bulk `INSERT` statements for
//! `executemany`.

use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// A tagged parameter value (spec.md §9 "Dynamic parameter typing").
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Pre-formatted exact decimal text, inserted as a bare numeric literal.
    Decimal(Box<str>),
    Bytes(Vec<u8>),
    Str(Box<str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Duration(Duration),
    Seq(Vec<Param>),
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}
impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}
impl From<u64> for Param {
    fn from(v: u64) -> Self {
        Param::UInt(v)
    }
}
impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}
impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Str(v.into_boxed_str())
    }
}
impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Str(v.into())
    }
}
impl From<Vec<u8>> for Param {
    fn from(v: Vec<u8>) -> Self {
        Param::Bytes(v)
    }
}

/// Either positional (`%s`) or named (`%(name)s`) parameters.
pub enum Params {
    Positional(Vec<Param>),
    Named(std::collections::HashMap<String, Param>),
    None,
}

/// Render one value into its SQL literal byte form (spec.md §4.3).
///
/// `charset_name` is threaded through for [`Param::Seq`] recursion and to
/// keep this function's signature stable for callers that need it, but
/// `Param::Str`/`Param::Bytes` are currently escaped and emitted as raw
/// UTF-8/binary bytes regardless of its value: this is correct for the
/// `utf8mb4` default (and any other ASCII-compatible single-byte charset),
/// but a session charset whose multi-byte encoding can produce a trailing
/// byte equal to `\` (e.g. `sjis`, `gbk`) is not re-encoded here, which can
/// misplace the escape relative to what the server decodes. Safe as long as
/// the session charset is `utf8`/`utf8mb4`/`latin1`/`ascii`-family; a
/// caller on a different charset should encode `Param::Str` into
/// `Param::Bytes` themselves first.
#[allow(clippy::only_used_in_recursion)]
pub fn render(param: &Param, charset_name: &str) -> Result<Vec<u8>> {
    Ok(match param {
        Param::Null => b"NULL".to_vec(),
        Param::Bool(b) => if *b { b"1".to_vec() } else { b"0".to_vec() },
        Param::Int(i) => {
            let mut buf = itoa::Buffer::new();
            buf.format(*i).as_bytes().to_vec()
        }
        Param::UInt(u) => {
            let mut buf = itoa::Buffer::new();
            buf.format(*u).as_bytes().to_vec()
        }
        Param::Float(f) => render_float(*f),
        Param::Decimal(d) => d.as_bytes().to_vec(),
        Param::Bytes(bytes) => escape_bytes(bytes),
        Param::Str(s) => escape_bytes(s.as_bytes()),
        Param::Date(d) => quote(format!("{}", d.format("%Y-%m-%d"))),
        Param::DateTime(dt) => quote(render_datetime(dt)),
        Param::Time(t) => quote(render_time_of_day(t)),
        Param::Duration(d) => quote(render_duration(d)),
        Param::Seq(items) => {
            let mut out = Vec::new();
            out.push(b'(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend(render(item, charset_name)?);
            }
            out.push(b')');
            out
        }
    })
}

fn render_float(f: f64) -> Vec<u8> {
    if f.is_nan() || f.is_infinite() {
        return b"NULL".to_vec();
    }
    let mut buf = ryu::Buffer::new();
    buf.format(f).as_bytes().to_vec()
}

fn render_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond().is_multiple_of(1000) && dt.nanosecond() != 0 {
        format!(
            "{}.{:06}",
            dt.format("%Y-%m-%d %H:%M:%S"),
            dt.nanosecond() / 1000
        )
    } else {
        format!("{}", dt.format("%Y-%m-%d %H:%M:%S"))
    }
}

fn render_time_of_day(t: &NaiveTime) -> String {
    if t.nanosecond() != 0 {
        format!("{}.{:06}", t.format("%H:%M:%S"), t.nanosecond() / 1000)
    } else {
        format!("{}", t.format("%H:%M:%S"))
    }
}

/// Render an elapsed-time parameter as a MySQL `TIME` literal; unlike
/// `NaiveTime` this may exceed 24 hours (spec.md §4.2 TIME's -838:59:59 range).
fn render_duration(d: &Duration) -> String {
    let negative = d.num_microseconds().unwrap_or(0) < 0;
    let abs = if negative { -*d } else { *d };

    let total_micros = abs.num_microseconds().unwrap_or(0);
    let hours = total_micros / 3_600_000_000;
    let minutes = (total_micros / 60_000_000) % 60;
    let seconds = (total_micros / 1_000_000) % 60;
    let micros = total_micros % 1_000_000;

    let sign = if negative { "-" } else { "" };
    if micros != 0 {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}

fn quote(s: String) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + 2);
    out.push(b'\'');
    out.append(&mut escape_bytes_inner(s.as_bytes()));
    out.push(b'\'');
    out
}

/// Escape `\0 \n \r \\ ' " \x1a` and wrap in single quotes (spec.md §4.3).
fn escape_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'\'');
    out.extend(escape_bytes_inner(bytes));
    out.push(b'\'');
    out
}

fn escape_bytes_inner(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            0x00 => out.extend_from_slice(b"\\0"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\'' => out.extend_from_slice(b"\\'"),
            b'"' => out.extend_from_slice(b"\\\""),
            0x1a => out.extend_from_slice(b"\\Z"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Clone, Copy, PartialEq)]
enum ScanState {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    LineComment,
    BlockComment,
}

/// Replace `%s`/`%(name)s` placeholders with rendered parameter bytes,
/// skipping occurrences inside string/identifier literals and comments
/// (spec.md §4.3). `%%` is a literal percent, never a placeholder.
pub fn format(sql: &[u8], params: &Params, charset_name: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(sql.len());
    let mut state = ScanState::Normal;
    let mut positional_idx = 0usize;
    let mut i = 0usize;

    macro_rules! next_positional {
        () => {{
            let Params::Positional(values) = params else {
                return Err(Error::interface("query uses %s but named parameters were supplied"));
            };
            let value = values.get(positional_idx).ok_or_else(|| {
                Error::interface("not enough parameters for the placeholders in the query")
            })?;
            positional_idx += 1;
            value
        }};
    }

    while i < sql.len() {
        let b = sql[i];

        match state {
            ScanState::Normal => match b {
                b'\'' => {
                    state = ScanState::SingleQuote;
                    out.push(b);
                    i += 1;
                }
                b'"' => {
                    state = ScanState::DoubleQuote;
                    out.push(b);
                    i += 1;
                }
                b'`' => {
                    state = ScanState::Backtick;
                    out.push(b);
                    i += 1;
                }
                b'-' if sql.get(i + 1) == Some(&b'-') => {
                    state = ScanState::LineComment;
                    out.push(b);
                    i += 1;
                }
                b'#' => {
                    state = ScanState::LineComment;
                    out.push(b);
                    i += 1;
                }
                b'/' if sql.get(i + 1) == Some(&b'*') => {
                    state = ScanState::BlockComment;
                    out.push(b);
                    i += 1;
                }
                b'%' if sql.get(i + 1) == Some(&b'%') => {
                    out.push(b'%');
                    i += 2;
                }
                b'%' if sql.get(i + 1) == Some(&b's') => {
                    let value = next_positional!();
                    out.extend(render(value, charset_name)?);
                    i += 2;
                }
                b'%' if sql.get(i + 1) == Some(&b'(') => {
                    let close = sql[i + 2..]
                        .iter()
                        .position(|&c| c == b')')
                        .ok_or_else(|| Error::interface("unterminated %(name)s placeholder"))?;
                    let name_start = i + 2;
                    let name_end = name_start + close;
                    if sql.get(name_end + 1) != Some(&b's') {
                        return Err(Error::interface("malformed %(name)s placeholder"));
                    }
                    let name = std::str::from_utf8(&sql[name_start..name_end])?;
                    let Params::Named(map) = params else {
                        return Err(Error::interface(
                            "query uses %(name)s but positional parameters were supplied",
                        ));
                    };
                    let value = map
                        .get(name)
                        .ok_or_else(|| Error::interface(format!("missing named parameter: {name}")))?;
                    out.extend(render(value, charset_name)?);
                    i = name_end + 2;
                }
                _ => {
                    out.push(b);
                    i += 1;
                }
            },
            ScanState::SingleQuote => {
                if b == b'\\' {
                    out.push(b);
                    if let Some(&next) = sql.get(i + 1) {
                        out.push(next);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    continue;
                }
                if b == b'%' && sql.get(i + 1) == Some(&b'%') {
                    out.push(b'%');
                    i += 2;
                    continue;
                }
                out.push(b);
                if b == b'\'' {
                    state = ScanState::Normal;
                }
                i += 1;
            }
            ScanState::DoubleQuote => {
                out.push(b);
                if b == b'\\' {
                    if let Some(&next) = sql.get(i + 1) {
                        out.push(next);
                        i += 2;
                        continue;
                    }
                }
                if b == b'"' {
                    state = ScanState::Normal;
                }
                i += 1;
            }
            ScanState::Backtick => {
                out.push(b);
                if b == b'`' {
                    state = ScanState::Normal;
                }
                i += 1;
            }
            ScanState::LineComment => {
                out.push(b);
                if b == b'\n' {
                    state = ScanState::Normal;
                }
                i += 1;
            }
            ScanState::BlockComment => {
                out.push(b);
                if b == b'/' && sql.get(i.wrapping_sub(1)) == Some(&b'*') {
                    state = ScanState::Normal;
                }
                i += 1;
            }
        }
    }

    Ok(out)
}

static INSERT_VALUES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^(\s*insert\s+.+?\bvalues\s*)(\(.+\))(\s*(?:on\s+duplicate\s+key\s+update\s+.*)?)$")
        .unwrap()
});

/// Split an `INSERT ... VALUES (...)[ ON DUPLICATE KEY UPDATE ...]` template
/// into `(prefix, values_template, suffix)`, for the bulk-insert
/// optimization in `executemany` (spec.md §4.3).
pub fn split_insert_values(sql: &str) -> Option<(String, String, String)> {
    let captures = INSERT_VALUES.captures(sql)?;
    Some((
        captures[1].to_string(),
        captures[2].to_string(),
        captures[3].to_string(),
    ))
}

/// Render the `executemany` bulk-insert batches for an `INSERT ... VALUES`
/// template, bounded by `max_allowed_packet` (spec.md §4.3, §8 invariant).
pub fn render_bulk_insert(
    prefix: &str,
    template: &str,
    suffix: &str,
    rows: &[Params],
    charset_name: &str,
    max_allowed_packet: usize,
) -> Result<Vec<Vec<u8>>> {
    let mut statements = Vec::new();
    let mut current = prefix.as_bytes().to_vec();
    let mut current_rows = 0usize;

    for row in rows {
        let rendered_row = format(template.as_bytes(), row, charset_name)?;

        let projected_len = current.len() + rendered_row.len() + suffix.len() + 1;
        if current_rows > 0 && projected_len > max_allowed_packet {
            current.extend_from_slice(suffix.as_bytes());
            statements.push(std::mem::replace(&mut current, prefix.as_bytes().to_vec()));
            current_rows = 0;
        }

        if current_rows > 0 {
            current.push(b',');
        }
        current.extend(rendered_row);
        current_rows += 1;
    }

    if current_rows > 0 {
        current.extend_from_slice(suffix.as_bytes());
        statements.push(current);
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(values: Vec<Param>) -> Params {
        Params::Positional(values)
    }

    #[test]
    fn escapes_strings_with_special_characters() {
        let out = render(&Param::Str("hello'\" world".into()), "utf8mb4").unwrap();
        assert_eq!(out, b"'hello\\'\\\" world'");
    }

    #[test]
    fn placeholder_inside_string_literal_is_not_substituted() {
        let sql = b"select '%s' from t where x = %s";
        let params = positional(vec![Param::Int(5)]);
        let out = format(sql, &params, "utf8mb4").unwrap();
        assert_eq!(out, b"select '%s' from t where x = 5");
    }

    #[test]
    fn percent_percent_is_a_literal_percent() {
        let sql = b"select '100%%' , %s";
        let params = positional(vec![Param::Int(1)]);
        let out = format(sql, &params, "utf8mb4").unwrap();
        assert_eq!(out, b"select '100%' , 1");
    }

    #[test]
    fn in_clause_renders_sequence_as_parenthesized_list() {
        let sql = b"select l from t where i in %s order by i";
        let params = positional(vec![Param::Seq(vec![Param::Int(2), Param::Int(6)])]);
        let out = format(sql, &params, "utf8mb4").unwrap();
        assert_eq!(out, b"select l from t where i in (2,6) order by i");
    }

    #[test]
    fn splices_bulk_insert_values() {
        let (prefix, template, suffix) =
            split_insert_values("insert into bulkinsert (id,name,age,height) values (%s,%s,%s,%s)")
                .unwrap();

        let rows = vec![
            positional(vec![Param::Int(0), Param::Str("bob".into()), Param::Int(21), Param::Int(123)]),
            positional(vec![Param::Int(1), Param::Str("jim".into()), Param::Int(56), Param::Int(45)]),
            positional(vec![Param::Int(2), Param::Str("fred".into()), Param::Int(100), Param::Int(180)]),
        ];

        let statements = render_bulk_insert(&prefix, &template, &suffix, &rows, "utf8mb4", 1 << 20).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            std::str::from_utf8(&statements[0]).unwrap(),
            "insert into bulkinsert (id,name,age,height) values (0,'bob',21,123),(1,'jim',56,45),(2,'fred',100,180)"
        );
    }

    #[test]
    fn bulk_insert_splits_on_max_allowed_packet() {
        let (prefix, template, suffix) = split_insert_values("insert into t (a) values (%s)").unwrap();
        let rows: Vec<Params> = (0..5).map(|i| positional(vec![Param::Int(i)])).collect();

        // each row renders to "(N)" (3 bytes); force a split after 2 rows
        let budget = prefix.len() + 3 + 1 + 3 + suffix.len();
        let statements = render_bulk_insert(&prefix, &template, &suffix, &rows, "utf8mb4", budget).unwrap();
        assert!(statements.len() > 1);
        for s in &statements {
            assert!(s.starts_with(prefix.as_bytes()));
        }
    }

    #[test]
    fn renders_negative_time_duration() {
        let out = render(&Param::Duration(-Duration::microseconds(
            (23 * 3600 + 12 * 60 + 59) * 1_000_000 + 51_000,
        )), "utf8mb4").unwrap();
        assert_eq!(out, b"'-23:12:59.051000'");
    }
}
