use crate::error::Result;
use crate::io::BufExt;
use byteorder::LittleEndian;

/// Split a text-protocol row packet into `column_count` length-encoded
/// fields. A leading `0xFB` byte is the NULL sentinel (spec.md §4.9); every
/// other field is the field-type codec's (C2) input.
pub fn decode_text_row(mut buf: &[u8], column_count: usize) -> Result<Vec<Option<&[u8]>>> {
    let mut values = Vec::with_capacity(column_count);

    for _ in 0..column_count {
        let value = buf.get_bytes_lenenc::<LittleEndian>()?;
        values.push(value);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_null_and_value_fields() {
        // "ab" then NULL then "c"
        let packet = [2u8, b'a', b'b', 0xFB, 1, b'c'];
        let row = decode_text_row(&packet, 3).unwrap();
        assert_eq!(row[0], Some(&b"ab"[..]));
        assert_eq!(row[1], None);
        assert_eq!(row[2], Some(&b"c"[..]));
    }
}
