use super::{Decode, FieldFlags, TypeId};
use crate::error::{protocol_err, Result};
use crate::io::{Buf, BufExt};
use byteorder::LittleEndian;

/// `ColumnDefinition41` packet (spec.md §3, §4.7). The alias is the column's
/// public name, per spec.md's data model.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub schema: Box<str>,
    pub table: Box<str>,
    pub table_alias: Box<str>,
    pub column: Box<str>,
    pub column_alias: Box<str>,
    pub char_set: u16,
    pub column_length: u32,
    pub type_id: TypeId,
    pub flags: FieldFlags,
    pub decimals: u8,
}

impl ColumnDefinition {
    pub fn name(&self) -> &str {
        if self.column_alias.is_empty() {
            &self.column
        } else {
            &self.column_alias
        }
    }
}

impl<'a> Decode<'a> for ColumnDefinition {
    fn decode(mut buf: &'a [u8]) -> Result<Self> {
        let catalog = buf.get_str_lenenc::<LittleEndian>()?;
        if catalog != Some("def") {
            return Err(protocol_err!("expected catalog \"def\"; received {catalog:?}").into());
        }

        let schema = buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default().into();
        let table_alias = buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default().into();
        let table = buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default().into();
        let column_alias = buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default().into();
        let column = buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default().into();

        let fixed_len = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);
        if fixed_len != 0x0c {
            return Err(protocol_err!("expected fixed-length field 0x0c; received {fixed_len}").into());
        }

        let char_set = buf.get_u16::<LittleEndian>()?;
        let column_length = buf.get_u32::<LittleEndian>()?;
        let type_id = TypeId(buf.get_u8()?);
        let flags = FieldFlags::from_bits_truncate(buf.get_u16::<LittleEndian>()?);
        let decimals = buf.get_u8()?;

        Ok(Self {
            schema,
            table,
            table_alias,
            column,
            column_alias,
            char_set,
            column_length,
            type_id,
            flags,
            decimals,
        })
    }
}
