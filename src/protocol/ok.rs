use super::{Decode, Status};
use crate::error::{protocol_err, Result};
use crate::io::{Buf, BufExt};
use byteorder::LittleEndian;

/// OK packet, terminating a successful command (spec.md §4.7 result header).
#[derive(Debug)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: Status,
    pub warnings: u16,
    pub info: Box<str>,
}

impl<'a> Decode<'a> for OkPacket {
    fn decode(mut buf: &'a [u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0x00 && header != 0xFE {
            return Err(protocol_err!("expected 0x00 or 0xFE (OK); received 0x{:X}", header).into());
        }

        let affected_rows = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);
        let last_insert_id = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);
        let warnings = buf.get_u16::<LittleEndian>()?;
        let info = buf.get_str(buf.len())?.into();

        Ok(Self {
            affected_rows,
            last_insert_id,
            status,
            warnings,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_HANDSHAKE: &[u8] = b"\x00\x00\x00\x02@\x00\x00";

    #[test]
    fn decodes_ok_packet() {
        let p = OkPacket::decode(OK_HANDSHAKE).unwrap();
        assert_eq!(p.affected_rows, 0);
        assert_eq!(p.last_insert_id, 0);
        assert_eq!(p.warnings, 0);
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert!(p.info.is_empty());
    }
}
