use super::{Decode, Status};
use crate::error::{protocol_err, Result};
use crate::io::Buf;
use byteorder::LittleEndian;

/// Legacy EOF packet terminator, used when `DEPRECATE_EOF` was not
/// negotiated (spec.md §4.7/§4.8).
#[derive(Debug)]
pub struct EofPacket {
    pub warnings: u16,
    pub status: Status,
}

impl<'a> Decode<'a> for EofPacket {
    fn decode(mut buf: &'a [u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFE {
            return Err(protocol_err!("expected 0xFE (EOF); received 0x{:X}", header).into());
        }

        let warnings = buf.get_u16::<LittleEndian>()?;
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);

        Ok(Self { warnings, status })
    }
}
