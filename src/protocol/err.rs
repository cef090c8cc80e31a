use super::Decode;
use crate::error::{protocol_err, Result, ServerError};
use crate::io::Buf;
use byteorder::LittleEndian;

/// ERR packet (spec.md §4.7 result header / §7).
pub struct ErrPacket(pub ServerError);

impl<'a> Decode<'a> for ErrPacket {
    fn decode(mut buf: &'a [u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFF {
            return Err(protocol_err!("expected 0xFF (ERR); received 0x{:X}", header).into());
        }

        let code = buf.get_u16::<LittleEndian>()?;
        let _marker = buf.get_u8()?; // '#'
        let sqlstate = buf.get_str(5)?.into();
        let message = buf.get_str(buf.len())?.into();

        Ok(Self(ServerError { code, sqlstate, message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERR_UNKNOWN_DB: &[u8] = b"\xff\x19\x04#42000Unknown database 'unknown'";

    #[test]
    fn decodes_err_packet() {
        let p = ErrPacket::decode(ERR_UNKNOWN_DB).unwrap();
        assert_eq!(p.0.code, 1049);
        assert_eq!(&*p.0.sqlstate, "42000");
        assert_eq!(&*p.0.message, "Unknown database 'unknown'");
    }
}
