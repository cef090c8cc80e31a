//! Wire packet payloads: handshake, auth continuation, command, and result
//! header shapes. Framing itself (length/sequence-id framing, continuation
//! of >16MiB packets) lives in [`crate::framer`]; this module only knows how
//! to turn a packet's payload bytes into/from Rust values.

mod auth_switch;
mod capabilities;
mod column_def;
mod com;
mod eof;
mod err;
mod field;
mod handshake;
mod handshake_response;
mod ok;
mod row;
mod status;
mod type_id;

pub use auth_switch::AuthSwitchRequest;
pub use capabilities::Capabilities;
pub use column_def::ColumnDefinition;
pub use com::{ComInitDb, ComPing, ComProcessKill, ComQuery, ComQuit, Command};
pub use eof::EofPacket;
pub use err::ErrPacket;
pub use field::FieldFlags;
pub use handshake::Handshake;
pub use handshake_response::HandshakeResponse;
pub use ok::OkPacket;
pub use row::decode_text_row;
pub use status::Status;
pub use type_id::TypeId;

use crate::error::Result;

/// Decode a packet payload into a protocol value.
pub trait Decode<'a>: Sized {
    fn decode(buf: &'a [u8]) -> Result<Self>;
}

/// Encode a value into a packet payload, capability-aware (some fields are
/// only present/sized differently depending on negotiated capabilities).
pub trait Encode {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities);
}

/// First byte of a generic result-header packet.
pub enum ResultHeader {
    Ok,
    Err,
    LocalInfile,
    ResultSet { column_count: u64 },
}

pub fn peek_result_header(buf: &[u8]) -> Result<ResultHeader> {
    use crate::io::BufExt;

    let first = *buf.first().ok_or_else(|| {
        crate::error::Error::protocol("empty packet where a result header was expected")
    })?;

    match first {
        0x00 => Ok(ResultHeader::Ok),
        0xFF => Ok(ResultHeader::Err),
        0xFB => Ok(ResultHeader::LocalInfile),
        0xFE if buf.len() < 9 => Ok(ResultHeader::Ok),
        _ => {
            let mut b = buf;
            let column_count = b
                .get_uint_lenenc::<byteorder::LittleEndian>()?
                .ok_or_else(|| crate::error::Error::protocol("malformed column count"))?;
            Ok(ResultHeader::ResultSet { column_count })
        }
    }
}
