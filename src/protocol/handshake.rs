use super::{Capabilities, Decode, Status};
use crate::error::{protocol_err, Result};
use crate::io::Buf;
use byteorder::LittleEndian;

/// Initial Handshake Packet v10.
/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_v10.html
#[derive(Debug)]
pub struct Handshake {
    pub protocol_version: u8,
    pub server_version: Box<str>,
    pub connection_id: u32,
    pub server_capabilities: Capabilities,
    pub server_default_collation: u8,
    pub status: Status,
    pub auth_plugin_name: Option<Box<str>>,
    pub auth_plugin_data: Box<[u8]>,
}

impl<'a> Decode<'a> for Handshake {
    fn decode(mut buf: &'a [u8]) -> Result<Self> {
        let protocol_version = buf.get_u8()?;
        if protocol_version != 10 {
            return Err(protocol_err!(
                "unsupported handshake protocol version: {protocol_version}"
            )
            .into());
        }

        let server_version = buf.get_str_nul()?.into();
        let connection_id = buf.get_u32::<LittleEndian>()?;

        let mut scramble = Vec::with_capacity(20);
        scramble.extend_from_slice(buf.get_bytes(8)?);
        buf.advance(1); // filler

        let capabilities_1 = buf.get_u16::<LittleEndian>()?;
        let mut capabilities = Capabilities::from_bits_truncate(u64::from(capabilities_1));

        let server_default_collation = buf.get_u8()?;
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);

        let capabilities_2 = buf.get_u16::<LittleEndian>()?;
        capabilities |= Capabilities::from_bits_truncate(u64::from(capabilities_2) << 16);

        let auth_plugin_data_len = buf.get_u8()?;
        buf.advance(10); // reserved

        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            let len = ((auth_plugin_data_len as isize) - 8).max(13) as usize;
            // exclude the trailing NUL the server always appends to this part
            let part2 = buf.get_bytes(len)?;
            scramble.extend_from_slice(&part2[..part2.len().saturating_sub(1)]);
        }

        let auth_plugin_name = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            Some(buf.get_str_nul()?.into())
        } else {
            None
        };

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            server_capabilities: capabilities,
            server_default_collation,
            status,
            auth_plugin_name,
            auth_plugin_data: scramble.into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    const HANDSHAKE_MARIA_DB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";

    #[test]
    fn reads_mariadb_handshake() {
        let handshake = Handshake::decode(HANDSHAKE_MARIA_DB_10_4_7).unwrap();
        assert_eq!(handshake.protocol_version, 10);
        assert_eq!(
            &*handshake.server_version,
            "5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic"
        );
        assert!(handshake.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert_eq!(handshake.auth_plugin_data.len(), 20);
        assert_matches!(handshake.auth_plugin_name.as_deref(), Some("mysql_native_password"));
    }
}
