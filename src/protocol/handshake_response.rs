use super::{Capabilities, Encode};
use crate::io::{BufMut, BufMutExt};
use byteorder::LittleEndian;

/// HandshakeResponse41, per spec.md §4.6 step 4.
#[derive(Debug)]
pub struct HandshakeResponse<'a> {
    pub max_packet_size: u32,
    pub client_collation: u8,
    pub username: &'a str,
    pub database: Option<&'a str>,
    pub auth_plugin_name: &'a str,
    pub auth_response: &'a [u8],
    pub connect_attrs: &'a [(String, String)],
}

impl Encode for HandshakeResponse<'_> {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        buf.put_u32::<LittleEndian>(capabilities.bits() as u32);
        buf.put_u32::<LittleEndian>(self.max_packet_size);
        buf.put_u8(self.client_collation);
        buf.advance(23); // reserved

        buf.put_str_nul(self.username);

        if capabilities.contains(Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA) {
            buf.put_bytes_lenenc::<LittleEndian>(self.auth_response);
        } else if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            buf.put_u8(self.auth_response.len() as u8);
            buf.put_bytes(self.auth_response);
        } else {
            buf.put_u8(0);
        }

        if capabilities.contains(Capabilities::CONNECT_WITH_DB) {
            if let Some(database) = self.database {
                buf.put_str_nul(database);
            }
        }

        if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.put_str_nul(self.auth_plugin_name);
        }

        if capabilities.contains(Capabilities::CONNECT_ATTRS) {
            let mut attrs = Vec::new();
            for (k, v) in self.connect_attrs {
                attrs.put_str_lenenc::<LittleEndian>(k);
                attrs.put_str_lenenc::<LittleEndian>(v);
            }
            buf.put_bytes_lenenc::<LittleEndian>(&attrs);
        }
    }
}
