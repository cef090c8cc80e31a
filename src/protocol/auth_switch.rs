use super::Decode;
use crate::error::Result;
use crate::io::Buf;

/// `AuthSwitchRequest` (0xFE), sent when the server wants a different auth
/// plugin than the one offered in the handshake (spec.md §4.6 step 5).
#[derive(Debug)]
pub struct AuthSwitchRequest {
    pub plugin_name: Box<str>,
    pub plugin_data: Box<[u8]>,
}

impl<'a> Decode<'a> for AuthSwitchRequest {
    fn decode(mut buf: &'a [u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFE {
            return Err(crate::error::protocol_err!(
                "expected 0xFE (AuthSwitchRequest); received 0x{:X}",
                header
            )
            .into());
        }

        let plugin_name = buf.get_str_nul()?.into();
        // remaining bytes are the new scramble, possibly NUL-terminated
        let data = if buf.last() == Some(&0) {
            &buf[..buf.len() - 1]
        } else {
            buf
        };

        Ok(Self {
            plugin_name,
            plugin_data: data.into(),
        })
    }
}
