use super::AuthPlugin;
use crate::error::{Error, Result};

/// Sends the password verbatim plus a NUL terminator. Per spec.md §4.5 this
/// must refuse unless the channel is secure (TLS or a local unix socket) or
/// the caller explicitly opts in (spec.md's Open Question 2, resolved in
/// SPEC_FULL.md §9: refuse by default).
pub struct MySqlClearPassword;

impl AuthPlugin for MySqlClearPassword {
    fn name(&self) -> &'static str {
        "mysql_clear_password"
    }

    fn initial(&self, _scramble: &[u8], password: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(password.len() + 1);
        out.extend_from_slice(password.as_bytes());
        out.push(0);
        Ok(out)
    }
}

/// Guard used by the handshake engine before it will invoke this plugin's
/// `initial`, since the plugin itself has no view of transport security.
pub fn require_secure_channel(secure_channel: bool, allow_cleartext: bool) -> Result<()> {
    if secure_channel || allow_cleartext {
        Ok(())
    } else {
        Err(Error::operational(
            "refusing to send mysql_clear_password outside TLS/unix-socket; \
             set MySqlConnectOptions::allow_cleartext_password(true) to override",
        ))
    }
}
