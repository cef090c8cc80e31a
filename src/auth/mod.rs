//! Auth plugin set (C5): given the server scramble and the password, compute
//! an authentication reply, and handle plugin-switch / auth-more-data
//! continuations.
//!
//! Modeled as the capability-set interface from spec.md §9: `initial` renders
//! the first response bytes, `continue_with` drives any follow-up exchange
//! (fast-auth, full-auth RSA negotiation, ...).

mod caching_sha2;
mod clear_password;
mod native;
mod old_password;
mod sha256;

use crate::error::{Error, Result};

/// What the connection should do next after feeding the plugin a server
/// `AuthMoreData` (0x01) packet.
pub enum Continuation {
    /// Authentication is complete; no further bytes need to be sent.
    Done,
    /// Send these bytes back to the server as the next packet.
    Send(Vec<u8>),
    /// Ask the server for its RSA public key (`caching_sha2`/`sha256` full-auth).
    RequestPublicKey,
}

pub trait AuthPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// The initial authentication response sent in `HandshakeResponse41`.
    fn initial(&self, scramble: &[u8], password: &str) -> Result<Vec<u8>>;

    /// Handle an `AuthMoreData`/continuation packet. `secure_channel` is true
    /// when the transport is already TLS or a local unix socket, which is
    /// when cleartext/full-auth exchanges are allowed to proceed.
    fn continue_with(
        &self,
        data: &[u8],
        password: &str,
        scramble: &[u8],
        secure_channel: bool,
        server_public_key: Option<&[u8]>,
    ) -> Result<Continuation> {
        let _ = (data, password, scramble, secure_channel, server_public_key);
        Ok(Continuation::Done)
    }
}

pub use clear_password::require_secure_channel;

pub fn by_name(name: &str) -> Result<Box<dyn AuthPlugin>> {
    match name {
        "mysql_native_password" => Ok(Box::new(native::MySqlNativePassword)),
        "mysql_old_password" => Ok(Box::new(old_password::MySqlOldPassword)),
        "mysql_clear_password" => Ok(Box::new(clear_password::MySqlClearPassword)),
        "caching_sha2_password" => Ok(Box::new(caching_sha2::CachingSha2Password)),
        "sha256_password" => Ok(Box::new(sha256::Sha256Password)),
        other => Err(Error::operational(format!(
            "unknown authentication plugin: {other}"
        ))),
    }
}

pub(crate) fn xor_eq(dest: &mut [u8], src: &[u8]) {
    for (d, s) in dest.iter_mut().zip(src.iter().cycle()) {
        *d ^= *s;
    }
}
