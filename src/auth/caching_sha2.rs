use super::{xor_eq, AuthPlugin, Continuation};
use crate::error::{Error, Result};
use digest::Digest;
use sha2::Sha256;

const FAST_AUTH_SUCCESS: u8 = 0x03;
const FULL_AUTH_REQUIRED: u8 = 0x04;

/// `SHA256(password) XOR SHA256(SHA256(SHA256(password)) || scramble)`
/// https://mariadb.com/kb/en/caching_sha2_password-authentication-plugin/
pub struct CachingSha2Password;

impl AuthPlugin for CachingSha2Password {
    fn name(&self) -> &'static str {
        "caching_sha2_password"
    }

    fn initial(&self, scramble: &[u8], password: &str) -> Result<Vec<u8>> {
        if password.is_empty() {
            return Ok(Vec::new());
        }
        Ok(scramble_sha256(password, scramble).to_vec())
    }

    fn continue_with(
        &self,
        data: &[u8],
        password: &str,
        scramble: &[u8],
        secure_channel: bool,
        server_public_key: Option<&[u8]>,
    ) -> Result<Continuation> {
        match data.first().copied() {
            Some(FAST_AUTH_SUCCESS) => Ok(Continuation::Done),
            Some(FULL_AUTH_REQUIRED) => {
                if secure_channel {
                    let mut pw = password.as_bytes().to_vec();
                    pw.push(0);
                    Ok(Continuation::Send(pw))
                } else if let Some(key) = server_public_key {
                    Ok(Continuation::Send(super::sha256::encrypt_password(
                        password, scramble, key,
                    )?))
                } else {
                    Ok(Continuation::RequestPublicKey)
                }
            }
            other => Err(Error::operational(format!(
                "unexpected caching_sha2_password continuation byte: {other:?}"
            ))),
        }
    }
}

pub(crate) fn scramble_sha256(
    password: &str,
    seed: &[u8],
) -> generic_array::GenericArray<u8, <Sha256 as digest::OutputSizeUser>::OutputSize> {
    let mut hash = Sha256::digest(password.as_bytes());
    let hash_hash = Sha256::digest(hash);

    let mut ctx = Sha256::new();
    ctx.update(seed);
    ctx.update(hash_hash);
    let seed_hash_hash = ctx.finalize();

    xor_eq(&mut hash, &seed_hash_hash);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scramble_is_deterministic_and_32_bytes() {
        let a = scramble_sha256("hunter2", b"01234567890123456789");
        let b = scramble_sha256("hunter2", b"01234567890123456789");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn fast_auth_success_completes_without_more_data() {
        let plugin = CachingSha2Password;
        let cont = plugin
            .continue_with(&[FAST_AUTH_SUCCESS], "x", b"y", false, None)
            .unwrap();
        assert!(matches!(cont, Continuation::Done));
    }

    #[test]
    fn full_auth_without_secure_channel_or_key_requests_public_key() {
        let plugin = CachingSha2Password;
        let cont = plugin
            .continue_with(&[FULL_AUTH_REQUIRED], "x", b"y", false, None)
            .unwrap();
        assert!(matches!(cont, Continuation::RequestPublicKey));
    }
}
