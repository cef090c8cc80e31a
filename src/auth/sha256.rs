use super::{AuthPlugin, Continuation};
use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rsa::pkcs8::DecodePublicKey;
use rsa::{PaddingScheme, PublicKey, RsaPublicKey};

/// `sha256_password`: like `caching_sha2_password`'s full-auth path but
/// always negotiated (no fast-auth cache), per spec.md §4.5.
pub struct Sha256Password;

impl AuthPlugin for Sha256Password {
    fn name(&self) -> &'static str {
        "sha256_password"
    }

    fn initial(&self, _scramble: &[u8], password: &str) -> Result<Vec<u8>> {
        if password.is_empty() {
            return Ok(Vec::new());
        }
        // A single 0x01 byte requests the server's public key; the real
        // scrambled response is computed once the key arrives.
        Ok(vec![0x01])
    }

    fn continue_with(
        &self,
        _data: &[u8],
        password: &str,
        scramble: &[u8],
        secure_channel: bool,
        server_public_key: Option<&[u8]>,
    ) -> Result<Continuation> {
        if secure_channel {
            let mut pw = password.as_bytes().to_vec();
            pw.push(0);
            return Ok(Continuation::Send(pw));
        }

        match server_public_key {
            Some(key) => Ok(Continuation::Send(encrypt_password(password, scramble, key)?)),
            None => Ok(Continuation::RequestPublicKey),
        }
    }
}

/// RSA-OAEP-encrypt `password XOR repeated(scramble)` with the server's
/// PEM-encoded RSA public key, per spec.md §4.5's `caching_sha2_password`
/// and `sha256_password` full-auth negotiation.
pub(crate) fn encrypt_password(password: &str, scramble: &[u8], public_key_pem: &[u8]) -> Result<Vec<u8>> {
    let pem = std::str::from_utf8(public_key_pem)
        .map_err(|_| Error::operational("server public key is not valid UTF-8 PEM"))?;
    let key = RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| Error::operational(format!("invalid server RSA public key: {e}")))?;

    let mut xored: Vec<u8> = password.as_bytes().to_vec();
    xored.push(0);
    super::xor_eq(&mut xored, scramble);

    let mut rng = OsRng;
    key.encrypt(&mut rng, PaddingScheme::new_oaep::<sha1::Sha1>(), &xored)
        .map_err(|e| Error::operational(format!("RSA-OAEP encryption failed: {e}")))
}
