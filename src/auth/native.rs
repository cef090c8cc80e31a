use super::{xor_eq, AuthPlugin};
use crate::error::Result;
use digest::Digest;
use sha1::Sha1;

/// `SHA1(password) XOR SHA1(scramble || SHA1(SHA1(password)))`
/// https://mariadb.com/kb/en/connection/#mysql_native_password-plugin
pub struct MySqlNativePassword;

impl AuthPlugin for MySqlNativePassword {
    fn name(&self) -> &'static str {
        "mysql_native_password"
    }

    fn initial(&self, scramble: &[u8], password: &str) -> Result<Vec<u8>> {
        if password.is_empty() {
            return Ok(Vec::new());
        }

        let mut hash = Sha1::digest(password.as_bytes());
        let hash_hash = Sha1::digest(hash);

        let mut ctx = Sha1::new();
        ctx.update(scramble);
        ctx.update(hash_hash);
        let seed_hash_hash = ctx.finalize();

        xor_eq(&mut hash, &seed_hash_hash);
        Ok(hash.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrambles_against_a_known_vector() {
        let plugin = MySqlNativePassword;
        let scramble = b"01234567890123456789";
        let a = plugin.initial(scramble, "hunter2").unwrap();
        let b = plugin.initial(scramble, "hunter2").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_ne!(a, plugin.initial(scramble, "hunter3").unwrap());
    }

    #[test]
    fn empty_password_is_empty_response() {
        let plugin = MySqlNativePassword;
        assert!(plugin.initial(b"01234567890123456789", "").unwrap().is_empty());
    }
}
