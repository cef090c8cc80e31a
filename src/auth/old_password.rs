use super::AuthPlugin;
use crate::error::Result;

/// The pre-4.1 scramble algorithm. Only ever negotiated when a caller has
/// explicitly opted into legacy auth (`mysql_old_password` is not in the
/// default plugin set any modern server advertises); kept for compatibility
/// with ancient MariaDB installs, per spec.md §4.5.
pub struct MySqlOldPassword;

impl AuthPlugin for MySqlOldPassword {
    fn name(&self) -> &'static str {
        "mysql_old_password"
    }

    fn initial(&self, scramble: &[u8], password: &str) -> Result<Vec<u8>> {
        if password.is_empty() {
            return Ok(Vec::new());
        }

        let (h1, h2) = hash_password(password);
        let (seed1, seed2) = hash_bytes(&scramble[..8.min(scramble.len())]);

        let mut rng = LegacyRng::new(h1 ^ seed1, h2 ^ seed2);

        let mut out = Vec::with_capacity(8);
        for _ in 0..8 {
            out.push(b'0'.wrapping_add(rng.next_byte() % 31));
        }

        let extra = rng.next_byte();
        for b in out.iter_mut() {
            *b ^= extra;
        }

        Ok(out)
    }
}

fn hash_password(password: &str) -> (u32, u32) {
    hash_bytes(password.as_bytes())
}

fn hash_bytes(bytes: &[u8]) -> (u32, u32) {
    let (mut nr, mut add, mut nr2) = (1345345333u32, 7u32, 0x12345671u32);

    for &b in bytes {
        if b == b' ' || b == b'\t' {
            continue;
        }
        let tmp = u32::from(b);
        nr ^= (((nr & 63).wrapping_add(add)).wrapping_mul(tmp)).wrapping_add(nr.wrapping_shl(8));
        nr2 = nr2.wrapping_add((nr2.wrapping_shl(8)) ^ nr);
        add = add.wrapping_add(tmp);
    }

    (nr & 0x7FFFFFFF, nr2 & 0x7FFFFFFF)
}

struct LegacyRng {
    seed1: u32,
    seed2: u32,
}

impl LegacyRng {
    fn new(seed1: u32, seed2: u32) -> Self {
        LegacyRng {
            seed1: seed1 % 0x3FFFFFFF,
            seed2: seed2 % 0x3FFFFFFF,
        }
    }

    fn next_byte(&mut self) -> u8 {
        self.seed1 = (self.seed1.wrapping_mul(3).wrapping_add(self.seed2)) % 0x3FFFFFFF;
        self.seed2 = (self.seed1.wrapping_add(self.seed2).wrapping_add(33)) % 0x3FFFFFFF;
        ((self.seed1 as f64 / 0x3FFFFFFFu32 as f64) * 31.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let plugin = MySqlOldPassword;
        let a = plugin.initial(b"12345678", "secret").unwrap();
        let b = plugin.initial(b"12345678", "secret").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }
}
