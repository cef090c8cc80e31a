//! Byte-cursor primitives shared by the protocol codecs.

mod buf;
mod buf_mut;

pub use buf::Buf;
pub use buf_mut::BufMut;

use byteorder::ByteOrder;
use std::io;

/// Length-encoded integer/string helpers layered on top of [`Buf`]/[`BufMut`].
///
/// MySQL discriminates the width of a length-encoded integer by its leading
/// byte: `< 0xFB` is the value itself, `0xFB` is the NULL sentinel used only
/// in row payloads, `0xFC`/`0xFD`/`0xFE` prefix a 2/3/8-byte little-endian
/// integer.
pub trait BufExt<'a> {
    fn get_uint_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<u64>>;
    fn get_str_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a str>>;
    fn get_bytes_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a [u8]>>;
}

impl<'a> BufExt<'a> for &'a [u8] {
    fn get_uint_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<u64>> {
        Ok(match self.get_u8()? {
            0xFB => None,
            0xFC => Some(u64::from(self.get_u16::<T>()?)),
            0xFD => Some(u64::from(self.get_u24::<T>()?)),
            0xFE => Some(self.get_u64::<T>()?),
            value => Some(u64::from(value)),
        })
    }

    fn get_str_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a str>> {
        self.get_uint_lenenc::<T>()?
            .map(move |len| self.get_str(len as usize))
            .transpose()
    }

    fn get_bytes_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a [u8]>> {
        self.get_uint_lenenc::<T>()?
            .map(move |len| self.get_bytes(len as usize))
            .transpose()
    }
}

pub trait BufMutExt {
    fn put_uint_lenenc<T: ByteOrder>(&mut self, value: u64);
    fn put_bytes_lenenc<T: ByteOrder>(&mut self, bytes: &[u8]);
    fn put_str_lenenc<T: ByteOrder>(&mut self, s: &str);
}

impl BufMutExt for Vec<u8> {
    fn put_uint_lenenc<T: ByteOrder>(&mut self, value: u64) {
        if value < 251 {
            self.put_u8(value as u8);
        } else if value <= 0xFFFF {
            self.put_u8(0xFC);
            self.put_u16::<T>(value as u16);
        } else if value <= 0xFF_FFFF {
            self.put_u8(0xFD);
            self.put_u24::<T>(value as u32);
        } else {
            self.put_u8(0xFE);
            self.put_u64::<T>(value);
        }
    }

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, bytes: &[u8]) {
        self.put_uint_lenenc::<T>(bytes.len() as u64);
        self.put_bytes(bytes);
    }

    fn put_str_lenenc<T: ByteOrder>(&mut self, s: &str) {
        self.put_bytes_lenenc::<T>(s.as_bytes());
    }
}
