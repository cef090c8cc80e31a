use byteorder::ByteOrder;
use std::{io, str};

/// A read cursor over a borrowed byte slice, advanced in place by every getter.
///
/// Mirrors the shape of `bytes::Buf` but stays local to this crate so the
/// protocol codecs can decode directly against `&'a [u8]` packet payloads
/// without an extra copy.
#[allow(dead_code)]
pub trait Buf<'a> {
    fn advance(&mut self, cnt: usize);

    fn get_uint<T: ByteOrder>(&mut self, n: usize) -> io::Result<u64>;
    fn get_i8(&mut self) -> io::Result<i8>;
    fn get_u8(&mut self) -> io::Result<u8>;
    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16>;
    fn get_i16<T: ByteOrder>(&mut self) -> io::Result<i16>;
    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32>;
    fn get_i32<T: ByteOrder>(&mut self) -> io::Result<i32>;
    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32>;
    fn get_i64<T: ByteOrder>(&mut self) -> io::Result<i64>;
    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64>;
    fn get_f32<T: ByteOrder>(&mut self) -> io::Result<f32>;
    fn get_f64<T: ByteOrder>(&mut self) -> io::Result<f64>;

    fn get_str(&mut self, len: usize) -> io::Result<&'a str>;
    fn get_str_nul(&mut self) -> io::Result<&'a str>;
    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]>;
    fn get_bytes_nul(&mut self) -> io::Result<&'a [u8]>;
}

fn eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected EOF decoding packet")
}

impl<'a> Buf<'a> for &'a [u8] {
    fn advance(&mut self, cnt: usize) {
        *self = &self[cnt..];
    }

    fn get_uint<T: ByteOrder>(&mut self, n: usize) -> io::Result<u64> {
        if self.len() < n {
            return Err(eof());
        }
        let val = T::read_uint(self, n);
        self.advance(n);
        Ok(val)
    }

    fn get_i8(&mut self) -> io::Result<i8> {
        Ok(self.get_u8()? as i8)
    }

    fn get_u8(&mut self) -> io::Result<u8> {
        let val = *self.first().ok_or_else(eof)?;
        self.advance(1);
        Ok(val)
    }

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16> {
        if self.len() < 2 {
            return Err(eof());
        }
        let val = T::read_u16(self);
        self.advance(2);
        Ok(val)
    }

    fn get_i16<T: ByteOrder>(&mut self) -> io::Result<i16> {
        Ok(self.get_u16::<T>()? as i16)
    }

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32> {
        Ok(self.get_uint::<T>(3)? as u32)
    }

    fn get_i32<T: ByteOrder>(&mut self) -> io::Result<i32> {
        Ok(self.get_u32::<T>()? as i32)
    }

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32> {
        if self.len() < 4 {
            return Err(eof());
        }
        let val = T::read_u32(self);
        self.advance(4);
        Ok(val)
    }

    fn get_i64<T: ByteOrder>(&mut self) -> io::Result<i64> {
        Ok(self.get_u64::<T>()? as i64)
    }

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64> {
        if self.len() < 8 {
            return Err(eof());
        }
        let val = T::read_u64(self);
        self.advance(8);
        Ok(val)
    }

    fn get_f32<T: ByteOrder>(&mut self) -> io::Result<f32> {
        if self.len() < 4 {
            return Err(eof());
        }
        let val = T::read_f32(self);
        self.advance(4);
        Ok(val)
    }

    fn get_f64<T: ByteOrder>(&mut self) -> io::Result<f64> {
        if self.len() < 8 {
            return Err(eof());
        }
        let val = T::read_f64(self);
        self.advance(8);
        Ok(val)
    }

    fn get_str(&mut self, len: usize) -> io::Result<&'a str> {
        let bytes = self.get_bytes(len)?;
        str::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn get_str_nul(&mut self) -> io::Result<&'a str> {
        let bytes = self.get_bytes_nul()?;
        str::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if self.len() < len {
            return Err(eof());
        }
        let (bytes, rest) = self.split_at(len);
        *self = rest;
        Ok(bytes)
    }

    fn get_bytes_nul(&mut self) -> io::Result<&'a [u8]> {
        let nul = memchr::memchr(0, self).ok_or_else(eof)?;
        let bytes = self.get_bytes(nul)?;
        self.advance(1);
        Ok(bytes)
    }
}
