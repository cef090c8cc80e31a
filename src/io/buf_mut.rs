use byteorder::ByteOrder;

/// The write-side counterpart of [`super::Buf`]; encodes directly into a `Vec<u8>`.
#[allow(dead_code)]
pub trait BufMut {
    fn advance(&mut self, cnt: usize);

    fn put_u8(&mut self, val: u8);
    fn put_u16<T: ByteOrder>(&mut self, val: u16);
    fn put_i16<T: ByteOrder>(&mut self, val: i16);
    fn put_u24<T: ByteOrder>(&mut self, val: u32);
    fn put_i32<T: ByteOrder>(&mut self, val: i32);
    fn put_u32<T: ByteOrder>(&mut self, val: u32);
    fn put_u64<T: ByteOrder>(&mut self, val: u64);
    fn put_f32<T: ByteOrder>(&mut self, val: f32);
    fn put_f64<T: ByteOrder>(&mut self, val: f64);

    fn put_bytes(&mut self, val: &[u8]);
    fn put_str(&mut self, val: &str);
    fn put_str_nul(&mut self, val: &str);
}

impl BufMut for Vec<u8> {
    fn advance(&mut self, cnt: usize) {
        self.resize(self.len() + cnt, 0);
    }

    fn put_u8(&mut self, val: u8) {
        self.push(val);
    }

    fn put_u16<T: ByteOrder>(&mut self, val: u16) {
        let mut buf = [0; 2];
        T::write_u16(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_i16<T: ByteOrder>(&mut self, val: i16) {
        self.put_u16::<T>(val as u16);
    }

    fn put_u24<T: ByteOrder>(&mut self, val: u32) {
        let mut buf = [0; 4];
        T::write_u32(&mut buf, val);
        // byteorder writes u24 as the low 3 bytes of a u32 buffer depending on endianness;
        // for little-endian that's simply the first 3 bytes.
        self.extend_from_slice(&buf[..3]);
    }

    fn put_i32<T: ByteOrder>(&mut self, val: i32) {
        self.put_u32::<T>(val as u32);
    }

    fn put_u32<T: ByteOrder>(&mut self, val: u32) {
        let mut buf = [0; 4];
        T::write_u32(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_u64<T: ByteOrder>(&mut self, val: u64) {
        let mut buf = [0; 8];
        T::write_u64(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_f32<T: ByteOrder>(&mut self, val: f32) {
        let mut buf = [0; 4];
        T::write_f32(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_f64<T: ByteOrder>(&mut self, val: f64) {
        let mut buf = [0; 8];
        T::write_f64(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_bytes(&mut self, val: &[u8]) {
        self.extend_from_slice(val);
    }

    fn put_str(&mut self, val: &str) {
        self.extend_from_slice(val.as_bytes());
    }

    fn put_str_nul(&mut self, val: &str) {
        self.extend_from_slice(val.as_bytes());
        self.push(0);
    }
}
