use super::{Capabilities, Encode};
use crate::io::BufMut;
use byteorder::LittleEndian;

/// One-byte command prefixes (spec.md GLOSSARY).
pub mod command_byte {
    pub const QUIT: u8 = 0x01;
    pub const INIT_DB: u8 = 0x02;
    pub const QUERY: u8 = 0x03;
    pub const PING: u8 = 0x0E;
    pub const PROCESS_KILL: u8 = 0x0C;
}

pub trait Command: Encode {}

pub struct ComQuery<'a>(pub &'a [u8]);

impl Encode for ComQuery<'_> {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(command_byte::QUERY);
        buf.put_bytes(self.0);
    }
}
impl Command for ComQuery<'_> {}

pub struct ComPing;

impl Encode for ComPing {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(command_byte::PING);
    }
}
impl Command for ComPing {}

pub struct ComQuit;

impl Encode for ComQuit {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(command_byte::QUIT);
    }
}
impl Command for ComQuit {}

pub struct ComInitDb<'a>(pub &'a str);

impl Encode for ComInitDb<'_> {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(command_byte::INIT_DB);
        buf.put_str(self.0);
    }
}
impl Command for ComInitDb<'_> {}

pub struct ComProcessKill(pub u32);

impl Encode for ComProcessKill {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(command_byte::PROCESS_KILL);
        buf.put_u32::<LittleEndian>(self.0);
    }
}
impl Command for ComProcessKill {}
