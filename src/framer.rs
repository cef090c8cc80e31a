//! Packet framer (C4): splits/joins the `len[3] seq[1] payload[len]` wire
//! frame over a byte stream, including reassembly of payloads >16MiB.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_FRAME_LEN: usize = 0xFF_FFFF;

/// Frames a transport stream into MySQL packets. Sequence id is owned here
/// but the [`crate::connection::Connection`] is responsible for calling
/// [`Framer::reset_sequence`] at the start of each command, per spec.md §4.4.
pub struct Framer<S> {
    stream: S,
    seq_id: u8,
}

impl<S> Framer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Framer { stream, seq_id: 0 }
    }

    pub fn reset_sequence(&mut self) {
        self.seq_id = 0;
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Read one logical packet, transparently reassembling any `0xFFFFFF`-len
    /// continuation frames (spec.md §4.4).
    pub async fn read_packet(&mut self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();

        loop {
            let mut header = [0u8; 4];
            self.stream.read_exact(&mut header).await?;

            let len = LittleEndian::read_u24(&header[..3]) as usize;
            let seq = header[3];

            if seq != self.seq_id {
                return Err(Error::protocol(format!(
                    "packet sequence mismatch: expected {}, received {seq}",
                    self.seq_id
                )));
            }
            self.seq_id = self.seq_id.wrapping_add(1);

            let start = payload.len();
            payload.resize(start + len, 0);
            self.stream.read_exact(&mut payload[start..]).await?;

            if len < MAX_FRAME_LEN {
                break;
            }
        }

        log::trace!("read packet: seq={} len={}", self.seq_id.wrapping_sub(1), payload.len());
        Ok(payload)
    }

    /// Write one logical packet, splitting into `0xFFFFFF`-sized frames with
    /// strictly increasing sequence ids when the payload is large, and
    /// appending a zero-length terminator frame when the payload length is
    /// an exact multiple of `0xFFFFFF` (spec.md §4.4, §8 invariant).
    pub async fn write_packet(&mut self, payload: &[u8]) -> Result<()> {
        let mut offset = 0;

        loop {
            let remaining = payload.len() - offset;
            let chunk_len = remaining.min(MAX_FRAME_LEN);
            let chunk = &payload[offset..offset + chunk_len];

            let mut header = [0u8; 4];
            LittleEndian::write_u24(&mut header[..3], chunk_len as u32);
            header[3] = self.seq_id;
            self.seq_id = self.seq_id.wrapping_add(1);

            self.stream.write_all(&header).await?;
            self.stream.write_all(chunk).await?;

            offset += chunk_len;

            if chunk_len < MAX_FRAME_LEN {
                break;
            }
            if offset == payload.len() {
                // exact multiple of MAX_FRAME_LEN: terminate with an empty frame
                let mut header = [0u8; 4];
                header[3] = self.seq_id;
                self.seq_id = self.seq_id.wrapping_add(1);
                self.stream.write_all(&header).await?;
                break;
            }
        }

        self.stream.flush().await?;
        log::trace!("wrote packet: len={}", payload.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn round_trips_a_small_packet() {
        let (client, mut server) = duplex(1024);
        let mut framer = Framer::new(client);

        let write = framer.write_packet(b"hello");
        let read_task = async {
            let mut header = [0u8; 4];
            server.read_exact(&mut header).await.unwrap();
            let len = LittleEndian::read_u24(&header[..3]) as usize;
            let mut buf = vec![0u8; len];
            server.read_exact(&mut buf).await.unwrap();
            buf
        };

        let (_, received) = tokio::join!(write, read_task);
        assert_eq!(received, b"hello");
    }

    #[tokio::test]
    async fn reassembles_a_continuation_frame() {
        let (mut client, server) = duplex(MAX_FRAME_LEN * 2 + 16);
        let payload = vec![0xABu8; MAX_FRAME_LEN + 10];

        let mut header = [0u8; 4];
        LittleEndian::write_u24(&mut header[..3], MAX_FRAME_LEN as u32);
        header[3] = 0;
        client.write_all(&header).await.unwrap();
        client.write_all(&payload[..MAX_FRAME_LEN]).await.unwrap();

        let mut header2 = [0u8; 4];
        LittleEndian::write_u24(&mut header2[..3], 10);
        header2[3] = 1;
        client.write_all(&header2).await.unwrap();
        client.write_all(&payload[MAX_FRAME_LEN..]).await.unwrap();

        let mut framer = Framer::new(server);
        let received = framer.read_packet().await.unwrap();
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn sequence_mismatch_is_a_protocol_error() {
        let (mut client, server) = duplex(64);
        let mut header = [0u8; 4];
        LittleEndian::write_u24(&mut header[..3], 1);
        header[3] = 5; // wrong, should be 0
        client.write_all(&header).await.unwrap();
        client.write_all(&[1u8]).await.unwrap();

        let mut framer = Framer::new(server);
        let err = framer.read_packet().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
