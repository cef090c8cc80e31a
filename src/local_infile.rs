//! `LOAD DATA LOCAL INFILE` file source (C11).
//!
//! This driver never reads from disk on its own: the server's request for a
//! filename is always handed to a caller-supplied [`LocalInfileHandler`],
//! which decides whether to honor it at all (spec.md Non-goals: "the file
//! source is a callback contract, not a driver-owned filesystem read").

use std::io::Read;

use crate::error::Result;
use crate::framer::Framer;
use tokio::io::{AsyncRead, AsyncWrite};

/// Supplies file contents for a `LOAD DATA LOCAL INFILE '<name>' ...`
/// statement. The `filename` argument is exactly what the server sent,
/// untrusted and not validated by this driver; a handler that refuses
/// unexpected names is the caller's own defense against a malicious or
/// misbehaving server (spec.md §4.11 edge case).
pub trait LocalInfileHandler: Send + Sync {
    fn open(&self, filename: &str) -> std::io::Result<Box<dyn Read + Send>>;
}

/// A handler that always refuses, for connections where local-infile is
/// opted out of entirely (spec.md §6 `local_infile` defaulting to disabled).
pub struct RefusingHandler;

impl LocalInfileHandler for RefusingHandler {
    fn open(&self, filename: &str) -> std::io::Result<Box<dyn Read + Send>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("local_infile is disabled; server requested {filename:?}"),
        ))
    }
}

/// Stream `filename`'s contents as a sequence of packets, terminated by a
/// zero-length packet, in response to a `LocalInfile` result header
/// (spec.md §4.11). On any failure to open or read the file, an empty
/// packet is still sent so the server's wait for data doesn't hang, and the
/// I/O error is surfaced to the caller after that.
pub async fn send_local_infile<S>(
    framer: &mut Framer<S>,
    handler: &dyn LocalInfileHandler,
    filename: &str,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    const CHUNK_LEN: usize = 8192;

    let mut file = match handler.open(filename) {
        Ok(file) => file,
        Err(err) => {
            framer.write_packet(&[]).await?;
            return Err(err.into());
        }
    };

    let mut buf = vec![0u8; CHUNK_LEN];
    loop {
        let read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                framer.write_packet(&[]).await?;
                return Err(err.into());
            }
        };
        framer.write_packet(&buf[..read]).await?;
    }

    framer.write_packet(&[]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::duplex;

    struct FixedHandler(&'static [u8]);

    impl LocalInfileHandler for FixedHandler {
        fn open(&self, _filename: &str) -> std::io::Result<Box<dyn Read + Send>> {
            Ok(Box::new(Cursor::new(self.0)))
        }
    }

    #[tokio::test]
    async fn streams_file_contents_then_terminator() {
        let (client, mut server) = duplex(4096);
        let mut framer = Framer::new(client);
        let handler = FixedHandler(b"a,b,c\n1,2,3\n");

        let send = send_local_infile(&mut framer, &handler, "data.csv");

        let read_all = async {
            let mut packets = Vec::new();
            loop {
                let mut header = [0u8; 4];
                use tokio::io::AsyncReadExt;
                server.read_exact(&mut header).await.unwrap();
                let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
                let mut payload = vec![0u8; len];
                server.read_exact(&mut payload).await.unwrap();
                let done = payload.is_empty();
                packets.push(payload);
                if done {
                    break;
                }
            }
            packets
        };

        let (sent, packets) = tokio::join!(send, read_all);
        sent.unwrap();
        assert_eq!(packets.last().unwrap(), &Vec::<u8>::new());
        assert_eq!(packets[0], b"a,b,c\n1,2,3\n");
    }

    #[tokio::test]
    async fn refusing_handler_still_sends_terminator() {
        let (client, mut server) = duplex(4096);
        let mut framer = Framer::new(client);

        let send = send_local_infile(&mut framer, &RefusingHandler, "secret.csv");
        let read_terminator = async {
            let mut header = [0u8; 4];
            use tokio::io::AsyncReadExt;
            server.read_exact(&mut header).await.unwrap();
            header
        };

        let (sent, header) = tokio::join!(send, read_terminator);
        assert!(sent.is_err());
        assert_eq!(header, [0, 0, 0, 0]);
    }
}
