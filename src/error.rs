//! Error taxonomy and `Result` alias.
//!
//! Two axes are folded into one enum rather than two nested types: connection
//! health (`Interface`, `Operational`) and SQL semantics (`Programming`,
//! `Integrity`, `Data`, `NotSupported`). `Warning` is intentionally not a
//! variant here — it never fails a statement, so it is surfaced as a side
//! channel on the connection/cursor instead (see `Connection::take_warnings`).

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// An error returned by the server, with enough structure to classify it.
#[derive(Debug, Clone)]
pub struct ServerError {
    pub code: u16,
    pub sqlstate: Box<str>,
    pub message: Box<str>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}): {}", self.code, self.sqlstate, self.message)
    }
}

#[derive(Debug)]
pub enum Error {
    /// Misuse of the driver API: closed connection, reentrant command while
    /// busy, fetch with no active result set, malformed server version.
    Interface(Box<str>),

    /// Environment/connection trouble: network loss, auth failure, unknown
    /// auth plugin, protocol desync. Always leaves the connection `CLOSED`.
    Operational(Box<str>),

    /// The server rejected the SQL itself: syntax error, unknown identifier,
    /// wrong parameter count. Carries the raw server error.
    Programming(ServerError),

    /// Constraint violation (duplicate key, FK, check constraint).
    Integrity(ServerError),

    /// Value out of range, truncation, bad conversion.
    Data(ServerError),

    /// Feature refused by the server or not implemented by this driver.
    NotSupported(ServerError),

    /// A server error code we don't otherwise classify; preserves the raw code.
    UnmappedServer(ServerError),

    Io(io::Error),

    Protocol(Box<str>),
}

impl Error {
    pub(crate) fn interface(msg: impl Into<Box<str>>) -> Self {
        Error::Interface(msg.into())
    }

    pub(crate) fn operational(msg: impl Into<Box<str>>) -> Self {
        Error::Operational(msg.into())
    }

    pub(crate) fn protocol(msg: impl Into<Box<str>>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Classify a server ERR packet per spec.md §4.10's code partition.
    pub(crate) fn from_server(err: ServerError) -> Self {
        match err.code {
            1022 | 1048 | 1052 | 1062 | 1169 | 1215 | 1216 | 1217 | 1451 | 1452 | 1557 | 3819 => {
                Error::Integrity(err)
            }
            1044 | 1045 | 1046 | 1049 | 1142 | 1203 | 1226 | 2003 | 2005 | 2006 | 2013 => {
                Error::Operational(format!("{err}").into_boxed_str())
            }
            1064 | 1054 | 1060 | 1146 | 1166 => Error::Programming(err),
            1264 | 1265 | 1292 | 1366 | 1365 => Error::Data(err),
            1235 => Error::NotSupported(err),
            _ => Error::UnmappedServer(err),
        }
    }

    pub fn server(&self) -> Option<&ServerError> {
        match self {
            Error::Programming(e)
            | Error::Integrity(e)
            | Error::Data(e)
            | Error::NotSupported(e)
            | Error::UnmappedServer(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(msg) => write!(f, "interface error: {msg}"),
            Error::Operational(msg) => write!(f, "operational error: {msg}"),
            Error::Programming(e) => write!(f, "programming error: {e}"),
            Error::Integrity(e) => write!(f, "integrity error: {e}"),
            Error::Data(e) => write!(f, "data error: {e}"),
            Error::NotSupported(e) => write!(f, "not supported: {e}"),
            Error::UnmappedServer(e) => write!(f, "server error: {e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::Protocol(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::protocol(format!("invalid utf-8 in protocol payload: {err}"))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::interface(format!("invalid connection url: {err}"))
    }
}

/// Used by the `protocol_err!()` macro for a lazily evaluated conversion into
/// `Error::Protocol` so call sites read naturally with `.ok_or_else()`.
pub(crate) struct ProtocolError<'a> {
    pub args: fmt::Arguments<'a>,
}

impl From<ProtocolError<'_>> for Error {
    fn from(err: ProtocolError<'_>) -> Self {
        Error::Protocol(err.args.to_string().into_boxed_str())
    }
}

macro_rules! protocol_err {
    ($($args:tt)*) => {
        $crate::error::ProtocolError { args: format_args!($($args)*) }
    };
}

pub(crate) use protocol_err;
