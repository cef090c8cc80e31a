//! Core wire-protocol engine for a MySQL-compatible client driver: charset
//! registry, field-type codec, parameter escaper, packet framer, auth plugin
//! set, handshake engine, connection session, query executor, row cursor,
//! error mapping, and the `LOAD DATA LOCAL INFILE` callback contract.
//!
//! This crate does not pool connections, parse SQL, or implement TLS itself;
//! see the non-goals in [`options`] and [`connection`] for the boundary.

mod auth;
pub mod charset;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod framer;
pub mod local_infile;
pub mod options;
pub mod params;
pub mod protocol;
mod value;
mod io;

pub use connection::Connection;
pub use framer::Framer;
pub use cursor::Cursor;
pub use error::{Error, Result, ServerError};
pub use options::MySqlConnectOptions;
pub use params::{Param, Params};
pub use value::Value;
