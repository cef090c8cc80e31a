//! Handshake engine (C6) and connection session FSM (C7).
//!
//! [`Connection`] owns the framed transport and the single in-flight command
//! invariant: only one command may be outstanding at a time, and any
//! unread rows from a previous result set must be drained before another
//! command is sent (spec.md §4.8 "at most one pending result set").

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpStream, UnixStream};

use crate::auth::{self, Continuation};
use crate::error::{Error, Result};
use crate::framer::Framer;
use crate::options::{MySqlConnectOptions, SslMode, Target};
use crate::protocol::{
    AuthSwitchRequest, Capabilities, ColumnDefinition, ComInitDb, ComPing, ComProcessKill, ComQuery,
    ComQuit, Decode, EofPacket, ErrPacket, Handshake, HandshakeResponse, OkPacket, ResultHeader, Status,
};

/// Any transport this driver can speak the protocol over: plain TCP, a Unix
/// socket, or a caller-supplied TLS-wrapped stream. TLS itself is out of
/// scope (spec.md Non-goals) — this is the wrapper-contract hook point.
pub trait MySqlStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> MySqlStream for T {}

/// A TCP or Unix-domain-socket transport, chosen at connect time per
/// [`Target`].
pub enum Socket {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl AsyncRead for Socket {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Socket::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            Socket::Unix(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Socket {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Socket::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            Socket::Unix(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Socket::Tcp(s) => Pin::new(s).poll_flush(cx),
            Socket::Unix(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Socket::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            Socket::Unix(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Session state (spec.md §4.8, §9). A command may only be sent from
/// `Idle`; `UnreadResult` tracks that a previous result set's rows have not
/// all been drained, which is the one invariant the cursor (C9) and executor
/// (C8) must maintain across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    UnreadResult,
    Closed,
}

/// The shape of a result header after a command is sent (spec.md §4.7).
pub enum CommandResponse {
    Ok(OkPacket),
    ResultSet { columns: Vec<ColumnDefinition> },
    LocalInfile { filename: Box<str> },
}

pub struct Connection<S> {
    framer: Framer<S>,
    capabilities: Capabilities,
    pub(crate) server_version: Box<str>,
    pub(crate) connection_id: u32,
    pub(crate) charset: String,
    pub(crate) max_allowed_packet: usize,
    status: Status,
    warning_count: u16,
    state: State,
    local_infile: bool,
}

impl Connection<Socket> {
    /// Open a TCP or Unix-socket transport per `options.target`, then run
    /// the handshake (spec.md §4.6).
    pub async fn connect(options: &MySqlConnectOptions) -> Result<Self> {
        let socket = match &options.target {
            Target::Tcp { host, port } => {
                Socket::Tcp(TcpStream::connect((host.as_str(), *port)).await?)
            }
            Target::UnixSocket(path) => Socket::Unix(UnixStream::connect(path).await?),
        };

        Self::connect_with_stream(socket, options).await
    }
}

impl<S> Connection<S>
where
    S: MySqlStream,
{
    /// Run the handshake over an already-open transport (spec.md §4.6).
    /// Exposed separately from [`Connection::connect`] so a caller supplying
    /// their own TLS-wrapped stream can still drive the protocol.
    pub async fn connect_with_stream(stream: S, options: &MySqlConnectOptions) -> Result<Self> {
        let mut framer = Framer::new(stream);

        let handshake_packet = framer.read_packet().await?;
        let handshake = Handshake::decode(&handshake_packet)?;

        if !handshake.server_capabilities.contains(Capabilities::PROTOCOL_41) {
            return Err(Error::operational(
                "server does not support the 4.1 protocol; this driver requires it",
            ));
        }

        let mut client_capabilities = Capabilities::mandatory()
            | (Capabilities::optional() & handshake.server_capabilities);

        if options.database.is_some() {
            client_capabilities |= Capabilities::CONNECT_WITH_DB;
        }
        if !options.local_infile {
            client_capabilities &= !Capabilities::LOCAL_FILES;
        }

        // TLS upgrade itself is out of scope (spec.md Non-goals): a caller
        // requesting anything stronger than `Disabled` is expected to have
        // already wrapped `stream` in TLS before calling `connect_with_stream`.
        // A Unix socket is secure on its own; over TCP we trust the requested mode.
        let secure_channel = matches!(&options.target, Target::UnixSocket(_))
            || !matches!(options.ssl_mode, SslMode::Disabled);

        let collation_id = crate::charset::collation_for(&options.charset)? as u8;

        let plugin_name = handshake
            .auth_plugin_name
            .as_deref()
            .unwrap_or("mysql_native_password");
        let plugin = auth::by_name(plugin_name)?;

        if plugin_name == "mysql_clear_password" {
            auth::require_secure_channel(secure_channel, options.allow_cleartext_password)?;
        }

        let password = options.password.as_deref().unwrap_or("");
        let auth_response = plugin.initial(&handshake.auth_plugin_data, password)?;

        framer.write_packet(&encode(
            &HandshakeResponse {
                max_packet_size: options.max_allowed_packet as u32,
                client_collation: collation_id,
                username: &options.username,
                database: options.database.as_deref(),
                auth_plugin_name: plugin.name(),
                auth_response: &auth_response,
                connect_attrs: &options.connect_attrs,
            },
            client_capabilities,
        ))
        .await?;

        let (status, warning_count) = Self::drive_auth(
            &mut framer,
            &*plugin,
            password,
            &handshake.auth_plugin_data,
            secure_channel,
            options.server_public_key_path.as_deref(),
        )
        .await?;

        let mut connection = Connection {
            framer,
            capabilities: client_capabilities,
            server_version: handshake.server_version,
            connection_id: handshake.connection_id,
            charset: options.charset.clone(),
            max_allowed_packet: options.max_allowed_packet,
            status,
            warning_count,
            state: State::Idle,
            local_infile: options.local_infile,
        };

        if let Some(sql_mode) = &options.sql_mode {
            connection
                .simple_query_expect_ok(&format!("SET sql_mode='{}'", sql_mode.replace('\'', "''")))
                .await?;
        }

        if let Some(init_command) = &options.init_command {
            connection.simple_query_expect_ok(init_command).await?;
        }

        if !options.autocommit {
            connection.simple_query_expect_ok("SET autocommit=0").await?;
        }

        Ok(connection)
    }

    /// Drive the post-`HandshakeResponse41` exchange: OK ends it, ERR fails
    /// it, and `AuthSwitchRequest`/`AuthMoreData` (0xFE/0x01) hand control to
    /// the negotiated plugin (spec.md §4.5, §4.6 step 5).
    async fn drive_auth(
        framer: &mut Framer<S>,
        initial_plugin: &dyn auth::AuthPlugin,
        password: &str,
        scramble: &[u8],
        secure_channel: bool,
        server_public_key_path: Option<&std::path::Path>,
    ) -> Result<(Status, u16)> {
        let mut plugin_name = initial_plugin.name().to_string();
        let mut scramble = scramble.to_vec();
        let mut server_public_key = match server_public_key_path {
            Some(path) => Some(std::fs::read(path)?),
            None => None,
        };

        loop {
            let packet = framer.read_packet().await?;
            match packet.first().copied() {
                Some(0x00) | Some(0xFE) if !packet.is_empty() && is_ok_packet(&packet) => {
                    let ok = OkPacket::decode(&packet)?;
                    return Ok((ok.status, ok.warnings));
                }
                Some(0xFF) => {
                    return Err(Error::from_server(ErrPacket::decode(&packet)?.0));
                }
                Some(0xFE) => {
                    let switch = AuthSwitchRequest::decode(&packet)?;
                    plugin_name = switch.plugin_name.to_string();
                    scramble = switch.plugin_data.to_vec();
                    let plugin = auth::by_name(&plugin_name)?;
                    let response = plugin.initial(&scramble, password)?;
                    framer.write_packet(&response).await?;
                }
                Some(0x01) => {
                    let plugin = auth::by_name(&plugin_name)?;
                    let continuation = plugin.continue_with(
                        &packet[1..],
                        password,
                        &scramble,
                        secure_channel,
                        server_public_key.as_deref(),
                    )?;
                    match continuation {
                        Continuation::Done => {}
                        Continuation::Send(bytes) => framer.write_packet(&bytes).await?,
                        Continuation::RequestPublicKey => {
                            framer.write_packet(&[0x02]).await?;
                            let key_packet = framer.read_packet().await?;
                            server_public_key = Some(key_packet[1..].to_vec());
                        }
                    }
                }
                _ => {
                    return Err(Error::protocol("unexpected packet during authentication"));
                }
            }
        }
    }

    fn require_idle(&self) -> Result<()> {
        match self.state {
            State::Idle => Ok(()),
            State::UnreadResult => Err(Error::interface(
                "a previous result set has unread rows; drain the cursor before issuing another command",
            )),
            State::Closed => Err(Error::interface("connection is closed")),
        }
    }

    async fn send_command(&mut self, command: impl crate::protocol::Command) -> Result<()> {
        self.require_idle()?;
        self.framer.reset_sequence();
        self.framer.write_packet(&encode(&command, self.capabilities)).await?;
        Ok(())
    }

    /// Send `COM_QUERY` and read the result header, leaving any result set's
    /// rows for the caller (the cursor, C9) to stream (spec.md §4.8).
    pub async fn query(&mut self, sql: &[u8]) -> Result<CommandResponse> {
        log::debug!("query: {}", String::from_utf8_lossy(sql));
        self.send_command(ComQuery(sql)).await?;
        self.read_result_header().await
    }

    /// Read the header of a subsequent result set from a multi-statement
    /// command, without sending another command (spec.md §4.8 `nextset`).
    /// Returns `None` once `SERVER_MORE_RESULTS_EXISTS` is no longer set.
    pub async fn next_result(&mut self) -> Result<Option<CommandResponse>> {
        if !self.has_more_results() {
            return Ok(None);
        }
        self.read_result_header().await.map(Some)
    }

    /// Read the OK/ERR that follows a `LOAD DATA LOCAL INFILE` file transfer
    /// (spec.md §4.11), folding the connection back to `Idle`.
    pub async fn finish_local_infile(&mut self) -> Result<OkPacket> {
        let packet = self.framer.read_packet().await?;
        self.mark_idle();
        match packet.first().copied() {
            Some(0x00) | Some(0xFE) => {
                let ok = OkPacket::decode(&packet)?;
                self.status = ok.status;
                self.warning_count = ok.warnings;
                Ok(ok)
            }
            _ => Err(Error::from_server(ErrPacket::decode(&packet)?.0)),
        }
    }

    async fn read_result_header(&mut self) -> Result<CommandResponse> {
        let packet = self.framer.read_packet().await?;
        match crate::protocol::peek_result_header(&packet)? {
            ResultHeader::Ok => {
                let ok = OkPacket::decode(&packet)?;
                self.status = ok.status;
                self.warning_count = ok.warnings;
                if ok.warnings > 0 {
                    log::warn!("query produced {} warning(s)", ok.warnings);
                }
                self.mark_idle();
                Ok(CommandResponse::Ok(ok))
            }
            ResultHeader::Err => {
                self.mark_idle();
                Err(Error::from_server(ErrPacket::decode(&packet)?.0))
            }
            ResultHeader::LocalInfile => {
                use crate::io::Buf;
                let mut rest: &[u8] = &packet[1..];
                let filename = rest.get_str(rest.len())?.into();
                self.mark_idle();
                Ok(CommandResponse::LocalInfile { filename })
            }
            ResultHeader::ResultSet { column_count } => {
                let mut columns = Vec::with_capacity(column_count as usize);
                for _ in 0..column_count {
                    let col_packet = self.framer.read_packet().await?;
                    columns.push(ColumnDefinition::decode(&col_packet)?);
                }
                if !self.capabilities.contains(Capabilities::DEPRECATE_EOF) {
                    let eof_packet = self.framer.read_packet().await?;
                    EofPacket::decode(&eof_packet)?;
                }
                self.state = State::UnreadResult;
                Ok(CommandResponse::ResultSet { columns })
            }
        }
    }

    /// Read the next row packet of an active result set, or `None` when the
    /// terminator (EOF, or an OK with `DEPRECATE_EOF`) is reached, folding
    /// the connection back to `Idle` at that point (spec.md §4.9).
    pub async fn read_row(&mut self) -> Result<Option<Vec<u8>>> {
        let packet = self.framer.read_packet().await?;

        let is_terminator = if self.capabilities.contains(Capabilities::DEPRECATE_EOF) {
            is_ok_packet(&packet)
        } else {
            packet.first() == Some(&0xFE) && packet.len() < 9
        };

        if is_terminator {
            let status = if self.capabilities.contains(Capabilities::DEPRECATE_EOF) {
                let ok = OkPacket::decode(&packet)?;
                self.warning_count = ok.warnings;
                ok.status
            } else {
                let eof = EofPacket::decode(&packet)?;
                self.warning_count = eof.warnings;
                eof.status
            };
            self.status = status;
            self.mark_idle();
            return Ok(None);
        }

        if packet.first() == Some(&0xFF) {
            self.mark_idle();
            return Err(Error::from_server(ErrPacket::decode(&packet)?.0));
        }

        Ok(Some(packet))
    }

    /// Whether more result sets are pending after the current one
    /// (`SERVER_MORE_RESULTS_EXISTS`), used by multi-statement execution.
    pub fn has_more_results(&self) -> bool {
        self.status.contains(Status::SERVER_MORE_RESULTS_EXISTS)
    }

    pub fn warning_count(&self) -> u16 {
        self.warning_count
    }

    /// Drain the non-fatal warning count left by the last command (spec.md
    /// §7/§8 scenario 5: warnings are a side channel, never an `Error`).
    pub fn take_warnings(&mut self) -> u16 {
        std::mem::take(&mut self.warning_count)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub(crate) fn local_infile_enabled(&self) -> bool {
        self.local_infile
    }

    pub(crate) fn framer_mut(&mut self) -> &mut Framer<S> {
        &mut self.framer
    }

    pub(crate) fn mark_idle(&mut self) {
        if self.state != State::Closed {
            self.state = State::Idle;
        }
    }

    /// Run a statement expected to return `OK`, for session setup calls that
    /// should never themselves produce a result set.
    async fn simple_query_expect_ok(&mut self, sql: &str) -> Result<OkPacket> {
        match self.query(sql.as_bytes()).await? {
            CommandResponse::Ok(ok) => Ok(ok),
            _ => Err(Error::interface(format!(
                "expected an OK response to {sql:?}"
            ))),
        }
    }

    pub async fn ping(&mut self) -> Result<()> {
        self.send_command(ComPing).await?;
        let packet = self.framer.read_packet().await?;
        match packet.first().copied() {
            Some(0x00) | Some(0xFE) => {
                let ok = OkPacket::decode(&packet)?;
                self.status = ok.status;
                self.warning_count = ok.warnings;
                Ok(())
            }
            _ => Err(Error::from_server(ErrPacket::decode(&packet)?.0)),
        }
    }

    pub async fn select_db(&mut self, database: &str) -> Result<()> {
        self.send_command(ComInitDb(database)).await?;
        let packet = self.framer.read_packet().await?;
        match packet.first().copied() {
            Some(0x00) | Some(0xFE) => {
                OkPacket::decode(&packet)?;
                Ok(())
            }
            _ => Err(Error::from_server(ErrPacket::decode(&packet)?.0)),
        }
    }

    /// Change the session character set independent of the handshake
    /// collation (spec.md's supplemented `set_charset` behavior).
    pub async fn set_charset(&mut self, charset: &str) -> Result<()> {
        crate::charset::collation_for(charset)?;
        self.simple_query_expect_ok(&format!("SET NAMES {charset}")).await?;
        self.charset = charset.to_owned();
        Ok(())
    }

    pub async fn begin(&mut self) -> Result<()> {
        self.simple_query_expect_ok("START TRANSACTION").await?;
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.simple_query_expect_ok("COMMIT").await?;
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.simple_query_expect_ok("ROLLBACK").await?;
        Ok(())
    }

    pub async fn kill(&mut self, connection_id: u32) -> Result<()> {
        self.send_command(ComProcessKill(connection_id)).await?;
        let packet = self.framer.read_packet().await?;
        match packet.first().copied() {
            Some(0x00) | Some(0xFE) => {
                OkPacket::decode(&packet)?;
                Ok(())
            }
            _ => Err(Error::from_server(ErrPacket::decode(&packet)?.0)),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.require_idle()?;
        self.framer.reset_sequence();
        self.framer.write_packet(&encode(&ComQuit, self.capabilities)).await?;
        self.state = State::Closed;
        Ok(())
    }
}

fn encode(command: &impl crate::protocol::Encode, capabilities: Capabilities) -> Vec<u8> {
    let mut buf = Vec::new();
    command.encode(&mut buf, capabilities);
    buf
}

fn is_ok_packet(packet: &[u8]) -> bool {
    matches!(packet.first(), Some(0x00)) || (matches!(packet.first(), Some(0xFE)) && packet.len() < 9)
}

#[derive(Debug, Clone)]
pub struct ServerInfo<'a> {
    pub version: &'a str,
    pub connection_id: u32,
}

impl<S> Connection<S> {
    pub fn server_info(&self) -> ServerInfo<'_> {
        ServerInfo { version: &self.server_version, connection_id: self.connection_id }
    }
}

