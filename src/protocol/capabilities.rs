// https://dev.mysql.com/doc/dev/mysql-server/latest/group__group__cs__capabilities__flags.html
bitflags::bitflags! {
    pub struct Capabilities: u64 {
        const LONG_PASSWORD                  = 0x0000_0001;
        const FOUND_ROWS                      = 0x0000_0002;
        const LONG_FLAG                       = 0x0000_0004;
        const CONNECT_WITH_DB                 = 0x0000_0008;
        const NO_SCHEMA                       = 0x0000_0010;
        const COMPRESS                        = 0x0000_0020;
        const ODBC                            = 0x0000_0040;
        const LOCAL_FILES                     = 0x0000_0080;
        const IGNORE_SPACE                    = 0x0000_0100;
        const PROTOCOL_41                     = 0x0000_0200;
        const INTERACTIVE                     = 0x0000_0400;
        const SSL                             = 0x0000_0800;
        const IGNORE_SIGPIPE                  = 0x0000_1000;
        const TRANSACTIONS                    = 0x0000_2000;
        const RESERVED                        = 0x0000_4000;
        const SECURE_CONNECTION               = 0x0000_8000;
        const MULTI_STATEMENTS                = 0x0001_0000;
        const MULTI_RESULTS                   = 0x0002_0000;
        const PS_MULTI_RESULTS                = 0x0004_0000;
        const PLUGIN_AUTH                     = 0x0008_0000;
        const CONNECT_ATTRS                   = 0x0010_0000;
        const PLUGIN_AUTH_LENENC_CLIENT_DATA  = 0x0020_0000;
        const CAN_HANDLE_EXPIRED_PASSWORDS    = 0x0040_0000;
        const SESSION_TRACK                   = 0x0080_0000;
        const DEPRECATE_EOF                   = 0x0100_0000;
    }
}

impl Capabilities {
    /// The bits spec.md §4.6 step 2 requires unconditionally, independent of
    /// what the server happens to offer.
    pub fn mandatory() -> Capabilities {
        Capabilities::PROTOCOL_41
            | Capabilities::SECURE_CONNECTION
            | Capabilities::LONG_PASSWORD
            | Capabilities::TRANSACTIONS
            | Capabilities::MULTI_RESULTS
            | Capabilities::PLUGIN_AUTH
    }

    /// Capabilities requested when available but not required.
    ///
    /// Deliberately excludes `SSL`: setting that bit commits this driver to
    /// sending an `SSLRequest` and upgrading the transport before
    /// `HandshakeResponse41`, which this crate does not implement (TLS
    /// upgrade is out of scope; callers wanting TLS hand
    /// [`crate::connection::Connection::connect_with_stream`] an
    /// already-wrapped stream). Advertising it without honoring it desyncs
    /// the handshake against any SSL-capable server.
    pub fn optional() -> Capabilities {
        Capabilities::LOCAL_FILES
            | Capabilities::MULTI_STATEMENTS
            | Capabilities::CONNECT_WITH_DB
            | Capabilities::FOUND_ROWS
            | Capabilities::LONG_FLAG
            | Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA
            | Capabilities::CONNECT_ATTRS
            | Capabilities::DEPRECATE_EOF
    }
}
