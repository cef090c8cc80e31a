// https://mariadb.com/kb/en/library/resultset/#field-detail-flag
bitflags::bitflags! {
    pub struct FieldFlags: u16 {
        const NOT_NULL        = 1;
        const PRIMARY_KEY     = 2;
        const UNIQUE_KEY      = 4;
        const MULTIPLE_KEY    = 8;
        const BLOB            = 16;
        const UNSIGNED        = 32;
        const ZEROFILL        = 64;
        const BINARY          = 128;
        const ENUM            = 256;
        const AUTO_INCREMENT  = 512;
        const TIMESTAMP       = 1024;
        const SET             = 2048;
        const NO_DEFAULT_VALUE = 4096;
        const ON_UPDATE_NOW   = 8192;
        const NUM             = 32768;
    }
}
