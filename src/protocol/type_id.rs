// https://dev.mysql.com/doc/dev/mysql-server/latest/binary__log__types_8h.html
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeId(pub u8);

impl TypeId {
    pub const DECIMAL: TypeId = TypeId(0);
    pub const TINY: TypeId = TypeId(1);
    pub const SHORT: TypeId = TypeId(2);
    pub const LONG: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);
    pub const NULL: TypeId = TypeId(6);
    pub const TIMESTAMP: TypeId = TypeId(7);
    pub const LONGLONG: TypeId = TypeId(8);
    pub const INT24: TypeId = TypeId(9);
    pub const DATE: TypeId = TypeId(10);
    pub const TIME: TypeId = TypeId(11);
    pub const DATETIME: TypeId = TypeId(12);
    pub const YEAR: TypeId = TypeId(13);
    pub const VARCHAR: TypeId = TypeId(15);
    pub const BIT: TypeId = TypeId(16);
    pub const JSON: TypeId = TypeId(245);
    pub const NEWDECIMAL: TypeId = TypeId(246);
    pub const ENUM: TypeId = TypeId(247);
    pub const SET: TypeId = TypeId(248);
    pub const TINY_BLOB: TypeId = TypeId(249);
    pub const MEDIUM_BLOB: TypeId = TypeId(250);
    pub const LONG_BLOB: TypeId = TypeId(251);
    pub const BLOB: TypeId = TypeId(252);
    pub const VAR_STRING: TypeId = TypeId(253);
    pub const STRING: TypeId = TypeId(254);
    pub const GEOMETRY: TypeId = TypeId(255);

    pub fn is_blob_like(self) -> bool {
        matches!(
            self,
            TypeId::TINY_BLOB
                | TypeId::MEDIUM_BLOB
                | TypeId::LONG_BLOB
                | TypeId::BLOB
                | TypeId::VAR_STRING
                | TypeId::STRING
                | TypeId::VARCHAR
        )
    }
}

impl Default for TypeId {
    fn default() -> TypeId {
        TypeId::NULL
    }
}
